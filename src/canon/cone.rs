//! Cone transformation.
//!
//! Rewrites every registered nonlinear atom into an epigraph variable plus
//! cone constraints, bottom-up, so the resulting problem is purely affine.
//! Emitted constraints accumulate in the caller-provided list; every one of
//! them appears exactly once in the transformed problem.

use std::sync::Arc;

use log::debug;

use crate::atoms::{add, mul, neg, sum_entries, vstack};
use crate::constraints::{leq, soc};
use crate::error::{CanonError, Result};
use crate::expr::{constant, epi_var, scalar_epi_var, Expr};
use crate::problem::Problem;

/// Rewrites a problem into affine-plus-cone form.
pub struct LinearConeTransform;

impl LinearConeTransform {
    /// Transform the objective and every constraint of `problem`,
    /// returning a new problem whose every subexpression is affine and
    /// whose constraint list includes all emitted cone constraints.
    pub fn transform(&self, problem: &Problem) -> Result<Problem> {
        let mut constraints = Vec::new();
        let objective = transform_expression(&problem.objective, &mut constraints)?;
        for constr in &problem.constraints {
            let transformed = transform_expression(constr, &mut constraints)?;
            constraints.push(transformed);
        }
        Ok(Problem {
            sense: problem.sense,
            objective,
            constraints,
        })
    }
}

/// Transform one expression, appending emitted constraints.
///
/// Children are transformed first; the node is rebuilt with its affine
/// surrogates, then rewritten if its type is registered. Unregistered
/// nodes pass through unchanged (they are affine once their children
/// are, or the coefficient extractor rejects them downstream).
pub fn transform_expression(expr: &Expr, constraints: &mut Vec<Expr>) -> Result<Expr> {
    let output = rebuild(expr, constraints)?;

    match &output {
        Expr::Abs(x) => {
            debug!("transform abs: {}", output);
            Ok(transform_abs(x, constraints))
        }
        Expr::PNorm(x, p) => {
            debug!("transform p_norm: {}", output);
            if *p != 1.0 {
                return Err(CanonError::UnsupportedPNorm(*p));
            }
            Ok(sum_entries(&transform_abs(x, constraints)))
        }
        Expr::QuadOverLin(x, y) => {
            debug!("transform quad_over_lin: {}", output);
            Ok(transform_quad_over_lin(x, y, &output, constraints))
        }
        _ => Ok(output),
    }
}

/// Epigraph of |x|: t with x <= t and -x <= t.
fn transform_abs(x: &Expr, constraints: &mut Vec<Expr>) -> Expr {
    let t = epi_var(x, "abs");
    constraints.push(leq(x, &t));
    constraints.push(leq(&neg(x), &t));
    t
}

/// Epigraph of x'x / y: scalar t with ||(y - t, 2x)||_2 <= y + t and 0 <= y.
fn transform_quad_over_lin(
    x: &Expr,
    y: &Expr,
    parent: &Expr,
    constraints: &mut Vec<Expr>,
) -> Expr {
    let t = scalar_epi_var(parent, "qol");
    constraints.push(soc(
        &vstack(&[add(y, &neg(&t)), mul(&constant(2.0), x)]),
        &add(y, &t),
    ));
    constraints.push(leq(&constant(0.0), y));
    t
}

/// Rebuild a node with transformed children, preserving type and
/// attributes.
fn rebuild(expr: &Expr, constraints: &mut Vec<Expr>) -> Result<Expr> {
    Ok(match expr {
        Expr::Variable(_) | Expr::Constant(_) => expr.clone(),
        Expr::Add(args) => Expr::Add(transform_args(args, constraints)?),
        Expr::Neg(a) => Expr::Neg(child(a, constraints)?),
        Expr::Mul(a, b) => Expr::Mul(child(a, constraints)?, child(b, constraints)?),
        Expr::SumEntries(a) => Expr::SumEntries(child(a, constraints)?),
        Expr::HStack(args) => Expr::HStack(transform_args(args, constraints)?),
        Expr::VStack(args) => Expr::VStack(transform_args(args, constraints)?),
        Expr::Reshape(a, shape) => Expr::Reshape(child(a, constraints)?, *shape),
        Expr::Index(a, slices) => Expr::Index(child(a, constraints)?, *slices),
        Expr::DiagVec(a) => Expr::DiagVec(child(a, constraints)?),
        Expr::DiagMat(a) => Expr::DiagMat(child(a, constraints)?),
        Expr::Transpose(a) => Expr::Transpose(child(a, constraints)?),
        Expr::Abs(a) => Expr::Abs(child(a, constraints)?),
        Expr::PNorm(a, p) => Expr::PNorm(child(a, constraints)?, *p),
        Expr::QuadOverLin(a, b) => {
            Expr::QuadOverLin(child(a, constraints)?, child(b, constraints)?)
        }
        Expr::Leq(a, b) => Expr::Leq(child(a, constraints)?, child(b, constraints)?),
        Expr::Eq(a, b) => Expr::Eq(child(a, constraints)?, child(b, constraints)?),
        Expr::Soc(a, b) => Expr::Soc(child(a, constraints)?, child(b, constraints)?),
    })
}

fn child(expr: &Arc<Expr>, constraints: &mut Vec<Expr>) -> Result<Arc<Expr>> {
    Ok(Arc::new(transform_expression(expr, constraints)?))
}

fn transform_args(args: &[Arc<Expr>], constraints: &mut Vec<Expr>) -> Result<Vec<Arc<Expr>>> {
    args.iter()
        .map(|a| Ok(Arc::new(transform_expression(a, constraints)?)))
        .collect()
}
