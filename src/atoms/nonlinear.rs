//! Nonlinear convex atoms.
//!
//! These are the atoms the cone transformer knows how to rewrite into
//! affine expressions plus cone constraints.

use std::sync::Arc;

use crate::expr::Expr;

/// Absolute value: |x| (elementwise).
///
/// Properties:
/// - Curvature: Convex
/// - Sign: Non-negative
pub fn abs(x: &Expr) -> Expr {
    Expr::Abs(Arc::new(x.clone()))
}

/// p-norm over all entries: ||x||_p.
///
/// Only `p = 1` can be canonicalized; other values are rejected by the
/// cone transformer.
pub fn p_norm(x: &Expr, p: f64) -> Expr {
    Expr::PNorm(Arc::new(x.clone()), p)
}

/// L1 norm: ||x||_1 = sum(|x_i|).
pub fn norm1(x: &Expr) -> Expr {
    p_norm(x, 1.0)
}

/// Quadratic over linear: x'x / y for scalar y.
///
/// Properties:
/// - Curvature: Convex for y > 0
pub fn quad_over_lin(x: &Expr, y: &Expr) -> Expr {
    Expr::QuadOverLin(Arc::new(x.clone()), Arc::new(y.clone()))
}
