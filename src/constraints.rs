//! Constraint construction.
//!
//! Constraints are ordinary expression nodes, so the cone transformer can
//! rewrite nonlinear atoms inside them with the same recursion it uses for
//! objectives. They map to cones downstream:
//! - `Leq`: b - a in the nonnegative orthant
//! - `Eq`: a - b in the zero cone
//! - `Soc`: (w, v) in the second-order cone

use std::sync::Arc;

use crate::expr::Expr;

/// Elementwise inequality constraint: a <= b.
pub fn leq(a: &Expr, b: &Expr) -> Expr {
    Expr::Leq(Arc::new(a.clone()), Arc::new(b.clone()))
}

/// Elementwise equality constraint: a == b.
pub fn eq(a: &Expr, b: &Expr) -> Expr {
    Expr::Eq(Arc::new(a.clone()), Arc::new(b.clone()))
}

/// Second-order cone constraint: ||v||_2 <= w, with scalar w.
pub fn soc(v: &Expr, w: &Expr) -> Expr {
    Expr::Soc(Arc::new(v.clone()), Arc::new(w.clone()))
}
