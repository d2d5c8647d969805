//! Canonicalization pipelines.
//!
//! Two passes turn a problem into canonical conic form:
//!
//! 1. [`cone::LinearConeTransform`] rewrites nonlinear atoms into epigraph
//!    variables plus cone constraints, leaving a purely affine problem.
//! 2. [`coefficients::get_coefficients`] flattens each affine expression
//!    into one sparse matrix per variable plus a constant column.

pub mod coefficients;
pub mod cone;

pub use coefficients::{get_coefficients, is_constant, CoeffMap};
pub use cone::{transform_expression, LinearConeTransform};
