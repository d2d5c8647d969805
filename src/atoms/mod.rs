//! Atom functions for building expressions.
//!
//! - **Affine atoms**: operations the coefficient extractor understands
//!   (add, mul, stacks, reshape, index, diagonals, transpose).
//! - **Nonlinear atoms**: operations the cone transformer rewrites
//!   (abs, p-norm, quad-over-lin).

pub mod affine;
pub mod nonlinear;

pub use affine::{
    add, add_all, diag_mat, diag_vec, hstack, index, mul, neg, reshape, sum_entries, transpose,
    vstack,
};
pub use nonlinear::{abs, norm1, p_norm, quad_over_lin};
