//! # conicform
//!
//! A canonicalizer for convex optimization problems: it transforms a
//! symbolic expression tree into canonical conic form, where every relation
//! is affine and all nonlinearity lives in cone-constraint primitives.
//!
//! Two pipelines operate over the same expression model:
//!
//! - **Cone transformation** replaces each nonlinear atom (`abs`,
//!   `p_norm` with p = 1, `quad_over_lin`) with a fresh epigraph variable,
//!   emitting linear-inequality and second-order-cone constraints.
//! - **Affine coefficient extraction** flattens an affine expression into
//!   one sparse matrix per variable (plus a constant column), with respect
//!   to column-major vectorization.
//!
//! ## Quick Start
//!
//! ```
//! use conicform::prelude::*;
//!
//! // minimize ||x||_1 subject to x <= 1
//! let x = variable(3);
//! let problem = Problem::minimize(norm1(&x))
//!     .subject_to([leq(&x, &constant(1.0))]);
//!
//! // Rewrite into an equivalent problem with affine expressions only.
//! let affine = LinearConeTransform.transform(&problem)?;
//!
//! // Every subexpression now flattens to sparse coefficients.
//! let coeffs = get_coefficients(&affine.objective)?;
//! assert!(!coeffs.is_empty());
//! # Ok::<(), conicform::CanonError>(())
//! ```
//!
//! ## Architecture
//!
//! - **Expression trees** built using the `Expr` enum with `Arc` sharing;
//!   constraints are expression nodes too
//! - **Cone transformation** via a bottom-up rewrite with a constraint
//!   accumulator
//! - **Coefficient extraction** via per-atom sparse selection matrices
//!   composed by sparse multiplication
//!
//! Inputs are assumed DCP-compliant; the canonicalizer verifies structure,
//! not curvature.

pub mod atoms;
pub mod canon;
pub mod constraints;
pub mod error;
pub mod expr;
pub mod problem;
pub mod sparse;

/// Prelude module for convenient imports.
///
/// ```
/// use conicform::prelude::*;
/// ```
pub mod prelude {
    // Expression types
    pub use crate::expr::{
        constant, constant_dmatrix, constant_matrix, constant_vec, epi_var, eye, named_variable,
        ones, scalar_epi_var, variable, zeros, Expr, Shape, Slice, VarId, VariableBuilder,
    };

    // Atoms
    pub use crate::atoms::{
        abs, add, add_all, diag_mat, diag_vec, hstack, index, mul, neg, norm1, p_norm,
        quad_over_lin, reshape, sum_entries, transpose, vstack,
    };

    // Constraints
    pub use crate::constraints::{eq, leq, soc};

    // Canonicalization
    pub use crate::canon::{
        get_coefficients, is_constant, transform_expression, CoeffMap, LinearConeTransform,
    };

    // Problem
    pub use crate::problem::{Problem, Sense};

    // Errors
    pub use crate::error::{CanonError, Result};
}

// Re-export main types at crate root
pub use canon::{get_coefficients, CoeffMap, LinearConeTransform};
pub use error::{CanonError, Result};
pub use problem::{Problem, Sense};
