//! Expression types and creation utilities.
//!
//! This module provides the core expression types of the canonicalizer:
//! - `Expr` - the expression tree, including constraint nodes
//! - `Shape` - matrix shapes; scalars are `(1, 1)`, vectors `(n, 1)`
//! - `Slice` - signed slice bounds for indexing
//! - Variable creation via `variable()` and the epigraph minters
//! - Constant creation via `constant()` and related functions

pub mod constant;
pub mod expression;
pub mod shape;
pub mod variable;

// Re-export main types
pub use constant::{constant, constant_dmatrix, constant_matrix, constant_vec, eye, ones, zeros};
pub use expression::{ConstantData, Expr, Slice, VarId, VariableData};
pub use shape::Shape;
pub use variable::{epi_var, named_variable, scalar_epi_var, variable, VariableBuilder};
