//! Error types for conicform.

use thiserror::Error;

/// Error type for canonicalization operations.
///
/// All of these indicate a precondition violation on the input tree:
/// the canonicalizer is all-or-nothing and never produces partial results.
#[derive(Debug, Error)]
pub enum CanonError {
    /// An expression with no linear coefficient rule reached the extractor.
    #[error("no linear coefficients for {0}")]
    NotAffine(String),

    /// A multiplication where neither side is constant.
    #[error("cannot multiply two non-constant expressions in {0}")]
    NonConstantMul(String),

    /// Dimension disagreement in a sparse-matrix product.
    #[error("shape mismatch: cannot multiply {lhs_rows}x{lhs_cols} by {rhs_rows}x{rhs_cols}")]
    ShapeMismatch {
        lhs_rows: usize,
        lhs_cols: usize,
        rhs_rows: usize,
        rhs_cols: usize,
    },

    /// An index slice that cannot be materialized.
    #[error("invalid slice: {0}")]
    InvalidSlice(String),

    /// A p-norm the cone transformer does not handle.
    #[error("unsupported p-norm with p = {0}; only p = 1 can be transformed")]
    UnsupportedPNorm(f64),
}

/// Result type for canonicalization operations.
pub type Result<T> = std::result::Result<T, CanonError>;
