//! Sparse matrix utilities.
//!
//! Helper functions over nalgebra-sparse. Every coefficient matrix in the
//! canonicalizer is a `CscMatrix<f64>` built through these constructors, and
//! triplet assembly sums duplicate entries.

use nalgebra::DMatrix;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::error::{CanonError, Result};

/// Create a CSC matrix from `(row, col, value)` triplets.
///
/// Duplicates are summed together.
pub fn csc_from_triplets(
    nrows: usize,
    ncols: usize,
    triplets: &[(usize, usize, f64)],
) -> CscMatrix<f64> {
    if triplets.is_empty() {
        return CscMatrix::zeros(nrows, ncols);
    }

    let mut coo = CooMatrix::new(nrows, ncols);
    for &(row, col, val) in triplets {
        coo.push(row, col, val);
    }
    CscMatrix::from(&coo)
}

/// Create a CSC identity matrix.
pub fn csc_identity(n: usize) -> CscMatrix<f64> {
    CscMatrix::identity(n)
}

/// Create a matrix of all ones.
pub fn ones_matrix(nrows: usize, ncols: usize) -> CscMatrix<f64> {
    let mut triplets = Vec::with_capacity(nrows * ncols);
    for j in 0..ncols {
        for i in 0..nrows {
            triplets.push((i, j, 1.0));
        }
    }
    csc_from_triplets(nrows, ncols, &triplets)
}

/// Create the scaled identity `v * I_n`.
pub fn scalar_matrix(v: f64, n: usize) -> CscMatrix<f64> {
    let triplets: Vec<_> = (0..n).map(|i| (i, i, v)).collect();
    csc_from_triplets(n, n, &triplets)
}

/// Convert a dense matrix to CSC format, dropping explicit zeros.
pub fn dense_to_csc(dense: &DMatrix<f64>) -> CscMatrix<f64> {
    let mut triplets = Vec::new();
    for j in 0..dense.ncols() {
        for i in 0..dense.nrows() {
            let v = dense[(i, j)];
            if v != 0.0 {
                triplets.push((i, j, v));
            }
        }
    }
    csc_from_triplets(dense.nrows(), dense.ncols(), &triplets)
}

/// Convert CSC to a dense matrix.
pub fn csc_to_dense(sparse: &CscMatrix<f64>) -> DMatrix<f64> {
    let mut dense = DMatrix::zeros(sparse.nrows(), sparse.ncols());
    for (row, col, val) in sparse.triplet_iter() {
        dense[(row, col)] += *val;
    }
    dense
}

/// Flatten a dense matrix to a single sparse column in column-major order.
///
/// Entry `(i, j)` of an `(r, c)` matrix lands at row `j * r + i`.
pub fn flatten_column_major(dense: &DMatrix<f64>) -> CscMatrix<f64> {
    let rows = dense.nrows();
    let mut triplets = Vec::new();
    for j in 0..dense.ncols() {
        for i in 0..rows {
            let v = dense[(i, j)];
            if v != 0.0 {
                triplets.push((j * rows + i, 0, v));
            }
        }
    }
    csc_from_triplets(dense.nrows() * dense.ncols(), 1, &triplets)
}

/// Reinterpret a flattened column as an `(nrows, ncols)` sparse matrix.
///
/// Inverse of [`flatten_column_major`] for matching dimensions.
pub fn unflatten_column(column: &CscMatrix<f64>, nrows: usize, ncols: usize) -> CscMatrix<f64> {
    let mut triplets = Vec::new();
    for (flat, _, val) in column.triplet_iter() {
        triplets.push((flat % nrows, flat / nrows, *val));
    }
    csc_from_triplets(nrows, ncols, &triplets)
}

/// Dimension-checked sparse product `a * b`.
pub fn csc_matmul(a: &CscMatrix<f64>, b: &CscMatrix<f64>) -> Result<CscMatrix<f64>> {
    if a.ncols() != b.nrows() {
        return Err(CanonError::ShapeMismatch {
            lhs_rows: a.nrows(),
            lhs_cols: a.ncols(),
            rhs_rows: b.nrows(),
            rhs_cols: b.ncols(),
        });
    }
    Ok(a * b)
}

/// Entrywise sum of two matrices with identical dimensions.
pub fn csc_add(a: &CscMatrix<f64>, b: &CscMatrix<f64>) -> CscMatrix<f64> {
    a + b
}
