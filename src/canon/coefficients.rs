//! Affine coefficient extraction.
//!
//! `get_coefficients` walks an affine expression tree bottom-up and
//! produces, per free variable, the sparse matrix multiplying that
//! variable in the flattened (column-major) value of the expression,
//! plus a constant column under [`VarId::CONSTANT`].
//!
//! Each affine atom contributes one coefficient matrix per child; the
//! child's own map is folded in by sparse multiplication, summing on
//! collision. Multiplication by a constant matrix is encoded through
//! the block operators of `left_mul_coefficients` and
//! `right_mul_coefficients`.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use log::trace;
use nalgebra_sparse::CscMatrix;

use crate::error::{CanonError, Result};
use crate::expr::{Expr, Slice, VarId};
use crate::sparse::{
    csc_add, csc_from_triplets, csc_identity, csc_matmul, flatten_column_major, ones_matrix,
    scalar_matrix, unflatten_column,
};

/// Mapping from variable identifier to its sparse coefficient matrix.
///
/// For an expression of dimension `d`, every matrix has `d` rows; the
/// entry at [`VarId::CONSTANT`] is the constant term as a single column.
/// A missing key denotes a zero contribution.
pub type CoeffMap = HashMap<VarId, CscMatrix<f64>>;

/// Check whether a coefficient map describes a constant expression:
/// exactly one entry, keyed by [`VarId::CONSTANT`].
pub fn is_constant(coeffs: &CoeffMap) -> bool {
    coeffs.len() == 1 && coeffs.contains_key(&VarId::CONSTANT)
}

/// Extract the coefficient map of an affine expression.
///
/// The flattened value of `expr` equals `sum_v coeffs[v] * vec(v) + c`
/// where `c` is the column stored under [`VarId::CONSTANT`].
///
/// # Errors
///
/// Fails on any node without a linear coefficient rule, on a
/// multiplication where neither side is constant, and on dimension
/// disagreements while composing coefficients.
pub fn get_coefficients(expr: &Expr) -> Result<CoeffMap> {
    trace!("get_coefficients: {}", expr);

    let mut coeffs = CoeffMap::new();
    match expr {
        Expr::Constant(c) => {
            coeffs.insert(VarId::CONSTANT, flatten_column_major(&c.value));
        }
        Expr::Variable(v) => {
            coeffs.insert(v.id, csc_identity(expr.dim()));
        }
        Expr::Mul(lhs, rhs) => {
            // Binary mul is guaranteed to have one constant argument by
            // DCP rules.
            let lhs_coeffs = get_coefficients(lhs)?;
            let rhs_coeffs = get_coefficients(rhs)?;

            if is_constant(&lhs_coeffs) {
                let block = constant_block(&lhs_coeffs, lhs);
                let f = if lhs.dim() == 1 && rhs.dim() != 1 {
                    scalar_matrix(scalar_of(&block), expr.dim())
                } else {
                    left_mul_coefficients(expr, &block)
                };
                multiply_by_constant(&f, &rhs_coeffs, &mut coeffs)?;
            } else if is_constant(&rhs_coeffs) {
                let block = constant_block(&rhs_coeffs, rhs);
                let f = if rhs.dim() == 1 && lhs.dim() != 1 {
                    scalar_matrix(scalar_of(&block), expr.dim())
                } else {
                    right_mul_coefficients(expr, &block)
                };
                multiply_by_constant(&f, &lhs_coeffs, &mut coeffs)?;
            } else {
                return Err(CanonError::NonConstantMul(expr.to_string()));
            }
        }
        _ => {
            let f_coeffs = atom_coefficients(expr)?;
            for (f, arg) in f_coeffs.iter().zip(expr.args()) {
                let arg_coeffs = get_coefficients(arg)?;
                multiply_by_constant(f, &arg_coeffs, &mut coeffs)?;
            }
        }
    }

    Ok(coeffs)
}

/// Accumulate `lhs * m` into `result` for every entry `m` of `rhs`,
/// summing on collision.
fn multiply_by_constant(
    lhs: &CscMatrix<f64>,
    rhs: &CoeffMap,
    result: &mut CoeffMap,
) -> Result<()> {
    for (var_id, coeff) in rhs {
        trace!(
            "multiply_by_constant: {}x{} * {}x{}",
            lhs.nrows(),
            lhs.ncols(),
            coeff.nrows(),
            coeff.ncols()
        );
        let product = csc_matmul(lhs, coeff)?;
        match result.entry(*var_id) {
            Entry::Occupied(mut entry) => {
                let sum = csc_add(entry.get(), &product);
                entry.insert(sum);
            }
            Entry::Vacant(entry) => {
                entry.insert(product);
            }
        }
    }
    Ok(())
}

/// The constant side of a multiplication, restored to its matrix shape
/// from the flattened column its coefficient map stores.
fn constant_block(coeffs: &CoeffMap, side: &Expr) -> CscMatrix<f64> {
    let shape = side.shape();
    unflatten_column(&coeffs[&VarId::CONSTANT], shape.rows(), shape.cols())
}

/// The single entry of a `1x1` matrix, zero when unstored.
fn scalar_of(block: &CscMatrix<f64>) -> f64 {
    block.triplet_iter().map(|(_, _, v)| *v).sum()
}

/// Per-atom coefficient matrices, one per child.
fn atom_coefficients(expr: &Expr) -> Result<Vec<CscMatrix<f64>>> {
    match expr {
        Expr::Add(args) => Ok(add_coefficients(expr, args)),
        Expr::Neg(_) => Ok(vec![scalar_matrix(-1.0, expr.dim())]),
        Expr::SumEntries(arg) => Ok(vec![ones_matrix(1, arg.dim())]),
        Expr::Reshape(_, _) => Ok(vec![csc_identity(expr.dim())]),
        Expr::HStack(args) => Ok(stack_coefficients(expr, args, false)),
        Expr::VStack(args) => Ok(stack_coefficients(expr, args, true)),
        Expr::Index(arg, slices) => Ok(vec![index_coefficients(expr, arg, slices)?]),
        Expr::DiagVec(_) => Ok(vec![diag_vec_coefficients(expr)]),
        Expr::DiagMat(_) => Ok(vec![diag_mat_coefficients(expr)]),
        Expr::Transpose(_) => Ok(vec![transpose_coefficients(expr)]),
        other => Err(CanonError::NotAffine(other.to_string())),
    }
}

/// Coefficients for n-ary addition. A scalar argument is promoted to the
/// result shape by an all-ones column.
fn add_coefficients(expr: &Expr, args: &[Arc<Expr>]) -> Vec<CscMatrix<f64>> {
    args.iter()
        .map(|arg| {
            if arg.dim() == 1 {
                ones_matrix(expr.dim(), 1)
            } else {
                csc_identity(expr.dim())
            }
        })
        .collect()
}

/// Selection matrices for hstack/vstack. Each argument's entry `(i, j)`
/// maps to its destination flat position, column-major with the result's
/// row count.
fn stack_coefficients(expr: &Expr, args: &[Arc<Expr>], vertical: bool) -> Vec<CscMatrix<f64>> {
    let mut coeffs = Vec::with_capacity(args.len());
    let mut offset = 0;
    let expr_shape = expr.shape();
    for arg in args {
        let arg_shape = arg.shape();

        // For vstack the stacked columns interleave in the flattened
        // result; for hstack they are laid out in argument order.
        let (column_offset, offset_increment) = if vertical {
            (expr_shape.rows(), arg_shape.rows())
        } else {
            (arg_shape.rows(), arg.dim())
        };

        let mut triplets = Vec::with_capacity(arg.dim());
        for i in 0..arg_shape.rows() {
            for j in 0..arg_shape.cols() {
                let row_idx = i + j * column_offset + offset;
                let col_idx = i + j * arg_shape.rows();
                triplets.push((row_idx, col_idx, 1.0));
            }
        }

        coeffs.push(csc_from_triplets(expr.dim(), arg.dim(), &triplets));
        offset += offset_increment;
    }
    coeffs
}

/// Selection matrix for two-axis slicing.
///
/// Negative bounds wrap by the axis length; the column slice iterates
/// outermost so the selected entries appear in column-major order of the
/// sliced result.
fn index_coefficients(expr: &Expr, arg: &Expr, slices: &[Slice; 2]) -> Result<CscMatrix<f64>> {
    let [row_slice, col_slice] = slices;
    if row_slice.step == 0 || col_slice.step == 0 {
        return Err(CanonError::InvalidSlice(format!("zero step in {}", expr)));
    }

    let rows = arg.shape().rows();
    let cols = arg.shape().cols();
    let out_dim = expr.dim();

    // An empty slice selects nothing.
    if out_dim == 0 || arg.dim() == 0 {
        return Ok(CscMatrix::zeros(out_dim, arg.dim()));
    }

    let (row_start, row_stop, row_step) = row_slice.bounds(rows);
    let (col_start, col_stop, col_step) = col_slice.bounds(cols);

    let mut triplets = Vec::with_capacity(out_dim);
    let mut counter = 0;
    let mut col = col_start;
    loop {
        if col < 0 || col >= cols as isize {
            break;
        }
        let mut row = row_start;
        loop {
            if row < 0 || row >= rows as isize {
                break;
            }
            triplets.push((counter, (col * rows as isize + row) as usize, 1.0));
            counter += 1;
            row += row_step;
            if (row_step > 0 && row >= row_stop) || (row_step < 0 && row < row_stop) {
                break;
            }
        }
        col += col_step;
        if (col_step > 0 && col >= col_stop) || (col_step < 0 && col < col_stop) {
            break;
        }
    }

    Ok(csc_from_triplets(out_dim, rows * cols, &triplets))
}

/// Vector to diagonal matrix: entry `i` lands at flat position `i*n + i`.
fn diag_vec_coefficients(expr: &Expr) -> CscMatrix<f64> {
    let rows = expr.shape().rows();
    let triplets: Vec<_> = (0..rows).map(|i| (i * rows + i, i, 1.0)).collect();
    csc_from_triplets(rows * rows, rows, &triplets)
}

/// Square matrix to its diagonal: flat position `i*n + i` maps to entry `i`.
fn diag_mat_coefficients(expr: &Expr) -> CscMatrix<f64> {
    let rows = expr.shape().rows();
    let triplets: Vec<_> = (0..rows).map(|i| (i, i * rows + i, 1.0)).collect();
    csc_from_triplets(rows, rows * rows, &triplets)
}

/// Permutation mapping the input's column-major order to the transposed
/// output's column-major order.
fn transpose_coefficients(expr: &Expr) -> CscMatrix<f64> {
    let rows = expr.shape().rows();
    let cols = expr.shape().cols();

    let mut triplets = Vec::with_capacity(rows * cols);
    for i in 0..rows {
        for j in 0..cols {
            let row_idx = rows * j + i;
            let col_idx = i * cols + j;
            triplets.push((row_idx, col_idx, 1.0));
        }
    }
    csc_from_triplets(rows * cols, rows * cols, &triplets)
}

/// Operator for left-multiplication by a constant `block`: for a result
/// with `n` columns, a block-diagonal matrix of `n` copies of `block`.
fn left_mul_coefficients(expr: &Expr, block: &CscMatrix<f64>) -> CscMatrix<f64> {
    let block_rows = block.nrows();
    let block_cols = block.ncols();
    let num_blocks = expr.shape().cols();

    let mut triplets = Vec::with_capacity(num_blocks * block.nnz());
    for curr_block in 0..num_blocks {
        let start_i = curr_block * block_rows;
        let start_j = curr_block * block_cols;
        for (i, j, val) in block.triplet_iter() {
            triplets.push((start_i + i, start_j + j, *val));
        }
    }
    csc_from_triplets(num_blocks * block_rows, num_blocks * block_cols, &triplets)
}

/// Operator for right-multiplication by a constant: each nonzero of the
/// constant occupies a scaled `n x n` identity block, with `n` the row
/// count of the result.
fn right_mul_coefficients(expr: &Expr, constant: &CscMatrix<f64>) -> CscMatrix<f64> {
    let rows = constant.nrows();
    let cols = constant.ncols();
    let n = expr.shape().rows();

    let mut triplets = Vec::with_capacity(n * constant.nnz());
    for (r, c, val) in constant.triplet_iter() {
        let row_start = c * n;
        let col_start = r * n;
        for i in 0..n {
            triplets.push((row_start + i, col_start + i, *val));
        }
    }
    csc_from_triplets(cols * n, rows * n, &triplets)
}
