//! Tests for affine coefficient extraction.
//!
//! Coefficient matrices are checked numerically: applying the extracted
//! coefficients to a flattened (column-major) assignment must reproduce
//! the flattened value of the expression.

use conicform::prelude::*;
use conicform::sparse::csc_to_dense;
use nalgebra::DMatrix;

const TOL: f64 = 1e-12;

fn assert_dense_eq(a: &DMatrix<f64>, b: &DMatrix<f64>) {
    assert_eq!(a.nrows(), b.nrows(), "row count mismatch");
    assert_eq!(a.ncols(), b.ncols(), "column count mismatch");
    for j in 0..a.ncols() {
        for i in 0..a.nrows() {
            assert!(
                (a[(i, j)] - b[(i, j)]).abs() < TOL,
                "entry ({}, {}) differs: {} vs {}",
                i,
                j,
                a[(i, j)],
                b[(i, j)]
            );
        }
    }
}

fn coeff_of(coeffs: &CoeffMap, id: VarId) -> DMatrix<f64> {
    csc_to_dense(coeffs.get(&id).expect("missing coefficient entry"))
}

fn vec_of(m: &DMatrix<f64>) -> DMatrix<f64> {
    DMatrix::from_column_slice(m.nrows() * m.ncols(), 1, m.as_slice())
}

// ============================================================================
// Leaves
// ============================================================================

#[test]
fn test_variable_is_identity() {
    let x = variable(2);
    let coeffs = get_coefficients(&x).expect("extract failed");

    assert_eq!(coeffs.len(), 1);
    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::identity(2, 2));
}

#[test]
fn test_constant_is_flattened_column() {
    let c = constant_matrix(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
    let coeffs = get_coefficients(&c).expect("extract failed");

    assert!(is_constant(&coeffs));
    let b = coeff_of(&coeffs, VarId::CONSTANT);
    assert_dense_eq(&b, &DMatrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]));
}

// ============================================================================
// Addition and negation
// ============================================================================

#[test]
fn test_add_variable_and_constant() {
    let x = variable(2);
    let e = add(&x, &constant_vec(vec![3.0, 4.0]));
    let coeffs = get_coefficients(&e).expect("extract failed");

    assert_eq!(coeffs.len(), 2);
    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::identity(2, 2));
    let b = coeff_of(&coeffs, VarId::CONSTANT);
    assert_dense_eq(&b, &DMatrix::from_vec(2, 1, vec![3.0, 4.0]));
}

#[test]
fn test_add_scalar_promotion() {
    // x + 1 with vector x: the scalar constant broadcasts to every entry.
    let x = variable(3);
    let e = add(&x, &constant(1.0));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let b = coeff_of(&coeffs, VarId::CONSTANT);
    assert_dense_eq(&b, &DMatrix::from_element(3, 1, 1.0));
}

#[test]
fn test_sub_collapses_to_zero() {
    let x = variable(2);
    let e = &x - &x;
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::zeros(2, 2));
}

#[test]
fn test_neg() {
    let x = variable(3);
    let coeffs = get_coefficients(&neg(&x)).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::from_diagonal_element(3, 3, -1.0));
}

// ============================================================================
// Multiplication
// ============================================================================

#[test]
fn test_left_mul_matrix_vector() {
    // [[1, 2], [3, 4]] * x for x in R^2: the coefficient is the matrix itself.
    let x = variable(2);
    let a_mat = constant_matrix(2, 2, vec![1.0, 3.0, 2.0, 4.0]);
    let e = mul(&a_mat, &x);
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::from_vec(2, 2, vec![1.0, 3.0, 2.0, 4.0]));
}

#[test]
fn test_left_mul_matrix_matrix() {
    // C * X with X a 2x2 variable: check the coefficient numerically
    // against vec(C * X0).
    let x = variable((2, 2));
    let c = DMatrix::from_vec(2, 2, vec![1.0, 3.0, 2.0, 4.0]);
    let e = mul(&constant_dmatrix(c.clone()), &x);
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let x0 = DMatrix::from_vec(2, 2, vec![5.0, 7.0, 6.0, 8.0]);
    assert_dense_eq(&(&a * vec_of(&x0)), &vec_of(&(&c * &x0)));
}

#[test]
fn test_right_mul_matrix_matrix() {
    // X * B with X a 2x2 variable: check against vec(X0 * B).
    let x = variable((2, 2));
    let b = DMatrix::from_vec(2, 2, vec![1.0, 3.0, 2.0, 4.0]);
    let e = mul(&x, &constant_dmatrix(b.clone()));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let x0 = DMatrix::from_vec(2, 2, vec![5.0, 7.0, 6.0, 8.0]);
    assert_dense_eq(&(&a * vec_of(&x0)), &vec_of(&(&x0 * &b)));
}

#[test]
fn test_right_mul_rectangular() {
    // X (2x3) times B (3x2): operator dimensions follow the result shape.
    let x = variable((2, 3));
    let b = DMatrix::from_vec(3, 2, vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    let e = mul(&x, &constant_dmatrix(b.clone()));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_eq!(a.nrows(), 4);
    assert_eq!(a.ncols(), 6);
    let x0 = DMatrix::from_vec(2, 3, vec![1.0, -1.0, 0.5, 2.0, -3.0, 1.5]);
    assert_dense_eq(&(&a * vec_of(&x0)), &vec_of(&(&x0 * &b)));
}

#[test]
fn test_scalar_mul_promotes() {
    // 2 * x scales the identity.
    let x = variable(3);
    let e = 2.0 * &x;
    let coeffs = get_coefficients(&e).expect("extract failed");
    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::from_diagonal_element(3, 3, 2.0));

    // The scalar can sit on either side.
    let x = variable((2, 2));
    let e = mul(&x, &constant(3.0));
    let coeffs = get_coefficients(&e).expect("extract failed");
    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::from_diagonal_element(4, 4, 3.0));
}

#[test]
fn test_mul_constant_folding() {
    // A * c with both sides constant stays a pure constant map.
    let a_mat = constant_matrix(2, 2, vec![1.0, 3.0, 2.0, 4.0]);
    let c = constant_vec(vec![1.0, 1.0]);
    let coeffs = get_coefficients(&mul(&a_mat, &c)).expect("extract failed");

    assert!(is_constant(&coeffs));
    let b = coeff_of(&coeffs, VarId::CONSTANT);
    assert_dense_eq(&b, &DMatrix::from_vec(2, 1, vec![3.0, 7.0]));
}

#[test]
fn test_mul_two_variables_fails() {
    let x = variable(2);
    let y = variable((1, 2));
    assert!(get_coefficients(&mul(&y, &x)).is_err());
}

// ============================================================================
// Sum, reshape, transpose
// ============================================================================

#[test]
fn test_sum_entries_is_ones_row() {
    let x = variable(3);
    let coeffs = get_coefficients(&sum_entries(&x)).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::from_element(1, 3, 1.0));
}

#[test]
fn test_reshape_is_identity() {
    let x = variable((2, 3));
    let e = reshape(&x, (3, 2));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::identity(6, 6));
}

#[test]
fn test_transpose_reorders_columns() {
    // For a 2x3 variable, the coefficient applied to vec(M) must give
    // vec(M').
    let x = variable((2, 3));
    let coeffs = get_coefficients(&transpose(&x)).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let m = DMatrix::from_vec(2, 3, vec![1.0, 4.0, 2.0, 5.0, 3.0, 6.0]);
    assert_dense_eq(&(&a * vec_of(&m)), &vec_of(&m.transpose()));
}

#[test]
fn test_transpose_involution() {
    // transpose(transpose(x)) composes to the identity.
    let x = variable((2, 3));
    let e = transpose(&transpose(&x));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    assert_dense_eq(&a, &DMatrix::identity(6, 6));
}

// ============================================================================
// Stacking
// ============================================================================

#[test]
fn test_hstack_layout() {
    // vec([A0 | B0]) must equal F_a vec(A0) + F_b vec(B0).
    let a = variable((2, 2));
    let b = variable((2, 1));
    let e = hstack(&[a.clone(), b.clone()]);
    let coeffs = get_coefficients(&e).expect("extract failed");

    let fa = coeff_of(&coeffs, a.variable_id().unwrap());
    let fb = coeff_of(&coeffs, b.variable_id().unwrap());
    let a0 = DMatrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
    let b0 = DMatrix::from_vec(2, 1, vec![5.0, 6.0]);

    let mut stacked = DMatrix::zeros(2, 3);
    stacked.view_mut((0, 0), (2, 2)).copy_from(&a0);
    stacked.view_mut((0, 2), (2, 1)).copy_from(&b0);

    let got = &fa * vec_of(&a0) + &fb * vec_of(&b0);
    assert_dense_eq(&got, &vec_of(&stacked));
}

#[test]
fn test_vstack_layout() {
    // vec([A0; B0]) must equal F_a vec(A0) + F_b vec(B0).
    let a = variable((2, 2));
    let b = variable((1, 2));
    let e = vstack(&[a.clone(), b.clone()]);
    let coeffs = get_coefficients(&e).expect("extract failed");

    let fa = coeff_of(&coeffs, a.variable_id().unwrap());
    let fb = coeff_of(&coeffs, b.variable_id().unwrap());
    let a0 = DMatrix::from_vec(2, 2, vec![1.0, 2.0, 3.0, 4.0]);
    let b0 = DMatrix::from_vec(1, 2, vec![5.0, 6.0]);

    let mut stacked = DMatrix::zeros(3, 2);
    stacked.view_mut((0, 0), (2, 2)).copy_from(&a0);
    stacked.view_mut((2, 0), (1, 2)).copy_from(&b0);

    let got = &fa * vec_of(&a0) + &fb * vec_of(&b0);
    assert_dense_eq(&got, &vec_of(&stacked));
}

// ============================================================================
// Indexing
// ============================================================================

#[test]
fn test_index_strided() {
    // Rows {1, 3} and columns {0, 2} of a 4x3 variable.
    let x = variable((4, 3));
    let e = index(&x, Slice::new(1, 4, 2), Slice::new(0, 3, 2));
    assert_eq!(e.shape(), Shape::matrix(2, 2));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let x0 = DMatrix::from_fn(4, 3, |i, j| (j * 4 + i) as f64);
    let expected = DMatrix::from_fn(2, 2, |i, j| x0[(1 + 2 * i, 2 * j)]);
    assert_dense_eq(&(&a * vec_of(&x0)), &vec_of(&expected));
}

#[test]
fn test_index_negative_bounds() {
    // Rows -3..-1 of a length-5 vector select entries {2, 3}.
    let x = variable(5);
    let e = index(&x, Slice::new(-3, -1, 1), Slice::all(1));
    assert_eq!(e.shape(), Shape::vector(2));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let x0 = DMatrix::from_vec(5, 1, vec![10.0, 11.0, 12.0, 13.0, 14.0]);
    assert_dense_eq(&(&a * &x0), &DMatrix::from_vec(2, 1, vec![12.0, 13.0]));
}

#[test]
fn test_index_negative_step_reverses() {
    let x = variable(4);
    let e = index(&x, Slice::new(-1, -5, -1), Slice::all(1));
    assert_eq!(e.shape(), Shape::vector(4));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let x0 = DMatrix::from_vec(4, 1, vec![1.0, 2.0, 3.0, 4.0]);
    assert_dense_eq(&(&a * &x0), &DMatrix::from_vec(4, 1, vec![4.0, 3.0, 2.0, 1.0]));
}

#[test]
fn test_index_empty_slice() {
    let x = variable((4, 3));
    let e = index(&x, Slice::new(2, 2, 1), Slice::all(3));
    assert_eq!(e.dim(), 0);
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = &coeffs[&x.variable_id().unwrap()];
    assert_eq!(a.nrows(), 0);
    assert_eq!(a.ncols(), 12);
}

// ============================================================================
// Diagonals
// ============================================================================

#[test]
fn test_diag_vec() {
    let x = variable(3);
    let coeffs = get_coefficients(&diag_vec(&x)).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let x0 = DMatrix::from_vec(3, 1, vec![1.0, 2.0, 3.0]);
    let expected = DMatrix::from_diagonal(&nalgebra::DVector::from_vec(vec![1.0, 2.0, 3.0]));
    assert_dense_eq(&(&a * &x0), &vec_of(&expected));
}

#[test]
fn test_diag_mat() {
    let x = variable((3, 3));
    let coeffs = get_coefficients(&diag_mat(&x)).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let x0 = DMatrix::from_fn(3, 3, |i, j| (j * 3 + i + 1) as f64);
    let expected = DMatrix::from_vec(3, 1, vec![x0[(0, 0)], x0[(1, 1)], x0[(2, 2)]]);
    assert_dense_eq(&(&a * vec_of(&x0)), &expected);
}

// ============================================================================
// Composition and invariants
// ============================================================================

#[test]
fn test_composite_expression_evaluates() {
    // sum(A * x + c) checked against a direct dense evaluation.
    let x = variable(2);
    let a_mat = DMatrix::from_vec(2, 2, vec![1.0, 3.0, 2.0, 4.0]);
    let c_vec = DMatrix::from_vec(2, 1, vec![0.5, -0.5]);
    let e = sum_entries(&add(
        &mul(&constant_dmatrix(a_mat.clone()), &x),
        &constant_dmatrix(c_vec.clone()),
    ));
    let coeffs = get_coefficients(&e).expect("extract failed");

    let a = coeff_of(&coeffs, x.variable_id().unwrap());
    let b = coeff_of(&coeffs, VarId::CONSTANT);
    let x0 = DMatrix::from_vec(2, 1, vec![2.0, -1.0]);

    let got = (&a * &x0)[(0, 0)] + b[(0, 0)];
    let expected = (&a_mat * &x0 + &c_vec).sum();
    assert!((got - expected).abs() < TOL);
}

#[test]
fn test_row_counts_match_dimension() {
    // Every coefficient matrix has dim(expr) rows.
    let x = variable((2, 3));
    let exprs = vec![
        neg(&x),
        transpose(&x),
        sum_entries(&x),
        reshape(&x, 6),
        vstack(&[x.clone(), x.clone()]),
        hstack(&[x.clone(), x.clone()]),
        index(&x, Slice::new(0, 2, 1), Slice::new(1, 3, 1)),
    ];

    for e in exprs {
        let coeffs = get_coefficients(&e).expect("extract failed");
        for m in coeffs.values() {
            assert_eq!(m.nrows(), e.dim(), "wrong row count for {}", e);
        }
    }
}

#[test]
fn test_column_counts_match_variable_dimension() {
    let x = variable((2, 3));
    let e = transpose(&x);
    let coeffs = get_coefficients(&e).expect("extract failed");
    assert_eq!(coeffs[&x.variable_id().unwrap()].ncols(), 6);
}
