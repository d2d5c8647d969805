//! Constant expression creation.

use nalgebra::DMatrix;

use super::expression::{ConstantData, Expr};
use super::shape::Shape;

/// Create a constant expression from a scalar.
pub fn constant(value: f64) -> Expr {
    Expr::Constant(ConstantData {
        value: DMatrix::from_element(1, 1, value),
    })
}

/// Create a constant expression from a column vector.
pub fn constant_vec(values: Vec<f64>) -> Expr {
    let n = values.len();
    Expr::Constant(ConstantData {
        value: DMatrix::from_vec(n, 1, values),
    })
}

/// Create a constant expression from values in column-major order.
pub fn constant_matrix(rows: usize, cols: usize, values: Vec<f64>) -> Expr {
    Expr::Constant(ConstantData {
        value: DMatrix::from_vec(rows, cols, values),
    })
}

/// Create a constant expression from a nalgebra matrix.
pub fn constant_dmatrix(value: DMatrix<f64>) -> Expr {
    Expr::Constant(ConstantData { value })
}

/// Create a zero constant with the given shape.
pub fn zeros(shape: impl Into<Shape>) -> Expr {
    let shape = shape.into();
    Expr::Constant(ConstantData {
        value: DMatrix::zeros(shape.rows(), shape.cols()),
    })
}

/// Create a ones constant with the given shape.
pub fn ones(shape: impl Into<Shape>) -> Expr {
    let shape = shape.into();
    Expr::Constant(ConstantData {
        value: DMatrix::from_element(shape.rows(), shape.cols(), 1.0),
    })
}

/// Create an identity matrix constant.
pub fn eye(n: usize) -> Expr {
    Expr::Constant(ConstantData {
        value: DMatrix::identity(n, n),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constant_scalar() {
        let c = constant(5.0);
        assert_eq!(c.shape(), Shape::scalar());
        assert_eq!(c.constant_value().unwrap()[(0, 0)], 5.0);
    }

    #[test]
    fn test_constant_vec() {
        let c = constant_vec(vec![1.0, 2.0, 3.0]);
        assert_eq!(c.shape(), Shape::vector(3));
    }

    #[test]
    fn test_constant_matrix_column_major() {
        let c = constant_matrix(2, 2, vec![1.0, 3.0, 2.0, 4.0]);
        let m = c.constant_value().unwrap();
        assert_eq!(m[(0, 0)], 1.0);
        assert_eq!(m[(1, 0)], 3.0);
        assert_eq!(m[(0, 1)], 2.0);
        assert_eq!(m[(1, 1)], 4.0);
    }

    #[test]
    fn test_zeros_ones_eye() {
        assert_eq!(zeros((3, 4)).shape(), Shape::matrix(3, 4));
        assert_eq!(ones(5).shape(), Shape::vector(5));
        assert_eq!(eye(3).shape(), Shape::matrix(3, 3));
    }
}
