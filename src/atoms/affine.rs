//! Affine atoms and operator overloading.
//!
//! Affine atoms preserve linearity: the coefficient extractor can turn any
//! tree built from these (plus leaves) into one sparse matrix per variable.

use std::ops;
use std::sync::Arc;

use crate::expr::{constant, Expr, Shape, Slice};

// ============================================================================
// Constructor functions
// ============================================================================

/// Addition: a + b.
pub fn add(a: &Expr, b: &Expr) -> Expr {
    Expr::Add(vec![Arc::new(a.clone()), Arc::new(b.clone())])
}

/// Sum of any number of arguments.
pub fn add_all(args: &[Expr]) -> Expr {
    Expr::Add(args.iter().cloned().map(Arc::new).collect())
}

/// Negation: -a.
pub fn neg(a: &Expr) -> Expr {
    Expr::Neg(Arc::new(a.clone()))
}

/// Matrix multiplication: a * b.
///
/// Exactly one side must be constant for the result to remain affine.
pub fn mul(a: &Expr, b: &Expr) -> Expr {
    Expr::Mul(Arc::new(a.clone()), Arc::new(b.clone()))
}

/// Sum of all entries, producing a scalar.
pub fn sum_entries(a: &Expr) -> Expr {
    Expr::SumEntries(Arc::new(a.clone()))
}

/// Horizontal stack: [a, b, ...]. All arguments share a row count.
pub fn hstack(args: &[Expr]) -> Expr {
    Expr::HStack(args.iter().cloned().map(Arc::new).collect())
}

/// Vertical stack: [a; b; ...]. All arguments share a column count.
pub fn vstack(args: &[Expr]) -> Expr {
    Expr::VStack(args.iter().cloned().map(Arc::new).collect())
}

/// Reshape, preserving column-major flattened order.
pub fn reshape(a: &Expr, shape: impl Into<Shape>) -> Expr {
    Expr::Reshape(Arc::new(a.clone()), shape.into())
}

/// Two-axis slicing: select `rows` then `cols`.
pub fn index(a: &Expr, rows: Slice, cols: Slice) -> Expr {
    Expr::Index(Arc::new(a.clone()), [rows, cols])
}

/// Vector to diagonal matrix: (n, 1) -> (n, n).
pub fn diag_vec(a: &Expr) -> Expr {
    Expr::DiagVec(Arc::new(a.clone()))
}

/// Square matrix to its diagonal as a vector: (n, n) -> (n, 1).
pub fn diag_mat(a: &Expr) -> Expr {
    Expr::DiagMat(Arc::new(a.clone()))
}

/// Transpose.
pub fn transpose(a: &Expr) -> Expr {
    Expr::Transpose(Arc::new(a.clone()))
}

// ============================================================================
// Operator overloading for Expr
// ============================================================================

impl ops::Neg for Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Arc::new(self))
    }
}

impl ops::Neg for &Expr {
    type Output = Expr;

    fn neg(self) -> Expr {
        Expr::Neg(Arc::new(self.clone()))
    }
}

impl ops::Add for Expr {
    type Output = Expr;

    fn add(self, rhs: Expr) -> Expr {
        Expr::Add(vec![Arc::new(self), Arc::new(rhs)])
    }
}

impl ops::Add for &Expr {
    type Output = Expr;

    fn add(self, rhs: &Expr) -> Expr {
        self.clone() + rhs.clone()
    }
}

impl ops::Sub for Expr {
    type Output = Expr;

    fn sub(self, rhs: Expr) -> Expr {
        Expr::Add(vec![Arc::new(self), Arc::new(Expr::Neg(Arc::new(rhs)))])
    }
}

impl ops::Sub for &Expr {
    type Output = Expr;

    fn sub(self, rhs: &Expr) -> Expr {
        self.clone() - rhs.clone()
    }
}

impl ops::Mul for Expr {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::Mul(Arc::new(self), Arc::new(rhs))
    }
}

impl ops::Mul for &Expr {
    type Output = Expr;

    fn mul(self, rhs: &Expr) -> Expr {
        self.clone() * rhs.clone()
    }
}

// Scalar multiplication
impl ops::Mul<Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: Expr) -> Expr {
        Expr::Mul(Arc::new(constant(self)), Arc::new(rhs))
    }
}

impl ops::Mul<&Expr> for f64 {
    type Output = Expr;

    fn mul(self, rhs: &Expr) -> Expr {
        self * rhs.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expr::{constant_vec, variable};

    #[test]
    fn test_constructor_shapes() {
        let x = variable(3);
        let c = constant_vec(vec![1.0, 2.0, 3.0]);

        assert_eq!(add(&x, &c).shape(), Shape::vector(3));
        assert_eq!(neg(&x).shape(), Shape::vector(3));
        assert_eq!(sum_entries(&x).shape(), Shape::scalar());
        assert_eq!(vstack(&[x.clone(), c.clone()]).shape(), Shape::vector(6));
        assert_eq!(transpose(&x).shape(), Shape::matrix(1, 3));
    }

    #[test]
    fn test_operator_sugar() {
        let x = variable(3);
        let y = variable(3);

        let e = &x + &y;
        assert!(matches!(e, Expr::Add(ref args) if args.len() == 2));

        let e = &x - &y;
        assert!(matches!(e, Expr::Add(ref args) if args.len() == 2));

        let e = 2.0 * &x;
        assert!(matches!(e, Expr::Mul(_, _)));
        assert_eq!(e.shape(), Shape::vector(3));
    }
}
