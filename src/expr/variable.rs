//! Variable creation and epigraph-variable minting.

use super::expression::{Expr, VarId, VariableData};
use super::shape::Shape;

/// Builder for creating variables.
#[derive(Default)]
pub struct VariableBuilder {
    shape: Shape,
    name: Option<String>,
}

impl VariableBuilder {
    /// Create a new variable builder with the given shape.
    pub fn new(shape: impl Into<Shape>) -> Self {
        Self {
            shape: shape.into(),
            ..Default::default()
        }
    }

    /// Set the name of the variable.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Build the variable expression.
    pub fn build(self) -> Expr {
        Expr::Variable(VariableData {
            id: VarId::new(),
            shape: self.shape,
            name: self.name,
        })
    }
}

/// Create a variable with the given shape.
///
/// # Examples
///
/// ```
/// use conicform::expr::variable;
///
/// let x = variable(());       // scalar
/// let y = variable(5);        // vector of length 5
/// let z = variable((3, 4));   // 3 x 4 matrix
/// ```
pub fn variable(shape: impl Into<Shape>) -> Expr {
    VariableBuilder::new(shape).build()
}

/// Create a named variable with the given shape.
pub fn named_variable(name: impl Into<String>, shape: impl Into<Shape>) -> Expr {
    VariableBuilder::new(shape).name(name).build()
}

/// Mint a fresh epigraph variable shaped like `parent`.
///
/// Identifiers are globally unique; the label only names the variable for
/// debugging output.
pub fn epi_var(parent: &Expr, label: &str) -> Expr {
    VariableBuilder::new(parent.shape()).name(label).build()
}

/// Mint a fresh scalar epigraph variable.
pub fn scalar_epi_var(_parent: &Expr, label: &str) -> Expr {
    VariableBuilder::new(Shape::scalar()).name(label).build()
}
