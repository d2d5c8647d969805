//! Problem definition.
//!
//! A `Problem` pairs an objective expression with a list of constraint
//! expressions. The cone transformer consumes one problem and produces
//! another whose every subexpression is affine.

use std::collections::HashMap;

use crate::expr::{Expr, Shape, VarId};

/// Optimization sense.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sense {
    /// Minimize the objective.
    Minimize,
    /// Maximize the objective.
    Maximize,
}

/// An optimization problem.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Whether the objective is minimized or maximized.
    pub sense: Sense,
    /// The objective expression.
    pub objective: Expr,
    /// Constraint expressions (`Leq`, `Eq`, `Soc` nodes).
    pub constraints: Vec<Expr>,
}

impl Problem {
    /// Create a minimization problem with no constraints.
    pub fn minimize(objective: Expr) -> Self {
        Problem {
            sense: Sense::Minimize,
            objective,
            constraints: Vec::new(),
        }
    }

    /// Create a maximization problem with no constraints.
    pub fn maximize(objective: Expr) -> Self {
        Problem {
            sense: Sense::Maximize,
            objective,
            constraints: Vec::new(),
        }
    }

    /// Add constraints.
    pub fn subject_to(mut self, constraints: impl IntoIterator<Item = Expr>) -> Self {
        self.constraints.extend(constraints);
        self
    }

    /// Identifiers of all variables in the problem, sorted and deduplicated.
    pub fn variables(&self) -> Vec<VarId> {
        let mut vars = self.objective.variables();
        for c in &self.constraints {
            vars.extend(c.variables());
        }
        vars.sort();
        vars.dedup();
        vars
    }

    /// All variables with their shapes, sorted by identifier.
    ///
    /// Downstream matrix stuffing needs the shapes to lay the flattened
    /// variables out in one long vector.
    pub fn variable_shapes(&self) -> Vec<(VarId, Shape)> {
        let mut shapes = HashMap::new();
        collect_shapes(&self.objective, &mut shapes);
        for c in &self.constraints {
            collect_shapes(c, &mut shapes);
        }
        let mut result: Vec<_> = shapes.into_iter().collect();
        result.sort_by_key(|(id, _)| *id);
        result
    }
}

fn collect_shapes(expr: &Expr, shapes: &mut HashMap<VarId, Shape>) {
    if let Expr::Variable(v) = expr {
        shapes.insert(v.id, v.shape);
    }
    for arg in expr.args() {
        collect_shapes(arg, shapes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::atoms::sum_entries;
    use crate::constraints::leq;
    use crate::expr::{constant, variable};

    #[test]
    fn test_problem_variables() {
        let x = variable(5);
        let y = variable(());
        let problem = Problem::minimize(sum_entries(&x)).subject_to([leq(&y, &constant(1.0))]);

        let vars = problem.variables();
        assert_eq!(vars.len(), 2);
        assert!(vars.contains(&x.variable_id().unwrap()));
        assert!(vars.contains(&y.variable_id().unwrap()));
    }

    #[test]
    fn test_variable_shapes_sorted() {
        let x = variable((2, 3));
        let y = variable(4);
        let problem =
            Problem::minimize(sum_entries(&x)).subject_to([leq(&y, &constant(0.0))]);

        let shapes = problem.variable_shapes();
        assert_eq!(shapes.len(), 2);
        assert!(shapes[0].0 < shapes[1].0);
    }
}
