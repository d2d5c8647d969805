//! Core expression types for conicform.
//!
//! The `Expr` enum represents all expressions the canonicalizer understands.
//! Expressions form an immutable tree using `Arc` for sharing; constraints
//! (`Leq`, `Eq`, `Soc`) are expressions too, so the cone transformer can walk
//! a whole problem with one recursion.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nalgebra::DMatrix;

use super::shape::Shape;

/// Unique identifier for variables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(u64);

impl VarId {
    /// Reserved identifier for the constant term of a coefficient map.
    /// Distinct from every identifier the counter can mint.
    pub const CONSTANT: VarId = VarId(u64::MAX);

    /// Generate a new unique ID.
    pub fn new() -> Self {
        static NEXT_ID: AtomicU64 = AtomicU64::new(0);
        VarId(NEXT_ID.fetch_add(1, Ordering::SeqCst))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for VarId {
    fn default() -> Self {
        Self::new()
    }
}

/// Data for a variable expression.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableData {
    /// Unique identifier.
    pub id: VarId,
    /// Shape of the variable.
    pub shape: Shape,
    /// Optional name for display.
    pub name: Option<String>,
}

/// Data for a constant expression.
///
/// Constants carry dense column-major data; scalars are `1x1` matrices.
#[derive(Debug, Clone, PartialEq)]
pub struct ConstantData {
    /// The constant value.
    pub value: DMatrix<f64>,
}

impl ConstantData {
    /// Get the shape of the constant.
    pub fn shape(&self) -> Shape {
        Shape::matrix(self.value.nrows(), self.value.ncols())
    }
}

/// A slice along one axis: `start`, `stop` (exclusive), `step`.
///
/// Negative `start`/`stop` count from the end of the axis, as in
/// conventional slice notation. The step must be nonzero.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Slice {
    pub start: isize,
    pub stop: isize,
    pub step: isize,
}

impl Slice {
    /// Create a slice.
    pub fn new(start: isize, stop: isize, step: isize) -> Self {
        Slice { start, stop, step }
    }

    /// A slice selecting a whole axis of the given dimension.
    pub fn all(dim: usize) -> Self {
        Slice {
            start: 0,
            stop: dim as isize,
            step: 1,
        }
    }

    /// Normalized `(start, stop, step)` against an axis of length `dim`:
    /// negative bounds wrap by adding `dim`, the start is clamped below the
    /// axis end, and the stop is clamped to the reachable range.
    pub fn bounds(&self, dim: usize) -> (isize, isize, isize) {
        let d = dim as isize;
        let mut start = if self.start < 0 {
            self.start + d
        } else {
            self.start
        };
        let mut stop = if self.stop < 0 { self.stop + d } else { self.stop };
        start = start.min(d - 1);
        if self.step > 0 {
            stop = stop.min(d);
        } else {
            stop = stop.max(-1);
        }
        (start, stop, self.step)
    }

    /// Number of indices the slice selects on an axis of length `dim`.
    pub fn len(&self, dim: usize) -> usize {
        if self.step == 0 || dim == 0 {
            return 0;
        }
        let (start, stop, step) = self.bounds(dim);
        if start < 0 {
            return 0;
        }
        if step > 0 {
            if stop <= start {
                0
            } else {
                ((stop - start + step - 1) / step) as usize
            }
        } else if stop >= start {
            0
        } else {
            ((start - stop - step - 1) / -step) as usize
        }
    }

    /// Check if the slice selects nothing.
    pub fn is_empty(&self, dim: usize) -> bool {
        self.len(dim) == 0
    }
}

/// The core expression type.
///
/// All expressions are immutable and use `Arc` for efficient sharing.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // ========== Leaf nodes ==========
    /// A decision variable.
    Variable(VariableData),
    /// A constant value.
    Constant(ConstantData),

    // ========== Affine atoms ==========
    /// Addition of any number of arguments; scalar arguments broadcast.
    Add(Vec<Arc<Expr>>),
    /// Negation: -a
    Neg(Arc<Expr>),
    /// Matrix multiplication: a * b, with one side constant.
    Mul(Arc<Expr>, Arc<Expr>),
    /// Sum of all entries, producing a scalar.
    SumEntries(Arc<Expr>),
    /// Horizontal stack: [a, b, ...]
    HStack(Vec<Arc<Expr>>),
    /// Vertical stack: [a; b; ...]
    VStack(Vec<Arc<Expr>>),
    /// Reshape to a new shape, preserving column-major flattened order.
    Reshape(Arc<Expr>, Shape),
    /// Two-axis slicing: rows then columns.
    Index(Arc<Expr>, [Slice; 2]),
    /// Vector to diagonal matrix: (n, 1) -> (n, n).
    DiagVec(Arc<Expr>),
    /// Square matrix to its diagonal: (n, n) -> (n, 1).
    DiagMat(Arc<Expr>),
    /// Transpose.
    Transpose(Arc<Expr>),

    // ========== Nonlinear atoms ==========
    /// Absolute value (elementwise).
    Abs(Arc<Expr>),
    /// p-norm of all entries; carries the parameter p.
    PNorm(Arc<Expr>, f64),
    /// Quadratic over linear: x'x / y with scalar y.
    QuadOverLin(Arc<Expr>, Arc<Expr>),

    // ========== Constraint nodes ==========
    /// Elementwise inequality: a <= b.
    Leq(Arc<Expr>, Arc<Expr>),
    /// Elementwise equality: a == b.
    Eq(Arc<Expr>, Arc<Expr>),
    /// Second-order cone: ||v||_2 <= w.
    Soc(Arc<Expr>, Arc<Expr>),
}

impl Expr {
    /// Get the shape of the expression.
    pub fn shape(&self) -> Shape {
        match self {
            Expr::Variable(v) => v.shape,
            Expr::Constant(c) => c.shape(),

            Expr::Add(args) => args
                .iter()
                .map(|a| a.shape())
                .find(|s| !s.is_scalar())
                .unwrap_or_else(Shape::scalar),
            Expr::Neg(a) => a.shape(),
            Expr::Mul(a, b) => {
                let sa = a.shape();
                let sb = b.shape();
                if sa.is_scalar() {
                    sb
                } else if sb.is_scalar() {
                    sa
                } else {
                    Shape::matrix(sa.rows(), sb.cols())
                }
            }
            Expr::SumEntries(_) => Shape::scalar(),
            Expr::HStack(args) => {
                let rows = args.first().map_or(1, |a| a.shape().rows());
                let cols = args.iter().map(|a| a.shape().cols()).sum();
                Shape::matrix(rows, cols)
            }
            Expr::VStack(args) => {
                let rows = args.iter().map(|a| a.shape().rows()).sum();
                let cols = args.first().map_or(1, |a| a.shape().cols());
                Shape::matrix(rows, cols)
            }
            Expr::Reshape(_, shape) => *shape,
            Expr::Index(a, [rows, cols]) => {
                let arg = a.shape();
                Shape::matrix(rows.len(arg.rows()), cols.len(arg.cols()))
            }
            Expr::DiagVec(a) => {
                let n = a.dim();
                Shape::matrix(n, n)
            }
            Expr::DiagMat(a) => Shape::vector(a.shape().rows()),
            Expr::Transpose(a) => a.shape().transpose(),

            Expr::Abs(a) => a.shape(),
            Expr::PNorm(_, _) | Expr::QuadOverLin(_, _) => Shape::scalar(),

            Expr::Leq(a, b) | Expr::Eq(a, b) => {
                let sa = a.shape();
                if sa.is_scalar() {
                    b.shape()
                } else {
                    sa
                }
            }
            Expr::Soc(_, _) => Shape::scalar(),
        }
    }

    /// Total number of entries, `rows * cols`.
    pub fn dim(&self) -> usize {
        self.shape().size()
    }

    /// The child expressions, in argument order.
    pub fn args(&self) -> Vec<&Expr> {
        match self {
            Expr::Variable(_) | Expr::Constant(_) => vec![],
            Expr::Add(args) | Expr::HStack(args) | Expr::VStack(args) => {
                args.iter().map(|a| a.as_ref()).collect()
            }
            Expr::Neg(a)
            | Expr::SumEntries(a)
            | Expr::Reshape(a, _)
            | Expr::Index(a, _)
            | Expr::DiagVec(a)
            | Expr::DiagMat(a)
            | Expr::Transpose(a)
            | Expr::Abs(a)
            | Expr::PNorm(a, _) => vec![a.as_ref()],
            Expr::Mul(a, b)
            | Expr::QuadOverLin(a, b)
            | Expr::Leq(a, b)
            | Expr::Eq(a, b)
            | Expr::Soc(a, b) => vec![a.as_ref(), b.as_ref()],
        }
    }

    /// Check if this expression is a constant leaf.
    pub fn is_constant(&self) -> bool {
        matches!(self, Expr::Constant(_))
    }

    /// Check if this expression is a variable leaf.
    pub fn is_variable(&self) -> bool {
        matches!(self, Expr::Variable(_))
    }

    /// Check if this expression is a constraint node.
    pub fn is_constraint(&self) -> bool {
        matches!(self, Expr::Leq(_, _) | Expr::Eq(_, _) | Expr::Soc(_, _))
    }

    /// Get the unique ID if this is a variable.
    pub fn variable_id(&self) -> Option<VarId> {
        match self {
            Expr::Variable(v) => Some(v.id),
            _ => None,
        }
    }

    /// Get the constant value if this is a constant expression.
    pub fn constant_value(&self) -> Option<&DMatrix<f64>> {
        match self {
            Expr::Constant(c) => Some(&c.value),
            _ => None,
        }
    }

    /// Collect the identifiers of all variables in this expression,
    /// sorted and deduplicated.
    pub fn variables(&self) -> Vec<VarId> {
        let mut vars = Vec::new();
        self.collect_variables(&mut vars);
        vars.sort();
        vars.dedup();
        vars
    }

    fn collect_variables(&self, vars: &mut Vec<VarId>) {
        if let Expr::Variable(v) = self {
            vars.push(v.id);
        }
        for arg in self.args() {
            arg.collect_variables(vars);
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Expr::Variable(_) => "var",
            Expr::Constant(_) => "const",
            Expr::Add(_) => "add",
            Expr::Neg(_) => "neg",
            Expr::Mul(_, _) => "mul",
            Expr::SumEntries(_) => "sum_entries",
            Expr::HStack(_) => "hstack",
            Expr::VStack(_) => "vstack",
            Expr::Reshape(_, _) => "reshape",
            Expr::Index(_, _) => "index",
            Expr::DiagVec(_) => "diag_vec",
            Expr::DiagMat(_) => "diag_mat",
            Expr::Transpose(_) => "transpose",
            Expr::Abs(_) => "abs",
            Expr::PNorm(_, _) => "p_norm",
            Expr::QuadOverLin(_, _) => "quad_over_lin",
            Expr::Leq(_, _) => "leq",
            Expr::Eq(_, _) => "eq",
            Expr::Soc(_, _) => "soc",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Variable(v) => write!(f, "var{}", v.id.raw()),
            Expr::Constant(c) => {
                write!(f, "const[{}x{}]", c.value.nrows(), c.value.ncols())
            }
            Expr::PNorm(a, p) => write!(f, "p_norm[{}]({})", p, a),
            _ => {
                write!(f, "{}(", self.name())?;
                for (i, arg) in self.args().iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
