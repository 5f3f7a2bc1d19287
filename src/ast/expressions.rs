use crate::ast::{BinOp, UnaryOp};

/// Abstract Syntax Tree node of a guest expression body.
///
/// Produced by the [`Parser`](crate::parser::Parser) and consumed by the
/// [`Evaluator`](crate::evaluator::Evaluator) for local evaluation.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal floating point number
    Float(f64),

    /// Literal integer
    Integer(i64),

    /// Literal string
    String(String),

    /// Literal boolean
    Boolean(bool),

    /// Literal null
    Null,

    // References
    /// Reference to a bound parameter
    ///
    /// # Example
    /// ```text
    /// row => row        // Param("row")
    /// ```
    Param(String),

    /// Bare identifier that is not a bound parameter
    ///
    /// Remotely it names a property or constant; locally it cannot be resolved.
    Ident(String),

    /// Property access on a value
    ///
    /// # Examples
    /// ```text
    /// row.age
    /// row.address.city
    /// ```
    Property {
        object: Box<Expr>,
        name: String,
    },

    // Operations
    /// Function call
    ///
    /// # Examples
    /// ```text
    /// lower(row.name)
    /// startswith(row.name, "A")
    /// ```
    Call {
        name: String,
        args: Vec<Expr>,
    },

    /// Unary operation
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },

    /// Binary operation (arithmetic, comparison, logical)
    BinaryOp {
        op: BinOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}
