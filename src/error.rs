use thiserror::Error;

use crate::{client::ClientError, evaluator::EvalError, filter::CompileError, parser::ParseError};

/// Errors surfaced by query builders and terminal operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum QueryError {
    /// A guest expression failed to parse.
    #[error("invalid expression: {0}")]
    Parse(#[from] ParseError),

    /// An eligible predicate could not be compiled into filter text.
    #[error("filter compilation failed: {0}")]
    Compile(#[from] CompileError),

    /// Local evaluation of a guest expression failed.
    #[error("evaluation failed: {0}")]
    Eval(#[from] EvalError),

    /// The remote store rejected or failed the request.
    #[error("remote store: {0}")]
    Remote(#[from] ClientError),

    /// The query uses a shape this provider cannot execute (joins).
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// `single` found more than one element.
    #[error("sequence contains more than one element")]
    NotSingle,
}
