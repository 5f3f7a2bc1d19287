pub mod ast;
pub mod builtins;
pub mod client;
pub mod config;
pub mod error;
pub mod evaluator;
pub mod expression;
pub mod filter;
pub mod lexer;
pub mod parser;
pub mod query;
pub mod value;

#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod logger;

pub use ast::{BinOp, Expr, Token, UnaryOp};
pub use client::{ClientError, MemoryTableClient, TableClient, TableQuery, TableSource};
pub use config::{Config, ConfigError};
pub use error::QueryError;
pub use evaluator::{EvalContext, EvalError, Evaluator};
pub use expression::GuestExpression;
pub use filter::{CompileError, CompiledFilter, Eligibility, Rejection};
pub use lexer::{LexError, Lexer, Position};
pub use parser::{ParseError, Parser};
pub use query::{Query, QueryOptions};
pub use value::Value;
