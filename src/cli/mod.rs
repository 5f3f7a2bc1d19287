//! CLI support for tablinq
//!
//! The `tq` binary is a thin wrapper over these functions, so other tools can
//! run the same commands programmatically.

mod check;
mod compile;
mod query;

pub use check::{CheckResult, execute_check};
pub use compile::{CompileOutcome, execute_compile};
pub use query::{QueryCommand, QueryOutput, execute_query};

use std::io;

use thiserror::Error;

/// Errors that can occur during CLI operations
#[derive(Debug, Error)]
pub enum CliError {
    #[error("Parse error: {0}")]
    Parse(#[from] crate::ParseError),

    #[error("Query failed: {0}")]
    Query(#[from] crate::QueryError),

    #[error("Data error: {0}")]
    Client(#[from] crate::ClientError),

    #[error("Config error: {0}")]
    Config(#[from] crate::ConfigError),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No input provided. Use --data or pipe JSON to stdin.")]
    NoInput,
}
