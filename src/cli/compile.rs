//! Show how a predicate would be pushed down

use crate::{
    GuestExpression,
    filter::{self, CompiledFilter, Eligibility, Rejection},
};

use super::CliError;

/// Outcome of compiling one predicate
#[derive(Debug, Clone, PartialEq)]
pub enum CompileOutcome {
    /// Filter text the remote table would receive
    Remote(CompiledFilter),
    /// Predicate stays local, with the reason
    Local(Rejection),
}

impl std::fmt::Display for CompileOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CompileOutcome::Remote(filter) => write!(f, "{filter}"),
            CompileOutcome::Local(reason) => write!(f, "evaluated locally: predicate {reason}"),
        }
    }
}

/// Classify and, when eligible, compile a predicate
pub fn execute_compile(expr: &str) -> Result<CompileOutcome, CliError> {
    let expr = GuestExpression::parse(expr)?;
    match filter::classify(&expr) {
        Eligibility::Remote => {
            let compiled = filter::compile(&expr).map_err(crate::QueryError::from)?;
            Ok(CompileOutcome::Remote(compiled))
        }
        Eligibility::Local(reason) => Ok(CompileOutcome::Local(reason)),
    }
}
