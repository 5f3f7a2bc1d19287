//! Validate guest expressions

use crate::GuestExpression;

use super::CliError;

/// Result of a check operation
#[derive(Debug, Clone, PartialEq)]
pub struct CheckResult {
    /// Bound parameter names, in order
    pub params: Vec<String>,
    /// Body text after the arrow
    pub body: String,
}

/// Parse `expr`, reporting its parameters and body
pub fn execute_check(expr: &str) -> Result<CheckResult, CliError> {
    let parsed = GuestExpression::parse(expr)?;
    Ok(CheckResult {
        params: parsed.params().to_vec(),
        body: parsed.body_source().to_string(),
    })
}
