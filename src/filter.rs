//! Push-down of guest predicates into the remote filter grammar.
//!
//! - **[classify]** decides whether a predicate may run remotely at all.
//! - **[compile]** rewrites an eligible predicate into filter text.
//! - **[grammar]** parses and evaluates that filter text; it is what the
//!   in-memory table client executes, and what compiled output is checked
//!   against.
//!
//! ```text
//! row => row.age >= 18 && row.country == "NL"
//!        ──────────────────────────────────────▶  age ge 18 and country eq 'NL'
//! ```

pub mod classify;
pub mod compile;
pub mod grammar;

pub use classify::{Eligibility, Rejection, classify, is_remote_eligible};
pub use compile::{CompileError, FilterToken, TokenKind, compile};
pub use grammar::{FilterExpr, FilterOp, GrammarError};

/// Filter text in the remote store's grammar, ready to send.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompiledFilter(String);

impl CompiledFilter {
    pub fn new(text: impl Into<String>) -> Self {
        CompiledFilter(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for CompiledFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CompiledFilter {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
