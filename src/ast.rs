//! # Guest Expression Language - Abstract Syntax Tree
//!
//! Queries are written as small lambdas over a single record:
//!
//! ```text
//! row => row.age >= 18 && row.country == "NL"
//! ```
//!
//! The parameter list binds names to the values the expression is applied to.
//! Everything after `=>` is the body, which is what gets classified, compiled
//! to the remote filter grammar, or evaluated locally.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, references, operations)
//! - **[operators]** - Binary and unary operators
//!
//! ## Operators
//!
//! | kind        | tokens                                   |
//! |-------------|------------------------------------------|
//! | comparison  | `==` `===` `!=` `!==` `<` `<=` `>` `>=`  |
//! | logical     | `&&` `and` `\|\|` `or` `!`               |
//! | arithmetic  | `+` `-` `*` `/` `%`                      |
//!
//! `+` doubles as string concatenation; `.` is property access.
//!
//! ## Examples
//!
//! ### Predicate
//!
//! ```text
//! row => row.price > 100 and row.status != "archived"
//! ```
//!
//! ### Selector
//!
//! ```text
//! row => row.first + " " + row.last
//! ```
//!
//! ### Folding function (for `aggregate`)
//!
//! ```text
//! (total, row) => total + row.amount
//! ```
pub mod expressions;
pub mod operators;
pub mod tokens;

pub use expressions::Expr;
pub use operators::{BinOp, UnaryOp};
pub use tokens::Token;
