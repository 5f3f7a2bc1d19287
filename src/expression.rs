//! Parsed guest lambdas.

use crate::{
    ast::Expr,
    lexer::Lexer,
    parser::{ParseError, Parser},
};

/// A parsed guest lambda such as `row => row.age > 18`.
///
/// Keeps the source text next to the AST: the classifier and the filter
/// compiler work lexically on the body text, the evaluator on the AST.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestExpression {
    params: Vec<String>,
    body: Expr,
    source: String,
    body_offset: usize,
}

impl GuestExpression {
    /// Parses `params => body`.
    ///
    /// # Examples
    ///
    /// ```
    /// use tablinq::GuestExpression;
    ///
    /// let expr = GuestExpression::parse("row => row.age >= 18").unwrap();
    /// assert_eq!(expr.param(), "row");
    /// assert_eq!(expr.body_source(), "row.age >= 18");
    /// ```
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let mut parser = Parser::new(Lexer::new(source))?;
        let (params, body) = parser.parse_lambda()?;

        // The parser accepted the arrow, so it is present in the source.
        let body_offset = source.find("=>").map_or(0, |i| i + 2);

        Ok(GuestExpression {
            params,
            body,
            source: source.to_string(),
            body_offset,
        })
    }

    /// Builds the identity lambda `name => name`.
    pub fn identity(name: &str) -> Self {
        GuestExpression {
            params: vec![name.to_string()],
            body: Expr::Param(name.to_string()),
            source: format!("{name} => {name}"),
            body_offset: name.len() + 3,
        }
    }

    /// The first bound parameter.
    pub fn param(&self) -> &str {
        &self.params[0]
    }

    pub fn params(&self) -> &[String] {
        &self.params
    }

    pub fn body(&self) -> &Expr {
        &self.body
    }

    /// Source text after `=>`, trimmed.
    pub fn body_source(&self) -> &str {
        self.source[self.body_offset..].trim()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// True when `name` is one of the bound parameters.
    pub fn binds(&self, name: &str) -> bool {
        self.params.iter().any(|p| p == name)
    }
}

impl std::fmt::Display for GuestExpression {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.source)
    }
}

impl std::str::FromStr for GuestExpression {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GuestExpression::parse(s)
    }
}
