use log::trace;
use thiserror::Error;

use crate::{
    ast::Token,
    builtins,
    expression::GuestExpression,
    filter::{CompiledFilter, grammar},
    lexer::{LexError, Lexer},
};

/// A predicate that reached the compiler but cannot be expressed remotely.
///
/// The classifier rejects all of these shapes first, so seeing one means the
/// two disagree; it is reported instead of emitting malformed filter text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("built-in function {0}() has no remote equivalent")]
    BuiltinCall(String),

    #[error("function {0}() is not part of the filter grammar")]
    UnsupportedFunction(String),

    #[error("parameter '{0}' must be followed by a property")]
    BareParameter(String),

    #[error("nested or computed property access ('.{0}') has no remote equivalent")]
    NestedProperty(String),

    #[error("'{0}' is a filter keyword and cannot name a property")]
    ReservedName(String),

    #[error("unexpected {0:?} in predicate body")]
    UnexpectedToken(Token),

    #[error("argument separator outside a function call")]
    StraySeparator,

    #[error("unbalanced parentheses")]
    Unbalanced,

    #[error("empty predicate body")]
    Empty,
}

/// Role of a token in the translated output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Remote-native function name, followed by its call boundary
    Function,
    /// `param.field` collapsed to `field`
    Property,
    /// Bare identifier, emitted as a property or constant name
    Constant,
    /// `eq ne gt ge lt le`
    Comparison,
    /// `and or`
    Logical,
    /// `+ - * / %`
    Arithmetic,
    /// `not` and unary minus
    Unary,
    /// `,` between call arguments
    Argument,
    /// `(` or `)`
    Boundary,
    /// Number, string, boolean or null
    Literal,
}

/// A tagged token with its nesting depth.
///
/// Opening boundaries carry the depth they open, closing boundaries the depth
/// they return to.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterToken {
    pub kind: TokenKind,
    pub text: String,
    pub depth: usize,
}

/// What an open boundary was opened as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Frame {
    Call,
    Group,
}

/// Compiles a predicate into filter text.
///
/// # Examples
///
/// ```
/// use tablinq::GuestExpression;
/// use tablinq::filter::compile;
///
/// let expr = GuestExpression::parse(r#"row => row.age >= 18 && row.name != "bob""#).unwrap();
/// assert_eq!(compile(&expr).unwrap().as_str(), "age ge 18 and name ne 'bob'");
/// ```
pub fn compile(expr: &GuestExpression) -> Result<CompiledFilter, CompileError> {
    let tokens = tag(expr)?;
    let text = emit(&tokens)?;
    trace!("compiled `{}` into `{}`", expr.body_source(), text);
    Ok(CompiledFilter::new(text))
}

/// Lexical pass: classifies every body token and annotates nesting depth.
///
/// The bound parameter and the access operator are dropped here, so
/// `row.age` leaves a single `Property` token `age`.
pub fn tag(expr: &GuestExpression) -> Result<Vec<FilterToken>, CompileError> {
    let mut tokens = Lexer::new(expr.body_source()).tokenize()?;

    // Only a single expression is translated.
    if tokens.first() == Some(&Token::Return) {
        tokens.remove(0);
    }
    while tokens.last() == Some(&Token::Semicolon) {
        tokens.pop();
    }
    if tokens.is_empty() {
        return Err(CompileError::Empty);
    }

    let mut tagged: Vec<FilterToken> = Vec::with_capacity(tokens.len());
    let mut depth = 0usize;
    let mut i = 0;

    while i < tokens.len() {
        let next = tokens.get(i + 1);
        let (kind, text) = match &tokens[i] {
            Token::Identifier(name) if expr.binds(name) => {
                let property = match (next, tokens.get(i + 2)) {
                    (Some(Token::Dot), Some(Token::Identifier(property))) => property,
                    _ => return Err(CompileError::BareParameter(name.clone())),
                };
                if let Some(Token::Dot) = tokens.get(i + 3) {
                    let nested = match tokens.get(i + 4) {
                        Some(Token::Identifier(n)) => n.clone(),
                        _ => String::from("."),
                    };
                    return Err(CompileError::NestedProperty(nested));
                }
                if grammar::is_reserved(property) {
                    return Err(CompileError::ReservedName(property.clone()));
                }
                i += 2;
                (TokenKind::Property, property.clone())
            }
            Token::Identifier(name) if next == Some(&Token::LParen) => {
                if builtins::is_builtin(name) {
                    return Err(CompileError::BuiltinCall(name.clone()));
                }
                if !builtins::is_remote_native(name) {
                    return Err(CompileError::UnsupportedFunction(name.clone()));
                }
                (TokenKind::Function, name.clone())
            }
            Token::Identifier(name) => {
                if grammar::is_reserved(name) {
                    return Err(CompileError::ReservedName(name.clone()));
                }
                (TokenKind::Constant, name.clone())
            }
            Token::Dot => {
                let nested = match next {
                    Some(Token::Identifier(n)) => n.clone(),
                    _ => String::from("."),
                };
                return Err(CompileError::NestedProperty(nested));
            }

            Token::EqEq | Token::EqEqEq => (TokenKind::Comparison, " eq ".into()),
            Token::NotEq | Token::NotEqEq => (TokenKind::Comparison, " ne ".into()),
            Token::GtEq => (TokenKind::Comparison, " ge ".into()),
            Token::LtEq => (TokenKind::Comparison, " le ".into()),
            Token::Gt => (TokenKind::Comparison, " gt ".into()),
            Token::Lt => (TokenKind::Comparison, " lt ".into()),
            Token::AndAnd | Token::And => (TokenKind::Logical, " and ".into()),
            Token::OrOr | Token::Or => (TokenKind::Logical, " or ".into()),

            Token::Minus if in_operand_position(tagged.last()) => (TokenKind::Unary, "-".into()),
            Token::Plus => (TokenKind::Arithmetic, " + ".into()),
            Token::Minus => (TokenKind::Arithmetic, " - ".into()),
            Token::Star => (TokenKind::Arithmetic, " * ".into()),
            Token::Slash => (TokenKind::Arithmetic, " / ".into()),
            Token::Percent => (TokenKind::Arithmetic, " % ".into()),
            Token::Bang => (TokenKind::Unary, "not ".into()),

            Token::Comma => (TokenKind::Argument, ", ".into()),
            Token::LParen => {
                depth += 1;
                (TokenKind::Boundary, "(".into())
            }
            Token::RParen => {
                depth = depth.checked_sub(1).ok_or(CompileError::Unbalanced)?;
                (TokenKind::Boundary, ")".into())
            }

            Token::Integer(n) => (TokenKind::Literal, n.to_string()),
            Token::Float(n) => (TokenKind::Literal, format!("{n:?}")),
            Token::String(s) => (TokenKind::Literal, grammar::quote(s)),
            Token::Boolean(b) => (TokenKind::Literal, b.to_string()),
            Token::Null => (TokenKind::Literal, "null".into()),

            token @ (Token::Return | Token::Semicolon | Token::Arrow | Token::Eof) => {
                return Err(CompileError::UnexpectedToken(token.clone()));
            }
        };

        tagged.push(FilterToken { kind, text, depth });
        i += 1;
    }

    if depth != 0 {
        return Err(CompileError::Unbalanced);
    }
    Ok(tagged)
}

/// A `-` here negates the following operand instead of subtracting.
fn in_operand_position(prev: Option<&FilterToken>) -> bool {
    match prev {
        None => true,
        Some(t) => match t.kind {
            TokenKind::Comparison
            | TokenKind::Logical
            | TokenKind::Arithmetic
            | TokenKind::Unary
            | TokenKind::Argument => true,
            TokenKind::Boundary => t.text == "(",
            _ => false,
        },
    }
}

/// Emission pass: walks the tagged tokens in order into the output buffer.
///
/// Each open boundary pushes a frame marking it as a call (preceded by a
/// function name) or a plain group, indexed by depth; the matching close pops
/// it. Argument separators are only valid directly inside a call frame.
fn emit(tokens: &[FilterToken]) -> Result<String, CompileError> {
    let mut out = String::new();
    let mut frames: Vec<Frame> = Vec::new();

    for (i, token) in tokens.iter().enumerate() {
        match token.kind {
            TokenKind::Boundary if token.text == "(" => {
                let opened_by_call = i > 0 && tokens[i - 1].kind == TokenKind::Function;
                frames.push(if opened_by_call { Frame::Call } else { Frame::Group });
                if frames.len() != token.depth {
                    return Err(CompileError::Unbalanced);
                }
                out.push('(');
            }
            TokenKind::Boundary => {
                frames.pop().ok_or(CompileError::Unbalanced)?;
                if frames.len() != token.depth {
                    return Err(CompileError::Unbalanced);
                }
                out.push(')');
            }
            TokenKind::Argument => {
                if frames.last() != Some(&Frame::Call) {
                    return Err(CompileError::StraySeparator);
                }
                out.push_str(&token.text);
            }
            TokenKind::Function => {
                if tokens.get(i + 1).map(|t| t.text.as_str()) != Some("(") {
                    return Err(CompileError::UnexpectedToken(Token::Identifier(
                        token.text.clone(),
                    )));
                }
                out.push_str(&token.text);
            }
            _ => out.push_str(&token.text),
        }
    }

    if !frames.is_empty() {
        return Err(CompileError::Unbalanced);
    }
    Ok(out)
}
