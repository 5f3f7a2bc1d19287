//! The remote filter grammar.
//!
//! ```text
//! filter     := or
//! or         := and ("or" and)*
//! and        := comparison ("and" comparison)*
//! comparison := additive (("eq"|"ne"|"gt"|"ge"|"lt"|"le") additive)?
//! additive   := term (("+"|"-") term)*
//! term       := unary (("*"|"/"|"%") unary)*
//! unary      := ("not" | "-") unary | primary
//! primary    := literal | property | function "(" args? ")" | "(" filter ")"
//! ```
//!
//! Keywords are lowercase and case-sensitive. Strings are single-quoted with
//! `''` standing for a literal quote. A bare identifier names a property of
//! the record being tested.

use thiserror::Error;

use crate::{
    ast::BinOp,
    builtins,
    evaluator::{EvalError, Evaluator, negate},
    value::Value,
};

const RESERVED: &[&str] = &[
    "eq", "ne", "gt", "ge", "lt", "le", "and", "or", "not", "true", "false", "null",
];

/// True when `name` is a keyword of the filter grammar.
pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Renders `s` as a filter string literal.
pub fn quote(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GrammarError {
    #[error("unexpected character '{ch}' at offset {offset}")]
    UnexpectedChar { ch: char, offset: usize },

    #[error("unterminated string starting at offset {0}")]
    UnterminatedString(usize),

    #[error("invalid number '{text}' at offset {offset}")]
    InvalidNumber { text: String, offset: usize },

    #[error("expected {expected}, found {found}")]
    Unexpected { expected: &'static str, found: String },

    #[error("function {0}() is not part of the filter grammar")]
    UnknownFunction(String),
}

/// Binary operators of the filter grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Gt,
    Ge,
    Lt,
    Le,
    And,
    Or,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl FilterOp {
    fn keyword(word: &str) -> Option<FilterOp> {
        Some(match word {
            "eq" => FilterOp::Eq,
            "ne" => FilterOp::Ne,
            "gt" => FilterOp::Gt,
            "ge" => FilterOp::Ge,
            "lt" => FilterOp::Lt,
            "le" => FilterOp::Le,
            _ => return None,
        })
    }

    fn as_binop(self) -> BinOp {
        match self {
            FilterOp::Eq => BinOp::Equal,
            FilterOp::Ne => BinOp::NotEqual,
            FilterOp::Gt => BinOp::GreaterThan,
            FilterOp::Ge => BinOp::GreaterEqual,
            FilterOp::Lt => BinOp::LessThan,
            FilterOp::Le => BinOp::LessEqual,
            FilterOp::And => BinOp::And,
            FilterOp::Or => BinOp::Or,
            FilterOp::Add => BinOp::Add,
            FilterOp::Sub => BinOp::Subtract,
            FilterOp::Mul => BinOp::Multiply,
            FilterOp::Div => BinOp::Divide,
            FilterOp::Mod => BinOp::Modulo,
        }
    }
}

/// Parsed filter text.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterExpr {
    Literal(Value),
    Property(String),
    Call { name: String, args: Vec<FilterExpr> },
    Not(Box<FilterExpr>),
    Neg(Box<FilterExpr>),
    Binary {
        op: FilterOp,
        left: Box<FilterExpr>,
        right: Box<FilterExpr>,
    },
}

impl FilterExpr {
    /// Evaluates the filter against one record.
    ///
    /// Missing properties read as null. Operators share the local evaluator's
    /// semantics so a pushed predicate selects the same records it would
    /// locally.
    pub fn evaluate(&self, record: &Value) -> Result<Value, EvalError> {
        let evaluator = Evaluator::new();
        match self {
            FilterExpr::Literal(v) => Ok(v.clone()),
            FilterExpr::Property(name) => Ok(record.get(name).cloned().unwrap_or(Value::Null)),
            FilterExpr::Call { name, args } => {
                let values = args
                    .iter()
                    .map(|arg| arg.evaluate(record))
                    .collect::<Result<Vec<_>, _>>()?;
                builtins::call(name, &values)
            }
            FilterExpr::Not(inner) => Ok(Value::Boolean(!inner.evaluate(record)?.as_bool())),
            FilterExpr::Neg(inner) => match inner.evaluate(record)? {
                Value::Integer(n) => Ok(negate(n)),
                Value::Float(n) => Ok(Value::Float(-n)),
                v => Err(EvalError::TypeError(format!("Cannot negate {}", v.type_name()))),
            },
            FilterExpr::Binary { op: FilterOp::And, left, right } => Ok(Value::Boolean(
                left.evaluate(record)?.as_bool() && right.evaluate(record)?.as_bool(),
            )),
            FilterExpr::Binary { op: FilterOp::Or, left, right } => Ok(Value::Boolean(
                left.evaluate(record)?.as_bool() || right.evaluate(record)?.as_bool(),
            )),
            FilterExpr::Binary { op, left, right } => {
                let l = left.evaluate(record)?;
                let r = right.evaluate(record)?;
                evaluator.apply_binop(op.as_binop(), &l, &r)
            }
        }
    }

    /// Evaluates the filter as a condition.
    pub fn matches(&self, record: &Value) -> Result<bool, EvalError> {
        Ok(self.evaluate(record)?.as_bool())
    }
}

impl std::str::FromStr for FilterExpr {
    type Err = GrammarError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Number(Value),
    Str(String),
    Word(String),
    LParen,
    RParen,
    Comma,
    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    End,
}

impl std::fmt::Display for Tok {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tok::Number(v) => write!(f, "number {v}"),
            Tok::Str(s) => write!(f, "string {}", quote(s)),
            Tok::Word(w) => write!(f, "'{w}'"),
            Tok::LParen => f.write_str("'('"),
            Tok::RParen => f.write_str("')'"),
            Tok::Comma => f.write_str("','"),
            Tok::Plus => f.write_str("'+'"),
            Tok::Minus => f.write_str("'-'"),
            Tok::Star => f.write_str("'*'"),
            Tok::Slash => f.write_str("'/'"),
            Tok::Percent => f.write_str("'%'"),
            Tok::End => f.write_str("end of filter"),
        }
    }
}

fn tokenize(text: &str) -> Result<Vec<Tok>, GrammarError> {
    let chars: Vec<char> = text.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let ch = chars[i];
        match ch {
            c if c.is_whitespace() => i += 1,
            '(' => {
                tokens.push(Tok::LParen);
                i += 1;
            }
            ')' => {
                tokens.push(Tok::RParen);
                i += 1;
            }
            ',' => {
                tokens.push(Tok::Comma);
                i += 1;
            }
            '+' => {
                tokens.push(Tok::Plus);
                i += 1;
            }
            '-' => {
                tokens.push(Tok::Minus);
                i += 1;
            }
            '*' => {
                tokens.push(Tok::Star);
                i += 1;
            }
            '/' => {
                tokens.push(Tok::Slash);
                i += 1;
            }
            '%' => {
                tokens.push(Tok::Percent);
                i += 1;
            }
            '\'' => {
                let start = i;
                let mut s = String::new();
                i += 1;
                loop {
                    match chars.get(i) {
                        None => return Err(GrammarError::UnterminatedString(start)),
                        Some('\'') if chars.get(i + 1) == Some(&'\'') => {
                            s.push('\'');
                            i += 2;
                        }
                        Some('\'') => {
                            i += 1;
                            break;
                        }
                        Some(c) => {
                            s.push(*c);
                            i += 1;
                        }
                    }
                }
                tokens.push(Tok::Str(s));
            }
            c if c.is_ascii_digit() => {
                let start = i;
                let mut is_float = false;
                while i < chars.len() {
                    let c = chars[i];
                    if c.is_ascii_digit() {
                        i += 1;
                    } else if c == '.' && !is_float {
                        is_float = true;
                        i += 1;
                    } else if c == 'e' || c == 'E' {
                        is_float = true;
                        i += 1;
                        if matches!(chars.get(i), Some('+') | Some('-')) {
                            i += 1;
                        }
                    } else {
                        break;
                    }
                }
                let text: String = chars[start..i].iter().collect();
                let invalid = || GrammarError::InvalidNumber {
                    text: text.clone(),
                    offset: start,
                };
                let value = if is_float {
                    text.parse::<f64>().map(Value::Float).map_err(|_| invalid())?
                } else {
                    text.parse::<i64>().map(Value::Integer).map_err(|_| invalid())?
                };
                tokens.push(Tok::Number(value));
            }
            c if c.is_alphabetic() || c == '_' => {
                let start = i;
                while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                    i += 1;
                }
                tokens.push(Tok::Word(chars[start..i].iter().collect()));
            }
            ch => return Err(GrammarError::UnexpectedChar { ch, offset: i }),
        }
    }

    tokens.push(Tok::End);
    Ok(tokens)
}

/// Parses filter text.
///
/// Only remote-native functions may be called.
///
/// # Examples
///
/// ```
/// use tablinq::filter::grammar::parse;
/// use tablinq::Value;
/// use std::collections::BTreeMap;
///
/// let filter = parse("age ge 18 and startswith(name, 'A')").unwrap();
/// let row = Value::Object(BTreeMap::from([
///     ("age".to_string(), Value::Integer(36)),
///     ("name".to_string(), Value::from("Ada")),
/// ]));
/// assert!(filter.matches(&row).unwrap());
/// ```
pub fn parse(text: &str) -> Result<FilterExpr, GrammarError> {
    let mut parser = FilterParser {
        tokens: tokenize(text)?,
        pos: 0,
    };
    let expr = parser.parse_or()?;
    parser.expect(&Tok::End, "end of filter")?;
    Ok(expr)
}

struct FilterParser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl FilterParser {
    fn current(&self) -> &Tok {
        self.tokens.get(self.pos).unwrap_or(&Tok::End)
    }

    fn advance(&mut self) -> Tok {
        let tok = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn at_word(&self, word: &str) -> bool {
        matches!(self.current(), Tok::Word(w) if w == word)
    }

    fn unexpected(&self, expected: &'static str) -> GrammarError {
        GrammarError::Unexpected {
            expected,
            found: self.current().to_string(),
        }
    }

    fn expect(&mut self, tok: &Tok, expected: &'static str) -> Result<(), GrammarError> {
        if self.current() != tok {
            return Err(self.unexpected(expected));
        }
        self.advance();
        Ok(())
    }

    fn binary(op: FilterOp, left: FilterExpr, right: FilterExpr) -> FilterExpr {
        FilterExpr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    fn parse_or(&mut self) -> Result<FilterExpr, GrammarError> {
        let mut left = self.parse_and()?;
        while self.at_word("or") {
            self.advance();
            let right = self.parse_and()?;
            left = Self::binary(FilterOp::Or, left, right);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<FilterExpr, GrammarError> {
        let mut left = self.parse_comparison()?;
        while self.at_word("and") {
            self.advance();
            let right = self.parse_comparison()?;
            left = Self::binary(FilterOp::And, left, right);
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<FilterExpr, GrammarError> {
        let left = self.parse_additive()?;
        let op = match self.current() {
            Tok::Word(w) => FilterOp::keyword(w),
            _ => None,
        };
        match op {
            Some(op) => {
                self.advance();
                let right = self.parse_additive()?;
                Ok(Self::binary(op, left, right))
            }
            None => Ok(left),
        }
    }

    fn parse_additive(&mut self) -> Result<FilterExpr, GrammarError> {
        let mut left = self.parse_term()?;
        loop {
            let op = match self.current() {
                Tok::Plus => FilterOp::Add,
                Tok::Minus => FilterOp::Sub,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_term()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_term(&mut self) -> Result<FilterExpr, GrammarError> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.current() {
                Tok::Star => FilterOp::Mul,
                Tok::Slash => FilterOp::Div,
                Tok::Percent => FilterOp::Mod,
                _ => return Ok(left),
            };
            self.advance();
            let right = self.parse_unary()?;
            left = Self::binary(op, left, right);
        }
    }

    fn parse_unary(&mut self) -> Result<FilterExpr, GrammarError> {
        if self.at_word("not") {
            self.advance();
            return Ok(FilterExpr::Not(Box::new(self.parse_unary()?)));
        }
        if self.current() == &Tok::Minus {
            self.advance();
            return Ok(FilterExpr::Neg(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<FilterExpr, GrammarError> {
        match self.advance() {
            Tok::Number(v) => Ok(FilterExpr::Literal(v)),
            Tok::Str(s) => Ok(FilterExpr::Literal(Value::String(s))),
            Tok::LParen => {
                let inner = self.parse_or()?;
                self.expect(&Tok::RParen, "')'")?;
                Ok(inner)
            }
            Tok::Word(w) => match w.as_str() {
                "true" => Ok(FilterExpr::Literal(Value::Boolean(true))),
                "false" => Ok(FilterExpr::Literal(Value::Boolean(false))),
                "null" => Ok(FilterExpr::Literal(Value::Null)),
                _ if is_reserved(&w) => Err(GrammarError::Unexpected {
                    expected: "operand",
                    found: format!("'{w}'"),
                }),
                _ if self.current() == &Tok::LParen => {
                    if !builtins::is_remote_native(&w) {
                        return Err(GrammarError::UnknownFunction(w));
                    }
                    self.advance();
                    let mut args = Vec::new();
                    if self.current() != &Tok::RParen {
                        args.push(self.parse_or()?);
                        while self.current() == &Tok::Comma {
                            self.advance();
                            args.push(self.parse_or()?);
                        }
                    }
                    self.expect(&Tok::RParen, "')'")?;
                    Ok(FilterExpr::Call { name: w, args })
                }
                _ => Ok(FilterExpr::Property(w)),
            },
            tok => Err(GrammarError::Unexpected {
                expected: "operand",
                found: tok.to_string(),
            }),
        }
    }
}
