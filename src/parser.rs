use crate::{
    ast::{BinOp, Expr, Token, UnaryOp},
    lexer::{LexError, Lexer},
};
use std::mem;
use thiserror::Error;

/// Errors raised while parsing a guest expression.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error("expected {expected}, got {found:?}")]
    Unexpected { expected: &'static str, found: Token },

    #[error("parameter '{0}' is bound more than once")]
    DuplicateParam(String),

    #[error("method calls are not supported ('.{0}(...)'); call a function instead")]
    MethodCall(String),
}

pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    params: Vec<String>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        Ok(Parser {
            lexer,
            current_token,
            params: Vec::new(),
        })
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        self.current_token = self.lexer.next_token()?;
        Ok(())
    }

    fn expect(&mut self, expected: Token, what: &'static str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return Err(self.unexpected(what));
        }
        self.advance()
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn unexpected(&self, expected: &'static str) -> ParseError {
        ParseError::Unexpected {
            expected,
            found: self.current_token.clone(),
        }
    }

    fn take_identifier(&mut self, what: &'static str) -> Result<String, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            Token::Identifier(name) => {
                self.advance()?;
                Ok(name)
            }
            other => {
                self.current_token = other;
                Err(self.unexpected(what))
            }
        }
    }

    /// Parse a complete lambda: `params => body`.
    ///
    /// Returns the bound parameter names and the body expression.
    pub fn parse_lambda(&mut self) -> Result<(Vec<String>, Expr), ParseError> {
        let params = self.parse_params()?;
        self.expect(Token::Arrow, "'=>' after parameters")?;
        self.params = params;
        let body = self.parse_body()?;
        Ok((mem::take(&mut self.params), body))
    }

    fn parse_params(&mut self) -> Result<Vec<String>, ParseError> {
        if !self.check(&Token::LParen) {
            return Ok(vec![self.take_identifier("parameter name")?]);
        }

        self.advance()?; // consume '('
        let mut params: Vec<String> = Vec::new();
        loop {
            let name = self.take_identifier("parameter name")?;
            if params.contains(&name) {
                return Err(ParseError::DuplicateParam(name));
            }
            params.push(name);

            if self.check(&Token::Comma) {
                self.advance()?;
            } else {
                break;
            }
        }
        self.expect(Token::RParen, "')' after parameters")?;
        Ok(params)
    }

    /// Parse an expression body, tolerating a leading `return` and trailing `;`.
    fn parse_body(&mut self) -> Result<Expr, ParseError> {
        if self.check(&Token::Return) {
            self.advance()?;
        }
        let expr = self.parse_expression()?;
        while self.check(&Token::Semicolon) {
            self.advance()?;
        }
        self.expect(Token::Eof, "end of expression")?;
        Ok(expr)
    }

    /// Parse primary expressions: literals, names, calls and parenthesized groups
    fn parse_primary(&mut self) -> Result<Expr, ParseError> {
        match mem::replace(&mut self.current_token, Token::Eof) {
            // Literals
            Token::Float(n) => {
                self.advance()?;
                Ok(Expr::Float(n))
            }
            Token::Integer(n) => {
                self.advance()?;
                Ok(Expr::Integer(n))
            }
            Token::String(s) => {
                self.advance()?;
                Ok(Expr::String(s))
            }
            Token::Boolean(b) => {
                self.advance()?;
                Ok(Expr::Boolean(b))
            }
            Token::Null => {
                self.advance()?;
                Ok(Expr::Null)
            }

            // Names
            Token::Identifier(name) => {
                self.advance()?;

                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_arguments()?;
                    Ok(Expr::Call { name, args })
                } else if self.params.contains(&name) {
                    Ok(Expr::Param(name))
                } else {
                    Ok(Expr::Ident(name))
                }
            }

            Token::LParen => {
                self.advance()?;
                let expr = self.parse_expression()?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }

            token => {
                self.current_token = token;
                Err(self.unexpected("an operand"))
            }
        }
    }

    /// Parse call arguments after the opening parenthesis
    fn parse_arguments(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![];

        while !self.check(&Token::RParen) {
            args.push(self.parse_expression()?);

            if !self.check(&Token::RParen) {
                self.expect(Token::Comma, "',' or ')' in argument list")?;
            }
        }

        self.expect(Token::RParen, "')'")?;
        Ok(args)
    }

    /// Parse property access chains
    fn parse_postfix(&mut self) -> Result<Expr, ParseError> {
        let mut expr = self.parse_primary()?;

        while self.check(&Token::Dot) {
            self.advance()?; // consume '.'
            let name = self.take_identifier("property name after '.'")?;

            if self.check(&Token::LParen) {
                return Err(ParseError::MethodCall(name));
            }

            expr = Expr::Property {
                object: Box::new(expr),
                name,
            };
        }
        Ok(expr)
    }

    fn parse_unary(&mut self) -> Result<Expr, ParseError> {
        let op = match &self.current_token {
            Token::Bang => UnaryOp::Not,
            Token::Minus => UnaryOp::Negate,
            _ => return self.parse_postfix(),
        };

        self.advance()?;
        let operand = self.parse_unary()?; // Right-associative
        Ok(Expr::Unary {
            op,
            operand: Box::new(operand),
        })
    }

    fn parse_multiplicative(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_unary()?;

        loop {
            let op = match &self.current_token {
                Token::Star => BinOp::Multiply,
                Token::Slash => BinOp::Divide,
                Token::Percent => BinOp::Modulo,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_unary()?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_multiplicative()?;

        loop {
            let op = match &self.current_token {
                Token::Plus => BinOp::Add,
                Token::Minus => BinOp::Subtract,
                _ => break,
            };

            self.advance()?;
            let right = self.parse_multiplicative()?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_additive()?;

        if let Some(op) = match &self.current_token {
            Token::EqEq => Some(BinOp::Equal),
            Token::EqEqEq => Some(BinOp::StrictEqual),
            Token::NotEq => Some(BinOp::NotEqual),
            Token::NotEqEq => Some(BinOp::StrictNotEqual),
            Token::Lt => Some(BinOp::LessThan),
            Token::Gt => Some(BinOp::GreaterThan),
            Token::LtEq => Some(BinOp::LessEqual),
            Token::GtEq => Some(BinOp::GreaterEqual),
            _ => None,
        } {
            self.advance()?;
            let right = self.parse_additive()?;

            left = Expr::BinaryOp {
                op,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_comparison()?;

        while self.check(&Token::AndAnd) || self.check(&Token::And) {
            self.advance()?;
            let right = self.parse_comparison()?;

            left = Expr::BinaryOp {
                op: BinOp::And,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    fn parse_or(&mut self) -> Result<Expr, ParseError> {
        let mut left = self.parse_and()?;

        while self.check(&Token::OrOr) || self.check(&Token::Or) {
            self.advance()?;
            let right = self.parse_and()?;

            left = Expr::BinaryOp {
                op: BinOp::Or,
                left: Box::new(left),
                right: Box::new(right),
            };
        }
        Ok(left)
    }

    pub fn parse_expression(&mut self) -> Result<Expr, ParseError> {
        self.parse_or()
    }
}
