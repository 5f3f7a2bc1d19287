use crate::ast::Token;
use thiserror::Error;

/// Character offset into the lexed source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Position {
    pub offset: usize,
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "position {}", self.offset)
    }
}

/// Errors raised while splitting guest source into tokens.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {position}")]
    UnexpectedChar { ch: char, position: Position },

    #[error("unexpected '{ch}' at {position} (did you mean '{suggestion}'?)")]
    Incomplete {
        ch: char,
        suggestion: &'static str,
        position: Position,
    },

    #[error("unterminated string starting at {0}")]
    UnterminatedString(Position),

    #[error("invalid escape sequence '\\{ch}' at {position}")]
    InvalidEscape { ch: char, position: Position },

    #[error("invalid number '{text}' at {position}")]
    InvalidNumber { text: String, position: Position },
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
        }
    }

    /// Lexes the whole input, returning every token before `Eof`.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        let mut tokens = Vec::new();
        loop {
            match self.next_token()? {
                Token::Eof => return Ok(tokens),
                token => tokens.push(token),
            }
        }
    }

    /// Offset of the next unread character.
    pub fn position(&self) -> Position {
        Position {
            offset: self.position,
        }
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn advance_by(&mut self, n: usize) {
        self.position += n;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    fn read_string(&mut self, quote: char) -> Result<String, LexError> {
        let start = self.position();
        let mut result = String::new();
        self.advance(); // opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                c if c == quote => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance();
                    match self.current_char() {
                        Some('n') => result.push('\n'),
                        Some('t') => result.push('\t'),
                        Some('r') => result.push('\r'),
                        Some('"') => result.push('"'),
                        Some('\'') => result.push('\''),
                        Some('\\') => result.push('\\'),
                        Some(ch) => {
                            return Err(LexError::InvalidEscape {
                                ch,
                                position: self.position(),
                            });
                        }
                        None => return Err(LexError::UnterminatedString(start)),
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::UnterminatedString(start))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position();
        let mut number = String::new();
        let mut is_float = false;

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else if ch == '.'
                && !is_float
                && self.peek_char(1).is_some_and(|c| c.is_ascii_digit())
            {
                is_float = true;
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        let invalid = || LexError::InvalidNumber {
            text: number.clone(),
            position: start,
        };
        if is_float {
            number.parse::<f64>().map(Token::Float).map_err(|_| invalid())
        } else {
            number.parse::<i64>().map(Token::Integer).map_err(|_| invalid())
        }
    }

    /// Consumes `len` characters and returns `token`.
    fn emit(&mut self, len: usize, token: Token) -> Result<Token, LexError> {
        self.advance_by(len);
        Ok(token)
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();

        let Some(ch) = self.current_char() else {
            return Ok(Token::Eof);
        };
        let next = self.peek_char(1);

        match ch {
            '.' => self.emit(1, Token::Dot),
            ',' => self.emit(1, Token::Comma),
            ';' => self.emit(1, Token::Semicolon),
            '(' => self.emit(1, Token::LParen),
            ')' => self.emit(1, Token::RParen),
            '+' => self.emit(1, Token::Plus),
            '-' => self.emit(1, Token::Minus),
            '*' => self.emit(1, Token::Star),
            '/' => self.emit(1, Token::Slash),
            '%' => self.emit(1, Token::Percent),
            '=' => match next {
                Some('>') => self.emit(2, Token::Arrow),
                Some('=') if self.peek_char(2) == Some('=') => self.emit(3, Token::EqEqEq),
                Some('=') => self.emit(2, Token::EqEq),
                _ => Err(LexError::Incomplete {
                    ch,
                    suggestion: "==",
                    position: self.position(),
                }),
            },
            '!' => match next {
                Some('=') if self.peek_char(2) == Some('=') => self.emit(3, Token::NotEqEq),
                Some('=') => self.emit(2, Token::NotEq),
                _ => self.emit(1, Token::Bang),
            },
            '>' => match next {
                Some('=') => self.emit(2, Token::GtEq),
                _ => self.emit(1, Token::Gt),
            },
            '<' => match next {
                Some('=') => self.emit(2, Token::LtEq),
                _ => self.emit(1, Token::Lt),
            },
            '&' => match next {
                Some('&') => self.emit(2, Token::AndAnd),
                _ => Err(LexError::Incomplete {
                    ch,
                    suggestion: "&&",
                    position: self.position(),
                }),
            },
            '|' => match next {
                Some('|') => self.emit(2, Token::OrOr),
                _ => Err(LexError::Incomplete {
                    ch,
                    suggestion: "||",
                    position: self.position(),
                }),
            },
            '"' | '\'' => Ok(Token::String(self.read_string(ch)?)),
            ch if ch.is_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                Ok(match ident.as_str() {
                    "and" => Token::And,
                    "or" => Token::Or,
                    "true" => Token::Boolean(true),
                    "false" => Token::Boolean(false),
                    "null" => Token::Null,
                    "return" => Token::Return,
                    _ => Token::Identifier(ident),
                })
            }
            ch if ch.is_ascii_digit() => self.read_number(),
            ch => Err(LexError::UnexpectedChar {
                ch,
                position: self.position(),
            }),
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("and or true false null return");
    assert_eq!(lexer.next_token(), Ok(Token::And));
    assert_eq!(lexer.next_token(), Ok(Token::Or));
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(true)));
    assert_eq!(lexer.next_token(), Ok(Token::Boolean(false)));
    assert_eq!(lexer.next_token(), Ok(Token::Null));
    assert_eq!(lexer.next_token(), Ok(Token::Return));
}

#[test]
fn test_lambda() {
    let tokens = Lexer::new("row => row.age >= 18").tokenize().unwrap();
    assert_eq!(
        tokens,
        vec![
            Token::Identifier("row".to_string()),
            Token::Arrow,
            Token::Identifier("row".to_string()),
            Token::Dot,
            Token::Identifier("age".to_string()),
            Token::GtEq,
            Token::Integer(18),
        ]
    );
}
