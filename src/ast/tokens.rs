/// Lexical tokens of the guest expression language.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating-point number
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 0.5
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 314
    /// ```
    Integer(i64),

    /// String literal enclosed in double or single quotes
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'item #1'
    /// ```
    String(String),

    /// Boolean values
    Boolean(bool),

    /// Null value
    Null,

    // Identifiers and keywords
    /// Parameter, property, constant or function name
    ///
    /// Must start with a letter or underscore, followed by letters, digits, or underscores.
    ///
    /// # Examples
    /// ```text
    /// row
    /// PartitionKey
    /// starts_with
    /// ```
    Identifier(String),

    /// `return` keyword, tolerated in front of an expression body
    Return,

    /// Lambda arrow separating parameters from the body
    ///
    /// # Examples
    /// ```text
    /// row => row.age > 18
    /// (acc, row) => acc + row.total
    /// ```
    Arrow,

    // Comparison
    /// Loose equality (`==`)
    EqEq,

    /// Strict equality (`===`)
    EqEqEq,

    /// Loose inequality (`!=`)
    NotEq,

    /// Strict inequality (`!==`)
    NotEqEq,

    /// Less than
    Lt,

    /// Greater than
    Gt,

    /// Less than or equal
    LtEq,

    /// Greater than or equal
    GtEq,

    // Arithmetic
    /// Addition or string concatenation
    Plus,

    /// Subtraction or negation
    Minus,

    /// Multiplication
    Star,

    /// Division
    Slash,

    /// Modulo
    Percent,

    // Logical
    /// Logical AND (`&&`)
    AndAnd,

    /// Logical OR (`||`)
    OrOr,

    /// Logical AND keyword (`and`)
    And,

    /// Logical OR keyword (`or`)
    Or,

    /// Logical negation (`!`)
    Bang,

    // Delimiters
    /// Left parenthesis for grouping or function calls
    LParen,

    /// Right parenthesis
    RParen,

    /// Property access
    Dot,

    /// Argument or parameter separator
    Comma,

    /// Statement terminator, tolerated after an expression body
    Semicolon,

    /// End of input
    Eof,
}

impl Token {
    /// True for the tokens that may appear as a comparison operator.
    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            Token::EqEq
                | Token::EqEqEq
                | Token::NotEq
                | Token::NotEqEq
                | Token::Lt
                | Token::Gt
                | Token::LtEq
                | Token::GtEq
        )
    }
}
