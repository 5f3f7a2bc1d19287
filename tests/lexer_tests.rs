// tests/lexer_tests.rs

use tablinq::ast::Token;
use tablinq::lexer::{LexError, Lexer};

fn tokens(input: &str) -> Vec<Token> {
    Lexer::new(input).tokenize().unwrap()
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("!", Token::Bang),
        ("+", Token::Plus),
        ("-", Token::Minus),
        ("*", Token::Star),
        ("/", Token::Slash),
        ("%", Token::Percent),
        ("(", Token::LParen),
        (")", Token::RParen),
        (".", Token::Dot),
        (",", Token::Comma),
        (";", Token::Semicolon),
        ("<", Token::Lt),
        (">", Token::Gt),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        let token = lexer.next_token().unwrap();
        assert_eq!(token, expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

// ============================================================================
// Multi Character Tokens
// ============================================================================

#[test]
fn test_multi_char_tokens() {
    let test_cases = vec![
        ("=>", Token::Arrow),
        ("==", Token::EqEq),
        ("===", Token::EqEqEq),
        ("!=", Token::NotEq),
        ("!==", Token::NotEqEq),
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
        ("&&", Token::AndAnd),
        ("||", Token::OrOr),
    ];

    for (input, expected) in test_cases {
        let mut lexer = Lexer::new(input);
        assert_eq!(lexer.next_token().unwrap(), expected, "Failed for input: {}", input);
        assert_eq!(lexer.next_token().unwrap(), Token::Eof);
    }
}

#[test]
fn test_longest_match() {
    assert_eq!(tokens("a===b"), vec![
        Token::Identifier("a".into()),
        Token::EqEqEq,
        Token::Identifier("b".into()),
    ]);
    assert_eq!(tokens("!!a"), vec![Token::Bang, Token::Bang, Token::Identifier("a".into())]);
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_numbers() {
    assert_eq!(tokens("42"), vec![Token::Integer(42)]);
    assert_eq!(tokens("3.25"), vec![Token::Float(3.25)]);
    assert_eq!(tokens("0"), vec![Token::Integer(0)]);
}

#[test]
fn test_number_followed_by_dot_property() {
    // A dot not followed by a digit ends the number.
    assert_eq!(tokens("1.x"), vec![
        Token::Integer(1),
        Token::Dot,
        Token::Identifier("x".into()),
    ]);
}

#[test]
fn test_strings_both_quotes() {
    assert_eq!(tokens(r#""hello""#), vec![Token::String("hello".into())]);
    assert_eq!(tokens("'hello'"), vec![Token::String("hello".into())]);
    assert_eq!(tokens(r#"'it"s'"#), vec![Token::String("it\"s".into())]);
}

#[test]
fn test_string_escapes() {
    assert_eq!(
        tokens(r#""a\nb\t\"c\" \\ \'""#),
        vec![Token::String("a\nb\t\"c\" \\ '".into())]
    );
}

#[test]
fn test_keywords_and_identifiers() {
    assert_eq!(tokens("true false null"), vec![
        Token::Boolean(true),
        Token::Boolean(false),
        Token::Null,
    ]);
    assert_eq!(tokens("and or return"), vec![Token::And, Token::Or, Token::Return]);
    assert_eq!(tokens("android _x x1"), vec![
        Token::Identifier("android".into()),
        Token::Identifier("_x".into()),
        Token::Identifier("x1".into()),
    ]);
}

// ============================================================================
// Lambdas
// ============================================================================

#[test]
fn test_two_parameter_lambda() {
    assert_eq!(tokens("(acc, x) => acc + x"), vec![
        Token::LParen,
        Token::Identifier("acc".into()),
        Token::Comma,
        Token::Identifier("x".into()),
        Token::RParen,
        Token::Arrow,
        Token::Identifier("acc".into()),
        Token::Plus,
        Token::Identifier("x".into()),
    ]);
}

#[test]
fn test_whitespace_is_ignored() {
    assert_eq!(tokens("  r\n=>\tr.a  "), tokens("r=>r.a"));
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_lone_equals_suggests_double() {
    let err = Lexer::new("a = 1").tokenize().unwrap_err();
    assert!(matches!(err, LexError::Incomplete { ch: '=', suggestion: "==", .. }));
}

#[test]
fn test_single_ampersand_and_pipe() {
    assert!(matches!(
        Lexer::new("a & b").tokenize(),
        Err(LexError::Incomplete { suggestion: "&&", .. })
    ));
    assert!(matches!(
        Lexer::new("a | b").tokenize(),
        Err(LexError::Incomplete { suggestion: "||", .. })
    ));
}

#[test]
fn test_unterminated_string() {
    let err = Lexer::new("r => r.a == 'abc").tokenize().unwrap_err();
    assert!(matches!(err, LexError::UnterminatedString(p) if p.offset == 12));
}

#[test]
fn test_invalid_escape() {
    assert!(matches!(
        Lexer::new(r#""\q""#).tokenize(),
        Err(LexError::InvalidEscape { ch: 'q', .. })
    ));
}

#[test]
fn test_unexpected_character_position() {
    let err = Lexer::new("r => r.a # 1").tokenize().unwrap_err();
    match err {
        LexError::UnexpectedChar { ch, position } => {
            assert_eq!(ch, '#');
            assert_eq!(position.offset, 9);
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_integer_overflow_is_an_error() {
    assert!(matches!(
        Lexer::new("99999999999999999999").tokenize(),
        Err(LexError::InvalidNumber { .. })
    ));
}
