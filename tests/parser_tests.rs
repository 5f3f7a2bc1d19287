// tests/parser_tests.rs

use tablinq::ast::{BinOp, Expr, Token, UnaryOp};
use tablinq::expression::GuestExpression;
use tablinq::lexer::Lexer;
use tablinq::parser::{ParseError, Parser};

fn parse(source: &str) -> GuestExpression {
    GuestExpression::parse(source).unwrap()
}

fn body(source: &str) -> Expr {
    parse(source).body().clone()
}

fn property(param: &str, name: &str) -> Expr {
    Expr::Property {
        object: Box::new(Expr::Param(param.to_string())),
        name: name.to_string(),
    }
}

// ============================================================================
// Parameters
// ============================================================================

#[test]
fn test_single_parameter() {
    let expr = parse("row => row.age > 18");
    assert_eq!(expr.params(), &["row".to_string()]);
    assert_eq!(expr.param(), "row");
    assert_eq!(expr.body_source(), "row.age > 18");
}

#[test]
fn test_parenthesized_parameters() {
    let expr = parse("(acc, x) => acc + x");
    assert_eq!(expr.params(), &["acc".to_string(), "x".to_string()]);
    assert!(expr.binds("acc"));
    assert!(expr.binds("x"));
    assert!(!expr.binds("y"));
}

#[test]
fn test_duplicate_parameter() {
    assert_eq!(
        GuestExpression::parse("(a, a) => a").unwrap_err(),
        ParseError::DuplicateParam("a".to_string())
    );
}

#[test]
fn test_missing_arrow() {
    assert!(matches!(
        GuestExpression::parse("row row.age"),
        Err(ParseError::Unexpected { expected: "'=>' after parameters", .. })
    ));
}

#[test]
fn test_identity() {
    let expr = GuestExpression::identity("x");
    assert_eq!(expr.body(), &Expr::Param("x".to_string()));
    assert_eq!(expr.body_source(), "x");
}

// ============================================================================
// Body
// ============================================================================

#[test]
fn test_return_and_semicolons_are_tolerated() {
    assert_eq!(body("r => return r.a == 1;;"), body("r => r.a == 1"));
}

#[test]
fn test_trailing_tokens_rejected() {
    assert!(matches!(
        GuestExpression::parse("r => r.a r.b"),
        Err(ParseError::Unexpected { expected: "end of expression", .. })
    ));
}

#[test]
fn test_param_vs_ident() {
    match body("r => r == limit") {
        Expr::BinaryOp { op: BinOp::Equal, left, right } => {
            assert_eq!(*left, Expr::Param("r".to_string()));
            assert_eq!(*right, Expr::Ident("limit".to_string()));
        }
        other => panic!("Expected equality, got {:?}", other),
    }
}

#[test]
fn test_property_chain() {
    assert_eq!(
        body("r => r.address.city"),
        Expr::Property {
            object: Box::new(property("r", "address")),
            name: "city".to_string(),
        }
    );
}

#[test]
fn test_method_call_rejected() {
    assert_eq!(
        GuestExpression::parse("r => r.name.lower()").unwrap_err(),
        ParseError::MethodCall("lower".to_string())
    );
}

#[test]
fn test_function_call() {
    assert_eq!(
        body("r => startswith(r.name, 'A')"),
        Expr::Call {
            name: "startswith".to_string(),
            args: vec![property("r", "name"), Expr::String("A".to_string())],
        }
    );
    assert_eq!(
        body("r => now()"),
        Expr::Call { name: "now".to_string(), args: vec![] }
    );
}

// ============================================================================
// Precedence
// ============================================================================

#[test]
fn test_arithmetic_precedence() {
    // Should be: Add(1, Multiply(2, 3))
    match body("x => 1 + 2 * 3") {
        Expr::BinaryOp { op: BinOp::Add, left, right } => {
            assert_eq!(*left, Expr::Integer(1));
            assert!(matches!(*right, Expr::BinaryOp { op: BinOp::Multiply, .. }));
        }
        other => panic!("Expected addition, got {:?}", other),
    }
}

#[test]
fn test_parentheses() {
    match body("x => (1 + 2) * 3") {
        Expr::BinaryOp { op: BinOp::Multiply, left, right } => {
            assert!(matches!(*left, Expr::BinaryOp { op: BinOp::Add, .. }));
            assert_eq!(*right, Expr::Integer(3));
        }
        other => panic!("Expected multiplication, got {:?}", other),
    }
}

#[test]
fn test_and_binds_tighter_than_or() {
    match body("r => r.a == 1 || r.b == 2 && r.c == 3") {
        Expr::BinaryOp { op: BinOp::Or, right, .. } => {
            assert!(matches!(*right, Expr::BinaryOp { op: BinOp::And, .. }));
        }
        other => panic!("Expected or, got {:?}", other),
    }
}

#[test]
fn test_keyword_logical_operators() {
    assert_eq!(body("r => r.a and r.b or r.c"), body("r => r.a && r.b || r.c"));
}

#[test]
fn test_comparison_operators() {
    let cases = [
        ("==", BinOp::Equal),
        ("===", BinOp::StrictEqual),
        ("!=", BinOp::NotEqual),
        ("!==", BinOp::StrictNotEqual),
        ("<", BinOp::LessThan),
        ("<=", BinOp::LessEqual),
        (">", BinOp::GreaterThan),
        (">=", BinOp::GreaterEqual),
    ];
    for (symbol, expected) in cases {
        let source = format!("r => r.a {} 1", symbol);
        assert!(
            matches!(body(&source), Expr::BinaryOp { op, .. } if op == expected),
            "Failed for {}",
            symbol
        );
    }
}

#[test]
fn test_comparisons_do_not_chain() {
    assert!(GuestExpression::parse("r => 1 < r.a < 3").is_err());
}

#[test]
fn test_unary_operators() {
    assert_eq!(
        body("r => !r.active"),
        Expr::Unary { op: UnaryOp::Not, operand: Box::new(property("r", "active")) }
    );
    assert_eq!(
        body("r => -r.n"),
        Expr::Unary { op: UnaryOp::Negate, operand: Box::new(property("r", "n")) }
    );
}

// ============================================================================
// Parser API
// ============================================================================

#[test]
fn test_parse_expression_without_lambda() {
    let mut parser = Parser::new(Lexer::new("a.b >= 2")).unwrap();
    let expr = parser.parse_expression().unwrap();
    assert!(matches!(expr, Expr::BinaryOp { op: BinOp::GreaterEqual, .. }));
}

#[test]
fn test_unexpected_token_reports_found() {
    match GuestExpression::parse("r => r.a ==") {
        Err(ParseError::Unexpected { found, .. }) => assert_eq!(found, Token::Eof),
        other => panic!("Expected unexpected-token error, got {:?}", other),
    }
}

#[test]
fn test_lex_errors_surface() {
    assert!(matches!(GuestExpression::parse("r => r.a = 1"), Err(ParseError::Lex(_))));
}

#[test]
fn test_from_str_and_display() {
    let expr: GuestExpression = "r => r.a".parse().unwrap();
    assert_eq!(expr.to_string(), "r => r.a");
}
