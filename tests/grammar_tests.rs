// tests/grammar_tests.rs

use std::collections::BTreeMap;

use tablinq::Value;
use tablinq::filter::grammar::{self, FilterExpr, FilterOp, GrammarError};

fn record(pairs: &[(&str, Value)]) -> Value {
    Value::Object(
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect::<BTreeMap<_, _>>(),
    )
}

fn matches(filter: &str, row: &Value) -> bool {
    grammar::parse(filter).unwrap().matches(row).unwrap()
}

// ============================================================================
// Parsing
// ============================================================================

#[test]
fn test_simple_comparison() {
    assert_eq!(
        grammar::parse("age ge 18").unwrap(),
        FilterExpr::Binary {
            op: FilterOp::Ge,
            left: Box::new(FilterExpr::Property("age".to_string())),
            right: Box::new(FilterExpr::Literal(Value::Integer(18))),
        }
    );
}

#[test]
fn test_and_binds_tighter_than_or() {
    match grammar::parse("a eq 1 or b eq 2 and c eq 3").unwrap() {
        FilterExpr::Binary { op: FilterOp::Or, right, .. } => {
            assert!(matches!(*right, FilterExpr::Binary { op: FilterOp::And, .. }));
        }
        other => panic!("Expected or, got {:?}", other),
    }
}

#[test]
fn test_literals() {
    let cases = [
        ("'it''s'", Value::String("it's".to_string())),
        ("2.5", Value::Float(2.5)),
        ("1e3", Value::Float(1000.0)),
        ("7", Value::Integer(7)),
        ("true", Value::Boolean(true)),
        ("false", Value::Boolean(false)),
        ("null", Value::Null),
    ];
    for (text, expected) in cases {
        assert_eq!(
            grammar::parse(text).unwrap(),
            FilterExpr::Literal(expected),
            "Failed for {}",
            text
        );
    }
}

#[test]
fn test_keywords_are_case_sensitive() {
    // `EQ` is a property name, so two operands sit side by side.
    assert!(grammar::parse("a EQ 1").is_err());
}

#[test]
fn test_unbalanced_parentheses() {
    assert!(grammar::parse("(a eq 1").is_err());
    assert!(grammar::parse("a eq 1)").is_err());
}

#[test]
fn test_dangling_operator() {
    assert!(matches!(
        grammar::parse("a eq"),
        Err(GrammarError::Unexpected { expected: "operand", .. })
    ));
    assert!(grammar::parse("a eq 1 and").is_err());
}

#[test]
fn test_only_remote_native_functions() {
    assert!(grammar::parse("startswith(name, 'A')").is_ok());
    assert_eq!(
        grammar::parse("lower(name) eq 'a'").unwrap_err(),
        GrammarError::UnknownFunction("lower".to_string())
    );
}

#[test]
fn test_lex_errors() {
    assert!(matches!(
        grammar::parse("name eq 'abc"),
        Err(GrammarError::UnterminatedString(8))
    ));
    assert!(matches!(
        grammar::parse("a eq \"x\""),
        Err(GrammarError::UnexpectedChar { ch: '"', .. })
    ));
}

#[test]
fn test_reserved_and_quote() {
    assert!(grammar::is_reserved("and"));
    assert!(grammar::is_reserved("null"));
    assert!(!grammar::is_reserved("AND"));
    assert_eq!(grammar::quote("O'Brien"), "'O''Brien'");
}

// ============================================================================
// Evaluation
// ============================================================================

#[test]
fn test_evaluate_against_record() {
    let row = record(&[
        ("name", Value::from("Ada")),
        ("age", Value::Integer(36)),
        ("score", Value::Float(9.5)),
    ]);

    assert!(matches("age ge 18 and name eq 'Ada'", &row));
    assert!(matches("score gt 9", &row));
    assert!(!matches("age lt 18 or name ne 'Ada'", &row));
    assert!(matches("not (age lt 18)", &row));
    assert!(matches("age * 2 - 2 eq 70", &row));
    assert!(matches("age % 5 eq 1", &row));
    assert!(matches("-age lt 0", &row));
}

#[test]
fn test_missing_property_is_null() {
    let row = record(&[("a", Value::Integer(1))]);
    assert!(matches("missing eq null", &row));
    assert!(!matches("missing gt 0", &row));
}

#[test]
fn test_functions_evaluate() {
    let row = record(&[("name", Value::from("Ada")), ("tag", Value::from("MiXed"))]);
    assert!(matches("startswith(name, 'A')", &row));
    assert!(matches("endswith(name, 'da')", &row));
    assert!(matches("substringof('d', name)", &row));
    assert!(matches("tolower(tag) eq 'mixed'", &row));
    assert!(matches("toupper(tag) eq 'MIXED'", &row));
    assert!(matches("length(name) eq 3", &row));
}

#[test]
fn test_string_concatenation() {
    let row = record(&[("first", Value::from("Ada")), ("last", Value::from("Lovelace"))]);
    assert!(matches("first + ' ' + last eq 'Ada Lovelace'", &row));
}

#[test]
fn test_integer_float_equality() {
    let row = record(&[("n", Value::Integer(3))]);
    assert!(matches("n eq 3.0", &row));
}

#[test]
fn test_negating_min_integer() {
    let row = record(&[("n", Value::Integer(i64::MIN))]);
    assert_eq!(
        grammar::parse("-n").unwrap().evaluate(&row).unwrap(),
        Value::Float(9_223_372_036_854_775_808.0)
    );
    assert!(matches("-n gt 0", &row));
}

#[test]
fn test_type_errors_surface() {
    let row = record(&[("name", Value::from("Ada"))]);
    let filter = grammar::parse("name * 2 eq 1").unwrap();
    assert!(filter.matches(&row).is_err());
}

#[test]
fn test_from_str() {
    let filter: FilterExpr = "a eq 1".parse().unwrap();
    assert!(filter.matches(&record(&[("a", Value::Integer(1))])).unwrap());
}
