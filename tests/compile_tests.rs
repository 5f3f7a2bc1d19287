// tests/compile_tests.rs

use tablinq::expression::GuestExpression;
use tablinq::filter::{
    self, CompileError, Eligibility, FilterToken, Rejection, TokenKind, classify, compile,
    is_remote_eligible,
};

fn expr(source: &str) -> GuestExpression {
    GuestExpression::parse(source).unwrap()
}

fn compiled(source: &str) -> String {
    compile(&expr(source)).unwrap().into_string()
}

fn rejection(source: &str) -> Rejection {
    match classify(&expr(source)) {
        Eligibility::Local(reason) => reason,
        Eligibility::Remote => panic!("expected {} to stay local", source),
    }
}

// ============================================================================
// Operator Translation
// ============================================================================

#[test]
fn test_comparison_table() {
    let cases = [
        ("==", "eq"),
        ("===", "eq"),
        ("!=", "ne"),
        ("!==", "ne"),
        (">=", "ge"),
        ("<=", "le"),
        (">", "gt"),
        ("<", "lt"),
    ];
    for (guest, remote) in cases {
        let source = format!("r => r.a {} 1", guest);
        assert_eq!(compiled(&source), format!("a {} 1", remote), "Failed for {}", guest);
    }
}

#[test]
fn test_logical_operators() {
    assert_eq!(compiled("r => r.a == 1 && r.b == 2"), "a eq 1 and b eq 2");
    assert_eq!(compiled("r => r.a == 1 || r.b == 2"), "a eq 1 or b eq 2");
    assert_eq!(compiled("r => r.a == 1 and r.b == 2 or r.c"), "a eq 1 and b eq 2 or c");
}

#[test]
fn test_negation() {
    assert_eq!(compiled("r => !r.deleted"), "not deleted");
    assert_eq!(compiled("r => !(r.a == 1)"), "not (a eq 1)");
}

#[test]
fn test_arithmetic_passes_through() {
    assert_eq!(compiled("r => r.price * r.qty + 5 > 100"), "price * qty + 5 gt 100");
    assert_eq!(compiled("r => r.a % 2 == 0"), "a % 2 eq 0");
    assert_eq!(compiled("r => r.a / 4 - 1 < r.b"), "a / 4 - 1 lt b");
}

#[test]
fn test_unary_minus() {
    assert_eq!(compiled("r => r.t > -5"), "t gt -5");
    assert_eq!(compiled("r => -r.t < 0"), "-t lt 0");
    assert_eq!(compiled("r => r.a - -2 == 0"), "a - -2 eq 0");
}

#[test]
fn test_string_concatenation() {
    assert_eq!(
        compiled(r#"r => r.first + " " + r.last == "Ada Lovelace""#),
        "first + ' ' + last eq 'Ada Lovelace'"
    );
}

// ============================================================================
// Literals and Names
// ============================================================================

#[test]
fn test_literals() {
    assert_eq!(compiled("r => r.score >= 2.5"), "score ge 2.5");
    assert_eq!(compiled("r => r.score == 3.0"), "score eq 3.0");
    assert_eq!(
        compiled("r => r.active == true && r.deleted == null"),
        "active eq true and deleted eq null"
    );
}

#[test]
fn test_strings_become_single_quoted() {
    assert_eq!(compiled(r#"row => row.name != "bob""#), "name ne 'bob'");
    assert_eq!(compiled("row => row.name == 'bob'"), "name eq 'bob'");
    assert_eq!(compiled(r#"r => r.name == "O'Brien""#), "name eq 'O''Brien'");
}

#[test]
fn test_bare_identifier_is_a_constant() {
    assert_eq!(compiled("r => r.status == Active"), "status eq Active");
}

#[test]
fn test_parameter_named_like_property() {
    assert_eq!(compiled("r => r.r == 1"), "r eq 1");
}

#[test]
fn test_return_and_terminator_stripped() {
    assert_eq!(compiled("r => return r.a == 1;"), "a eq 1");
}

#[test]
fn test_grouping() {
    assert_eq!(
        compiled("r => (r.a > 1 || r.b < 2) && !r.c"),
        "(a gt 1 or b lt 2) and not c"
    );
    assert_eq!(compiled("r => ((r.a))"), "((a))");
}

// ============================================================================
// Remote-native Functions
// ============================================================================

#[test]
fn test_remote_native_calls() {
    assert_eq!(
        compiled(r#"r => startswith(r.name, "A") && length(r.code) == 3"#),
        "startswith(name, 'A') and length(code) eq 3"
    );
    assert_eq!(
        compiled(r#"r => substringof("x", tolower(r.tag))"#),
        "substringof('x', tolower(tag))"
    );
}

// ============================================================================
// Classification
// ============================================================================

#[test]
fn test_simple_predicates_are_eligible() {
    for source in [
        "r => r.a == 1",
        "r => r.a > 1 && r.b != 'x' || !r.c",
        "r => r.a + r.b * 2 >= 10",
        "r => endswith(r.mail, '.nl')",
    ] {
        assert!(is_remote_eligible(&expr(source)), "{} should be eligible", source);
    }
}

#[test]
fn test_builtin_calls_are_never_eligible() {
    assert_eq!(
        rejection(r#"r => lower(r.name) == "x""#),
        Rejection::BuiltinCall("lower".to_string())
    );
    assert_eq!(
        rejection("r => r.a > 1 && abs(r.b) < 3"),
        Rejection::BuiltinCall("abs".to_string())
    );
    assert_eq!(
        rejection("r => startswith(trim(r.a), 'x')"),
        Rejection::BuiltinCall("trim".to_string())
    );
}

#[test]
fn test_every_builtin_is_rejected() {
    for name in tablinq::builtins::builtin_names() {
        let source = format!("r => {}(r.a)", name);
        assert_eq!(
            rejection(&source),
            Rejection::BuiltinCall(name.to_string()),
            "Failed for {}",
            name
        );
    }
}

#[test]
fn test_unknown_function_stays_local() {
    assert_eq!(
        rejection("r => frobnicate(r.a)"),
        Rejection::UnsupportedFunction("frobnicate".to_string())
    );
}

#[test]
fn test_shape_rejections() {
    assert_eq!(rejection("r => r == 1"), Rejection::BareParameter("r".to_string()));
    assert_eq!(
        rejection("r => r.address.city == 'x'"),
        Rejection::NestedProperty("city".to_string())
    );
    assert_eq!(rejection("r => r.eq == 1"), Rejection::ReservedName("eq".to_string()));
    assert_eq!(rejection("r => r.a == not"), Rejection::ReservedName("not".to_string()));
    assert_eq!(rejection("(a, b) => a.x == b.y"), Rejection::ParameterCount(2));
}

#[test]
fn test_rejection_display() {
    assert_eq!(
        Rejection::BuiltinCall("abs".to_string()).to_string(),
        "calls built-in function abs()"
    );
}

// ============================================================================
// Compiler Failures
// ============================================================================

#[test]
fn test_compile_fails_instead_of_emitting() {
    assert_eq!(
        compile(&expr("r => abs(r.a) > 1")).unwrap_err(),
        CompileError::BuiltinCall("abs".to_string())
    );
    assert_eq!(
        compile(&expr("r => r.a.b == 1")).unwrap_err(),
        CompileError::NestedProperty("b".to_string())
    );
    assert_eq!(
        compile(&expr("r => r > 1")).unwrap_err(),
        CompileError::BareParameter("r".to_string())
    );
    assert_eq!(
        compile(&expr("r => r.ge == 1")).unwrap_err(),
        CompileError::ReservedName("ge".to_string())
    );
    assert_eq!(
        compile(&expr("r => nope(r.a)")).unwrap_err(),
        CompileError::UnsupportedFunction("nope".to_string())
    );
}

// ============================================================================
// Token Tagging
// ============================================================================

#[test]
fn test_depth_annotation() {
    let tokens = filter::compile::tag(&expr(r#"r => (r.a > 1) && startswith(r.b, "x")"#)).unwrap();
    let summary: Vec<(TokenKind, &str, usize)> = tokens
        .iter()
        .map(|FilterToken { kind, text, depth }| (*kind, text.as_str(), *depth))
        .collect();

    assert_eq!(
        summary,
        vec![
            (TokenKind::Boundary, "(", 1),
            (TokenKind::Property, "a", 1),
            (TokenKind::Comparison, " gt ", 1),
            (TokenKind::Literal, "1", 1),
            (TokenKind::Boundary, ")", 0),
            (TokenKind::Logical, " and ", 0),
            (TokenKind::Function, "startswith", 0),
            (TokenKind::Boundary, "(", 1),
            (TokenKind::Property, "b", 1),
            (TokenKind::Argument, ", ", 1),
            (TokenKind::Literal, "'x'", 1),
            (TokenKind::Boundary, ")", 0),
        ]
    );
}

#[test]
fn test_bound_variable_is_dropped() {
    let tokens = filter::compile::tag(&expr("row => row.age")).unwrap();
    assert_eq!(tokens.len(), 1);
    assert_eq!(tokens[0].kind, TokenKind::Property);
    assert_eq!(tokens[0].text, "age");
}

#[test]
fn test_constant_and_unary_kinds() {
    let tokens = filter::compile::tag(&expr("r => !r.a == Yes")).unwrap();
    let kinds: Vec<TokenKind> = tokens.iter().map(|t| t.kind).collect();
    assert_eq!(
        kinds,
        vec![TokenKind::Unary, TokenKind::Property, TokenKind::Comparison, TokenKind::Constant]
    );
}
