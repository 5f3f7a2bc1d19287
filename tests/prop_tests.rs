// tests/prop_tests.rs

use std::collections::BTreeMap;

use proptest::prelude::*;
use tablinq::expression::GuestExpression;
use tablinq::filter::{self, grammar};
use tablinq::{Evaluator, Query, Value};

fn operand() -> impl Strategy<Value = String> {
    let leaf = prop_oneof![
        Just("r.a".to_string()),
        Just("r.b".to_string()),
        Just("r.c".to_string()),
        (0i64..20).prop_map(|n| n.to_string()),
    ];
    leaf.prop_recursive(2, 8, 2, |inner| {
        (inner.clone(), prop_oneof![Just("+"), Just("-"), Just("*")], inner)
            .prop_map(|(l, op, r)| format!("({} {} {})", l, op, r))
    })
}

fn predicate() -> impl Strategy<Value = String> {
    let comparison = (
        operand(),
        prop_oneof![Just("=="), Just("!="), Just("<"), Just("<="), Just(">"), Just(">=")],
        operand(),
    )
        .prop_map(|(l, op, r)| format!("{} {} {}", l, op, r));
    comparison.prop_recursive(3, 16, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("({}) && ({})", l, r)),
            (inner.clone(), inner.clone()).prop_map(|(l, r)| format!("{} || {}", l, r)),
            inner.prop_map(|p| format!("!({})", p)),
        ]
    })
}

fn record(a: i64, b: i64, c: i64) -> Value {
    let mut map = BTreeMap::new();
    map.insert("a".to_string(), Value::Integer(a));
    map.insert("b".to_string(), Value::Integer(b));
    map.insert("c".to_string(), Value::Integer(c));
    Value::Object(map)
}

proptest! {
    #[test]
    fn prop_compiled_filter_parses_and_agrees(
        body in predicate(),
        rows in proptest::collection::vec((-10i64..10, -10i64..10, -10i64..10), 1..8),
    ) {
        let expr = GuestExpression::parse(&format!("r => {}", body)).unwrap();
        prop_assert!(filter::is_remote_eligible(&expr));

        let compiled = filter::compile(&expr).unwrap();
        let parsed = grammar::parse(compiled.as_str());
        prop_assert!(parsed.is_ok(), "{} compiled to unparsable {}", body, compiled);
        let parsed = parsed.unwrap();

        let evaluator = Evaluator::new();
        for (a, b, c) in rows {
            let row = record(a, b, c);
            prop_assert_eq!(
                evaluator.test(&expr, &row).unwrap(),
                parsed.matches(&row).unwrap(),
                "{} vs {} on {:?}", body, compiled, row
            );
        }
    }

    #[test]
    fn prop_multi_key_sort_non_decreasing(v in proptest::collection::vec((-50i64..50, -50i64..50), 0..40)) {
        let data: Vec<Value> = v.iter().map(|(a, b)| record(*a, *b, 0)).collect();
        let sorted = Query::from_values(data)
            .order_by("r => r.a")
            .unwrap()
            .then_by("r => r.b")
            .unwrap()
            .to_vec()
            .unwrap();

        let pairs: Vec<(i64, i64)> = sorted
            .iter()
            .map(|row| match (row.get("a"), row.get("b")) {
                (Some(Value::Integer(a)), Some(Value::Integer(b))) => (*a, *b),
                other => panic!("Expected integer keys, got {:?}", other),
            })
            .collect();
        for w in pairs.windows(2) {
            prop_assert!(w[0] <= w[1]);
        }

        let mut expected = v.clone();
        expected.sort();
        prop_assert_eq!(pairs, expected);
    }
}
