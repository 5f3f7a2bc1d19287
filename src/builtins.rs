//! Functions callable from guest expressions.
//!
//! Two groups live here:
//!
//! - **built-ins**, named in `builtins.list`. They only run locally; a
//!   predicate calling one is never pushed to the remote store.
//! - **remote-native** functions ([`REMOTE_NATIVE`]), which the remote filter
//!   grammar understands. They are pushable and also evaluated locally so that
//!   materialized sources and the in-memory client behave the same way.

use std::collections::HashSet;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::{evaluator::EvalError, value::Value};

const BUILTIN_LIST: &str = include_str!("builtins.list");

static BUILTINS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    BUILTIN_LIST
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .collect()
});

/// Functions the remote filter grammar executes natively.
pub const REMOTE_NATIVE: &[&str] = &[
    "startswith",
    "endswith",
    "substringof",
    "tolower",
    "toupper",
    "length",
];

/// Version of the shipped built-in list (`# version: N` header).
pub fn list_version() -> u32 {
    BUILTIN_LIST
        .lines()
        .find_map(|line| line.trim().strip_prefix("# version:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0)
}

/// True when `name` is a local-only built-in.
pub fn is_builtin(name: &str) -> bool {
    BUILTINS.contains(name)
}

/// True when `name` is understood by the remote filter grammar.
pub fn is_remote_native(name: &str) -> bool {
    REMOTE_NATIVE.contains(&name)
}

/// Every built-in name, in no particular order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().copied()
}

fn arity(name: &str, args: &[Value], min: usize, max: usize) -> Result<(), EvalError> {
    if args.len() < min || args.len() > max {
        let expected = if min == max {
            min.to_string()
        } else if max == usize::MAX {
            format!("at least {min}")
        } else {
            format!("{min} to {max}")
        };
        return Err(EvalError::Arity {
            function: name.to_string(),
            expected,
            got: args.len(),
        });
    }
    Ok(())
}

fn number(name: &str, v: &Value) -> Result<f64, EvalError> {
    v.as_float().ok_or_else(|| {
        EvalError::TypeError(format!("{name}() requires a number, got {}", v.type_name()))
    })
}

fn string<'a>(name: &str, v: &'a Value) -> Result<&'a str, EvalError> {
    match v {
        Value::String(s) => Ok(s),
        _ => Err(EvalError::TypeError(format!(
            "{name}() requires a string, got {}",
            v.type_name()
        ))),
    }
}

/// Whole floats come back as integers, mirroring arithmetic.
fn integral(f: f64) -> Value {
    if f.fract() == 0.0 && f.abs() < i64::MAX as f64 {
        Value::Integer(f as i64)
    } else {
        Value::Float(f)
    }
}

fn extreme(name: &str, args: &[Value], wanted: std::cmp::Ordering) -> Result<Value, EvalError> {
    arity(name, args, 1, usize::MAX)?;
    let items: &[Value] = match args {
        [Value::Array(items)] => items,
        _ => args,
    };
    let mut best: Option<&Value> = None;
    for item in items {
        best = match best {
            Some(current) if item.sort_compare(current) != wanted => Some(current),
            _ => Some(item),
        };
    }
    Ok(best.cloned().unwrap_or(Value::Null))
}

fn is_numeric_string(s: &str) -> bool {
    let s = s.trim();
    !s.is_empty() && s.parse::<f64>().is_ok()
}

/// Calls a built-in or remote-native function.
pub fn call(name: &str, args: &[Value]) -> Result<Value, EvalError> {
    match name {
        // numeric
        "abs" => {
            arity(name, args, 1, 1)?;
            match &args[0] {
                Value::Integer(n) => Ok(n
                    .checked_abs()
                    .map_or(Value::Float((*n as f64).abs()), Value::Integer)),
                v => Ok(Value::Float(number(name, v)?.abs())),
            }
        }
        "ceil" => {
            arity(name, args, 1, 1)?;
            Ok(integral(number(name, &args[0])?.ceil()))
        }
        "floor" => {
            arity(name, args, 1, 1)?;
            Ok(integral(number(name, &args[0])?.floor()))
        }
        "round" => {
            arity(name, args, 1, 2)?;
            let n = number(name, &args[0])?;
            match args.get(1) {
                None => Ok(integral(n.round())),
                Some(digits) => {
                    let factor = 10f64.powi(number(name, digits)? as i32);
                    Ok(Value::Float((n * factor).round() / factor))
                }
            }
        }
        "sqrt" => {
            arity(name, args, 1, 1)?;
            Ok(Value::Float(number(name, &args[0])?.sqrt()))
        }
        "pow" => {
            arity(name, args, 2, 2)?;
            match (&args[0], &args[1]) {
                (Value::Integer(b), Value::Integer(e)) if (0..=u32::MAX as i64).contains(e) => {
                    Ok(b.checked_pow(*e as u32).map_or_else(
                        || Value::Float((*b as f64).powf(*e as f64)),
                        Value::Integer,
                    ))
                }
                (b, e) => Ok(Value::Float(number(name, b)?.powf(number(name, e)?))),
            }
        }
        "min" => extreme(name, args, std::cmp::Ordering::Less),
        "max" => extreme(name, args, std::cmp::Ordering::Greater),

        // strings
        "len" | "length" => {
            arity(name, args, 1, 1)?;
            match &args[0] {
                Value::String(s) => Ok(Value::Integer(s.chars().count() as i64)),
                Value::Array(a) => Ok(Value::Integer(a.len() as i64)),
                Value::Object(o) => Ok(Value::Integer(o.len() as i64)),
                v => Err(EvalError::TypeError(format!(
                    "{name}() requires a string, array or object, got {}",
                    v.type_name()
                ))),
            }
        }
        "lower" | "tolower" => {
            arity(name, args, 1, 1)?;
            Ok(Value::String(string(name, &args[0])?.to_lowercase()))
        }
        "upper" | "toupper" => {
            arity(name, args, 1, 1)?;
            Ok(Value::String(string(name, &args[0])?.to_uppercase()))
        }
        "trim" => {
            arity(name, args, 1, 1)?;
            Ok(Value::String(string(name, &args[0])?.trim().to_string()))
        }
        "substr" => {
            arity(name, args, 2, 3)?;
            let s = string(name, &args[0])?;
            let start = number(name, &args[1])?.max(0.0) as usize;
            let chars = s.chars().skip(start);
            let out: String = match args.get(2) {
                Some(len) => chars.take(number(name, len)?.max(0.0) as usize).collect(),
                None => chars.collect(),
            };
            Ok(Value::String(out))
        }
        "contains" => {
            arity(name, args, 2, 2)?;
            match (&args[0], &args[1]) {
                (Value::String(hay), Value::String(needle)) => {
                    Ok(Value::Boolean(hay.contains(needle.as_str())))
                }
                (Value::Array(items), needle) => {
                    Ok(Value::Boolean(items.iter().any(|v| v.loose_eq(needle))))
                }
                (hay, _) => Err(EvalError::TypeError(format!(
                    "contains() requires a string or array, got {}",
                    hay.type_name()
                ))),
            }
        }
        "substringof" => {
            arity(name, args, 2, 2)?;
            let needle = string(name, &args[0])?;
            let hay = string(name, &args[1])?;
            Ok(Value::Boolean(hay.contains(needle)))
        }
        "starts_with" | "startswith" => {
            arity(name, args, 2, 2)?;
            let s = string(name, &args[0])?;
            Ok(Value::Boolean(s.starts_with(string(name, &args[1])?)))
        }
        "ends_with" | "endswith" => {
            arity(name, args, 2, 2)?;
            let s = string(name, &args[0])?;
            Ok(Value::Boolean(s.ends_with(string(name, &args[1])?)))
        }
        "concat" => Ok(Value::String(args.iter().map(Value::as_string).collect())),
        "matches" => {
            arity(name, args, 2, 2)?;
            let s = string(name, &args[0])?;
            let pattern = string(name, &args[1])?;
            let re = Regex::new(pattern).map_err(|e| EvalError::InvalidRegex(e.to_string()))?;
            Ok(Value::Boolean(re.is_match(s)))
        }

        // conversion
        "to_int" => {
            arity(name, args, 1, 1)?;
            Ok(match &args[0] {
                Value::String(s) => s.trim().parse::<i64>().map_or_else(
                    |_| s.trim().parse::<f64>().map_or(Value::Null, |f| Value::Integer(f as i64)),
                    Value::Integer,
                ),
                Value::Boolean(b) => Value::Integer(i64::from(*b)),
                Value::Float(f) => Value::Integer(f.trunc() as i64),
                v => v.as_int().map_or(Value::Null, Value::Integer),
            })
        }
        "to_float" => {
            arity(name, args, 1, 1)?;
            Ok(match &args[0] {
                Value::String(s) => s.trim().parse::<f64>().map_or(Value::Null, Value::Float),
                Value::Boolean(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
                v => v.as_float().map_or(Value::Null, Value::Float),
            })
        }
        "to_string" => {
            arity(name, args, 1, 1)?;
            Ok(Value::String(args[0].as_string()))
        }
        "coalesce" => Ok(args
            .iter()
            .find(|v| **v != Value::Null)
            .cloned()
            .unwrap_or(Value::Null)),

        // type checks
        "is_array" => type_check(name, args, |v| matches!(v, Value::Array(_))),
        "is_bool" => type_check(name, args, |v| matches!(v, Value::Boolean(_))),
        "is_double" | "is_float" | "is_real" => {
            type_check(name, args, |v| matches!(v, Value::Float(_)))
        }
        "is_int" | "is_integer" | "is_long" => {
            type_check(name, args, |v| matches!(v, Value::Integer(_)))
        }
        "is_null" => type_check(name, args, |v| matches!(v, Value::Null)),
        "is_numeric" => type_check(name, args, |v| match v {
            Value::String(s) => is_numeric_string(s),
            v => v.is_numeric(),
        }),
        "is_object" => type_check(name, args, |v| matches!(v, Value::Object(_))),
        "is_scalar" => type_check(name, args, |v| {
            matches!(
                v,
                Value::Boolean(_) | Value::Integer(_) | Value::Float(_) | Value::String(_)
            )
        }),
        "is_string" => type_check(name, args, |v| matches!(v, Value::String(_))),
        "is_a" => {
            arity(name, args, 2, 2)?;
            let type_name = string(name, &args[1])?;
            let tagged = matches!(args[0].get("__type"), Some(Value::String(t)) if t == type_name);
            Ok(Value::Boolean(
                tagged || args[0].type_name().eq_ignore_ascii_case(type_name),
            ))
        }

        _ => Err(EvalError::UnknownFunction(name.to_string())),
    }
}

fn type_check(name: &str, args: &[Value], check: impl Fn(&Value) -> bool) -> Result<Value, EvalError> {
    arity(name, args, 1, 1)?;
    Ok(Value::Boolean(check(&args[0])))
}
