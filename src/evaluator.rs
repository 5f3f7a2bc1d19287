use rust_decimal::{Decimal, prelude::FromPrimitive, prelude::ToPrimitive};
use thiserror::Error;

use crate::{
    ast::{BinOp, Expr, UnaryOp},
    builtins,
    expression::GuestExpression,
    value::Value,
};

/// Errors that can occur while evaluating a guest expression locally.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// Type mismatch or invalid operation for the given type
    #[error("Type error: {0}")]
    TypeError(String),

    /// Bare identifier that is not a bound parameter
    #[error("Undefined name: '{0}' is not a bound parameter")]
    UndefinedName(String),

    /// Call to a function that is neither built-in nor remote-native
    #[error("Unknown function: {0}()")]
    UnknownFunction(String),

    /// Function called with the wrong number of arguments
    #[error("{function}() expects {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: String,
        got: usize,
    },

    /// Lambda applied to the wrong number of values
    #[error("expression binds {expected} parameter(s), applied to {got} value(s)")]
    ArgumentCount { expected: usize, got: usize },

    #[error("invalid regex: {0}")]
    InvalidRegex(String),

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,
}

/// Parameter bindings visible while evaluating one lambda body.
#[derive(Debug, Clone)]
pub struct EvalContext<'a> {
    bindings: Vec<(&'a str, &'a Value)>,
}

impl<'a> EvalContext<'a> {
    pub fn new(expr: &'a GuestExpression, args: &[&'a Value]) -> Result<Self, EvalError> {
        if expr.params().len() != args.len() {
            return Err(EvalError::ArgumentCount {
                expected: expr.params().len(),
                got: args.len(),
            });
        }
        let bindings = expr
            .params()
            .iter()
            .map(String::as_str)
            .zip(args.iter().copied())
            .collect();
        Ok(EvalContext { bindings })
    }

    fn lookup(&self, name: &str) -> Option<&'a Value> {
        self.bindings
            .iter()
            .find(|(param, _)| *param == name)
            .map(|(_, value)| *value)
    }
}

/// Evaluates guest expressions against in-memory values.
///
/// This is the residual pass: everything the remote store could not execute
/// (type filters, non-pushable predicates, keys, selectors) runs here.
#[derive(Debug, Default, Clone, Copy)]
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Evaluator
    }

    /// Applies a lambda to `args`, one value per bound parameter.
    ///
    /// # Examples
    ///
    /// ```
    /// use tablinq::{Evaluator, GuestExpression, Value};
    ///
    /// let double = GuestExpression::parse("n => n * 2").unwrap();
    /// let result = Evaluator::new().apply(&double, &[&Value::Integer(21)]).unwrap();
    /// assert_eq!(result, Value::Integer(42));
    /// ```
    pub fn apply(&self, expr: &GuestExpression, args: &[&Value]) -> Result<Value, EvalError> {
        let ctx = EvalContext::new(expr, args)?;
        self.eval_expr(expr.body(), &ctx)
    }

    /// Applies a single-parameter lambda.
    pub fn call(&self, expr: &GuestExpression, value: &Value) -> Result<Value, EvalError> {
        self.apply(expr, &[value])
    }

    /// Applies a single-parameter predicate and reads the result as a condition.
    pub fn test(&self, expr: &GuestExpression, value: &Value) -> Result<bool, EvalError> {
        Ok(self.call(expr, value)?.as_bool())
    }

    fn eval_expr(&self, expr: &Expr, ctx: &EvalContext<'_>) -> Result<Value, EvalError> {
        match expr {
            Expr::Float(n) => Ok(Value::Float(*n)),
            Expr::Integer(n) => Ok(Value::Integer(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Boolean(*b)),
            Expr::Null => Ok(Value::Null),
            Expr::Param(name) => ctx
                .lookup(name)
                .cloned()
                .ok_or_else(|| EvalError::UndefinedName(name.clone())),
            Expr::Ident(name) => Err(EvalError::UndefinedName(name.clone())),
            Expr::Property { object, name } => {
                let obj_value = self.eval_expr(object, ctx)?;
                self.apply_property(&obj_value, name)
            }
            Expr::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.eval_expr(arg, ctx)?);
                }
                builtins::call(name, &values)
            }
            Expr::Unary { op, operand } => {
                let value = self.eval_expr(operand, ctx)?;
                match op {
                    UnaryOp::Not => Ok(Value::Boolean(!value.as_bool())),
                    UnaryOp::Negate => match value {
                        Value::Integer(n) => Ok(negate(n)),
                        Value::Float(n) => Ok(Value::Float(-n)),
                        v => Err(EvalError::TypeError(format!("Cannot negate {}", v.type_name()))),
                    },
                }
            }
            Expr::BinaryOp { op, left, right } => match op {
                BinOp::And => {
                    if !self.eval_expr(left, ctx)?.as_bool() {
                        return Ok(Value::Boolean(false));
                    }
                    Ok(Value::Boolean(self.eval_expr(right, ctx)?.as_bool()))
                }
                BinOp::Or => {
                    if self.eval_expr(left, ctx)?.as_bool() {
                        return Ok(Value::Boolean(true));
                    }
                    Ok(Value::Boolean(self.eval_expr(right, ctx)?.as_bool()))
                }
                _ => {
                    let left_val = self.eval_expr(left, ctx)?;
                    let right_val = self.eval_expr(right, ctx)?;
                    self.apply_binop(*op, &left_val, &right_val)
                }
            },
        }
    }

    fn apply_property(&self, object: &Value, name: &str) -> Result<Value, EvalError> {
        match object {
            Value::Object(map) => Ok(map.get(name).cloned().unwrap_or(Value::Null)),
            Value::Null => Ok(Value::Null),
            v => Err(EvalError::TypeError(format!(
                "Cannot read property '{}' of {}",
                name,
                v.type_name()
            ))),
        }
    }

    pub(crate) fn apply_binop(&self, op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        use std::cmp::Ordering::*;

        let ordered = |accept: &[std::cmp::Ordering]| -> Result<Value, EvalError> {
            Ok(Value::Boolean(
                left.partial_compare(right).is_some_and(|o| accept.contains(&o)),
            ))
        };

        match op {
            BinOp::Equal => Ok(Value::Boolean(left.loose_eq(right))),
            BinOp::NotEqual => Ok(Value::Boolean(!left.loose_eq(right))),
            BinOp::StrictEqual => Ok(Value::Boolean(left == right)),
            BinOp::StrictNotEqual => Ok(Value::Boolean(left != right)),
            BinOp::LessThan => ordered(&[Less]),
            BinOp::LessEqual => ordered(&[Less, Equal]),
            BinOp::GreaterThan => ordered(&[Greater]),
            BinOp::GreaterEqual => ordered(&[Greater, Equal]),
            BinOp::Add => match (left, right) {
                (Value::String(a), Value::String(b)) => Ok(Value::String(format!("{}{}", a, b))),
                _ => self.arithmetic(op, left, right),
            },
            BinOp::Subtract | BinOp::Multiply | BinOp::Divide | BinOp::Modulo => {
                self.arithmetic(op, left, right)
            }
            BinOp::And => Ok(Value::Boolean(left.as_bool() && right.as_bool())),
            BinOp::Or => Ok(Value::Boolean(left.as_bool() || right.as_bool())),
        }
    }

    fn arithmetic(&self, op: BinOp, left: &Value, right: &Value) -> Result<Value, EvalError> {
        match (left, right) {
            (Value::Integer(a), Value::Integer(b)) => integer_op(op, *a, *b),
            (Value::Float(a), Value::Float(b)) => float_op(op, *a, *b),
            (Value::Integer(a), Value::Float(b)) => mixed_op(op, Decimal::from_i64(*a), Decimal::from_f64(*b), *a as f64, *b),
            (Value::Float(a), Value::Integer(b)) => mixed_op(op, Decimal::from_f64(*a), Decimal::from_i64(*b), *a, *b as f64),
            (a, b) => Err(EvalError::TypeError(format!(
                "Cannot apply {} to {} and {}",
                symbol(op),
                a.type_name(),
                b.type_name()
            ))),
        }
    }
}

/// Integer negation, falling back to float when `-n` does not fit.
pub(crate) fn negate(n: i64) -> Value {
    n.checked_neg().map_or(Value::Float(-(n as f64)), Value::Integer)
}

fn symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Subtract => "-",
        BinOp::Multiply => "*",
        BinOp::Divide => "/",
        BinOp::Modulo => "%",
        _ => "operator",
    }
}

fn integer_op(op: BinOp, a: i64, b: i64) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => Ok(a.checked_add(b).map_or(Value::Float(a as f64 + b as f64), Value::Integer)),
        BinOp::Subtract => Ok(a.checked_sub(b).map_or(Value::Float(a as f64 - b as f64), Value::Integer)),
        BinOp::Multiply => Ok(a.checked_mul(b).map_or(Value::Float(a as f64 * b as f64), Value::Integer)),
        BinOp::Divide => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            match a.checked_rem(b) {
                Some(0) => Ok(a.checked_div(b).map_or(Value::Float(a as f64 / b as f64), Value::Integer)),
                _ => Ok(Value::Float(a as f64 / b as f64)),
            }
        }
        BinOp::Modulo => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            Ok(Value::Integer(a.checked_rem(b).unwrap_or(0)))
        }
        _ => unreachable!("not an arithmetic operator"),
    }
}

fn float_op(op: BinOp, a: f64, b: f64) -> Result<Value, EvalError> {
    match op {
        BinOp::Add => Ok(Value::Float(a + b)),
        BinOp::Subtract => Ok(Value::Float(a - b)),
        BinOp::Multiply => Ok(Value::Float(a * b)),
        BinOp::Divide | BinOp::Modulo if b == 0.0 => Err(EvalError::DivisionByZero),
        BinOp::Divide => Ok(Value::Float(a / b)),
        BinOp::Modulo => Ok(Value::Float(a % b)),
        _ => unreachable!("not an arithmetic operator"),
    }
}

/// Integer/float arithmetic through `Decimal`, so `1 + 0.5 + 0.5` stays exact
/// and whole results come back as integers.
fn mixed_op(
    op: BinOp,
    ad: Option<Decimal>,
    bd: Option<Decimal>,
    af: f64,
    bf: f64,
) -> Result<Value, EvalError> {
    if let Some(ad) = ad
        && let Some(bd) = bd
    {
        let rd = match op {
            BinOp::Add => Some(ad + bd),
            BinOp::Subtract => Some(ad - bd),
            BinOp::Multiply => ad.checked_mul(bd),
            BinOp::Divide | BinOp::Modulo if bd.is_zero() => return Err(EvalError::DivisionByZero),
            BinOp::Divide => ad.checked_div(bd),
            BinOp::Modulo => ad.checked_rem(bd),
            _ => None,
        };
        if let Some(rd) = rd {
            if rd.is_integer()
                && let Some(r) = rd.to_i64()
            {
                return Ok(Value::Integer(r));
            } else if let Some(r) = rd.to_f64() {
                return Ok(Value::Float(r));
            }
        }
    }
    float_op(op, af, bf)
}
