use std::{cmp::Ordering, sync::Arc};

use crate::{
    client::TableSource,
    error::QueryError,
    expression::GuestExpression,
    query::state::{
        Comparer, Direction, JoinSpec, OrderKey, QueryOptions, QueryState, Source,
    },
    value::Value,
};

/// Type names `of_type` checks with a dedicated built-in.
const TYPE_CHECKS: &[&str] = &[
    "array", "bool", "double", "float", "int", "integer", "long", "null", "numeric", "object",
    "real", "scalar", "string",
];

/// A deferred query over a table or a materialized sequence.
///
/// Clauses consume the query and return it with the clause recorded; nothing
/// runs until a terminal operation. Terminal operations borrow the query and
/// work on a copy of its state, so one query can be executed many times.
///
/// # Examples
///
/// ```
/// use tablinq::{Query, Value};
///
/// let query = Query::from_values((1..=6).map(Value::Integer))
///     .skip(2)
///     .take(2);
/// assert_eq!(query.to_vec().unwrap(), vec![Value::Integer(3), Value::Integer(4)]);
/// ```
#[derive(Debug, Clone)]
pub struct Query {
    pub(crate) state: QueryState,
}

impl Query {
    /// A query over a remote table.
    pub fn new(source: TableSource) -> Self {
        Query {
            state: QueryState::new(Source::Remote(source)),
        }
    }

    /// A query over values already in memory.
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        Query {
            state: QueryState::new(Source::Local(Arc::new(values.into_iter().collect()))),
        }
    }

    /// Rebinds the query to another table.
    #[doc(alias = "in")]
    pub fn source(mut self, source: TableSource) -> Self {
        self.state.source = Source::Remote(source);
        self
    }

    pub fn with_options(mut self, options: QueryOptions) -> Self {
        self.state.options = options;
        self
    }

    /// Accumulated clauses.
    pub fn state(&self) -> &QueryState {
        &self.state
    }

    /// Keeps records matching `predicate`. Replaces any earlier predicate.
    #[doc(alias = "where")]
    pub fn filter(mut self, predicate: &str) -> Result<Self, QueryError> {
        self.state.filter = Some(GuestExpression::parse(predicate)?);
        Ok(self)
    }

    pub fn take(mut self, n: usize) -> Self {
        self.state.take = Some(n);
        self
    }

    pub fn skip(mut self, n: usize) -> Self {
        self.state.skip = Some(n);
        self
    }

    /// Stops at the first record failing `predicate`.
    pub fn take_while(mut self, predicate: &str) -> Result<Self, QueryError> {
        self.state.take_while = Some(GuestExpression::parse(predicate)?);
        Ok(self)
    }

    /// Drops leading records while `predicate` holds.
    pub fn skip_while(mut self, predicate: &str) -> Result<Self, QueryError> {
        self.state.skip_while = Some(GuestExpression::parse(predicate)?);
        Ok(self)
    }

    pub fn order_by(self, key: &str) -> Result<Self, QueryError> {
        self.order(key, Direction::Ascending, None, true)
    }

    pub fn order_by_descending(self, key: &str) -> Result<Self, QueryError> {
        self.order(key, Direction::Descending, None, true)
    }

    /// Orders by `key` using a custom comparison of key values.
    pub fn order_by_with<F>(self, key: &str, comparer: F) -> Result<Self, QueryError>
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.order(key, Direction::Ascending, Some(Comparer::new(comparer)), true)
    }

    pub fn order_by_descending_with<F>(self, key: &str, comparer: F) -> Result<Self, QueryError>
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.order(key, Direction::Descending, Some(Comparer::new(comparer)), true)
    }

    pub fn then_by(self, key: &str) -> Result<Self, QueryError> {
        self.order(key, Direction::Ascending, None, false)
    }

    pub fn then_by_descending(self, key: &str) -> Result<Self, QueryError> {
        self.order(key, Direction::Descending, None, false)
    }

    pub fn then_by_with<F>(self, key: &str, comparer: F) -> Result<Self, QueryError>
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.order(key, Direction::Ascending, Some(Comparer::new(comparer)), false)
    }

    pub fn then_by_descending_with<F>(self, key: &str, comparer: F) -> Result<Self, QueryError>
    where
        F: Fn(&Value, &Value) -> Ordering + Send + Sync + 'static,
    {
        self.order(key, Direction::Descending, Some(Comparer::new(comparer)), false)
    }

    fn order(
        mut self,
        key: &str,
        direction: Direction,
        comparer: Option<Comparer>,
        primary: bool,
    ) -> Result<Self, QueryError> {
        let key = OrderKey {
            key: GuestExpression::parse(key)?,
            direction,
            comparer,
        };
        if primary {
            self.state.order.replace_primary(key);
        } else {
            self.state.order.push(key);
        }
        Ok(self)
    }

    /// Keeps the first record for each distinct value of `key`.
    pub fn distinct(mut self, key: &str) -> Result<Self, QueryError> {
        self.state.distinct = Some(GuestExpression::parse(key)?);
        Ok(self)
    }

    /// Keeps records of the named type.
    ///
    /// Scalar type names use the matching `is_*` check; any other name is
    /// matched against the record's `__type` field.
    pub fn of_type(mut self, type_name: &str) -> Result<Self, QueryError> {
        let lower = type_name.to_ascii_lowercase();
        let source = if TYPE_CHECKS.contains(&lower.as_str()) {
            format!("v => is_{lower}(v)")
        } else {
            let escaped = type_name.replace('\\', "\\\\").replace('"', "\\\"");
            format!("v => is_a(v, \"{escaped}\")")
        };
        self.state.of_type = Some(GuestExpression::parse(&source)?);
        Ok(self)
    }

    /// Starts a join with `name`. Joins are recorded but never executable.
    pub fn join(self, name: &str) -> JoinBuilder {
        JoinBuilder {
            query: self,
            name: name.to_string(),
        }
    }
}

/// A join awaiting its condition.
#[derive(Debug)]
pub struct JoinBuilder {
    query: Query,
    name: String,
}

impl JoinBuilder {
    pub fn on(mut self, condition: &str) -> Result<Query, QueryError> {
        let condition = GuestExpression::parse(condition)?;
        self.query.state.joins.push(JoinSpec {
            name: self.name,
            condition,
        });
        Ok(self.query)
    }
}
