use std::{cmp::Ordering, sync::Arc};

use crate::{client::TableSource, expression::GuestExpression, value::Value};

/// Where a query reads its records from.
#[derive(Debug, Clone)]
pub enum Source {
    /// A table on a remote client; the where-clause may be pushed down.
    Remote(TableSource),
    /// An already materialized sequence; everything runs locally.
    Local(Arc<Vec<Value>>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// A caller-supplied ordering for one sort key.
#[derive(Clone)]
pub struct Comparer(Arc<dyn Fn(&Value, &Value) -> Ordering + Send + Sync>);

impl Comparer {
    pub fn new(f: impl Fn(&Value, &Value) -> Ordering + Send + Sync + 'static) -> Self {
        Comparer(Arc::new(f))
    }

    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        (self.0)(a, b)
    }
}

impl std::fmt::Debug for Comparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Comparer(..)")
    }
}

#[derive(Debug, Clone)]
pub struct OrderKey {
    pub key: GuestExpression,
    pub direction: Direction,
    pub comparer: Option<Comparer>,
}

impl OrderKey {
    /// Compares two already computed key values.
    pub fn compare(&self, a: &Value, b: &Value) -> Ordering {
        let ordering = match &self.comparer {
            Some(comparer) => comparer.compare(a, b),
            None => a.sort_compare(b),
        };
        match self.direction {
            Direction::Ascending => ordering,
            Direction::Descending => ordering.reverse(),
        }
    }
}

/// Sort keys in precedence order.
#[derive(Debug, Clone, Default)]
pub struct OrderSpec {
    keys: Vec<OrderKey>,
}

impl OrderSpec {
    /// Sets the primary key, keeping any secondary keys.
    pub fn replace_primary(&mut self, key: OrderKey) {
        match self.keys.first_mut() {
            Some(first) => *first = key,
            None => self.keys.push(key),
        }
    }

    /// Appends a tie-breaking key.
    pub fn push(&mut self, key: OrderKey) {
        self.keys.push(key);
    }

    pub fn keys(&self) -> &[OrderKey] {
        &self.keys
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Composite comparison over per-key values: the first key that tells the
    /// rows apart decides.
    pub fn compare(&self, a: &[Value], b: &[Value]) -> Ordering {
        self.keys
            .iter()
            .zip(a.iter().zip(b))
            .fold(Ordering::Equal, |acc, (key, (ka, kb))| {
                acc.then_with(|| key.compare(ka, kb))
            })
    }
}

/// A requested join. Recorded so execution can refuse it.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub name: String,
    pub condition: GuestExpression,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryOptions {
    /// Compile eligible where-clauses into remote filters.
    pub pushdown: bool,
}

impl Default for QueryOptions {
    fn default() -> Self {
        QueryOptions { pushdown: true }
    }
}

/// Everything a query has accumulated before execution.
#[derive(Debug, Clone)]
pub struct QueryState {
    pub source: Source,
    pub filter: Option<GuestExpression>,
    pub of_type: Option<GuestExpression>,
    pub distinct: Option<GuestExpression>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub skip_while: Option<GuestExpression>,
    pub take_while: Option<GuestExpression>,
    pub order: OrderSpec,
    pub joins: Vec<JoinSpec>,
    pub options: QueryOptions,
}

impl QueryState {
    pub fn new(source: Source) -> Self {
        QueryState {
            source,
            filter: None,
            of_type: None,
            distinct: None,
            skip: None,
            take: None,
            skip_while: None,
            take_while: None,
            order: OrderSpec::default(),
            joins: Vec::new(),
            options: QueryOptions::default(),
        }
    }
}
