//! Operations that execute a query.

use crate::{
    ast::BinOp,
    error::QueryError,
    evaluator::{EvalError, Evaluator},
    expression::GuestExpression,
    query::{Query, pipeline, state::QueryState},
    value::Value,
};

impl Query {
    fn run(&self, state: &QueryState) -> Result<Vec<Value>, QueryError> {
        pipeline::execute(state, None)
    }

    /// Executes the query and projects each result through `selector`.
    pub fn select(&self, selector: &str) -> Result<Vec<Value>, QueryError> {
        let selector = GuestExpression::parse(selector)?;
        pipeline::execute(&self.state, Some(&selector))
    }

    /// Executes the query, returning the results unprojected.
    pub fn to_vec(&self) -> Result<Vec<Value>, QueryError> {
        self.run(&self.state)
    }

    pub fn count(&self) -> Result<usize, QueryError> {
        Ok(self.to_vec()?.len())
    }

    /// Sum of `selector` over the results; `0` when there are none.
    pub fn sum(&self, selector: &str) -> Result<Value, QueryError> {
        sum_values(&self.select(selector)?)
    }

    pub fn min(&self, selector: &str) -> Result<Option<Value>, QueryError> {
        Ok(self
            .select(selector)?
            .into_iter()
            .reduce(|best, v| if v.sort_compare(&best).is_lt() { v } else { best }))
    }

    pub fn max(&self, selector: &str) -> Result<Option<Value>, QueryError> {
        Ok(self
            .select(selector)?
            .into_iter()
            .reduce(|best, v| if v.sort_compare(&best).is_gt() { v } else { best }))
    }

    /// Arithmetic mean of `selector`; `None` when there are no results.
    pub fn average(&self, selector: &str) -> Result<Option<Value>, QueryError> {
        let values = self.select(selector)?;
        if values.is_empty() {
            return Ok(None);
        }
        let total = sum_values(&values)?.as_float().unwrap_or_default();
        Ok(Some(Value::Float(total / values.len() as f64)))
    }

    pub fn first(&self) -> Result<Option<Value>, QueryError> {
        let mut state = self.state.clone();
        state.take = Some(state.take.map_or(1, |n| n.min(1)));
        Ok(self.run(&state)?.into_iter().next())
    }

    pub fn first_or_default(&self, default: Value) -> Result<Value, QueryError> {
        Ok(self.first()?.unwrap_or(default))
    }

    pub fn last(&self) -> Result<Option<Value>, QueryError> {
        Ok(self.to_vec()?.pop())
    }

    pub fn last_or_default(&self, default: Value) -> Result<Value, QueryError> {
        Ok(self.last()?.unwrap_or(default))
    }

    /// The only result, `None` when empty.
    ///
    /// Fails with [`QueryError::NotSingle`] when there is more than one.
    pub fn single(&self) -> Result<Option<Value>, QueryError> {
        let mut state = self.state.clone();
        state.take = Some(state.take.map_or(2, |n| n.min(2)));
        let mut results = self.run(&state)?;
        if results.len() > 1 {
            return Err(QueryError::NotSingle);
        }
        Ok(results.pop())
    }

    pub fn single_or_default(&self, default: Value) -> Result<Value, QueryError> {
        Ok(self.single()?.unwrap_or(default))
    }

    /// Element at `index`, ignoring the where-clause.
    pub fn element_at(&self, index: usize) -> Result<Option<Value>, QueryError> {
        let mut state = self.state.clone();
        state.filter = None;
        state.take = Some(1);
        state.skip = Some(index);
        Ok(self.run(&state)?.into_iter().next())
    }

    pub fn element_at_or_default(&self, index: usize, default: Value) -> Result<Value, QueryError> {
        Ok(self.element_at(index)?.unwrap_or(default))
    }

    /// True when any result satisfies `predicate`.
    ///
    /// When nothing but ordering and the type filter shape the results, the
    /// predicate becomes the where-clause, so a remote table can answer it
    /// with a filtered request. Otherwise it is checked against the results.
    pub fn any(&self, predicate: &str) -> Result<bool, QueryError> {
        let predicate = GuestExpression::parse(predicate)?;
        let state = &self.state;
        let unshaped = state.filter.is_none()
            && state.distinct.is_none()
            && state.skip.is_none()
            && state.take.is_none()
            && state.skip_while.is_none()
            && state.take_while.is_none();
        if unshaped {
            let mut state = state.clone();
            state.filter = Some(predicate);
            state.take = Some(1);
            return Ok(!self.run(&state)?.is_empty());
        }

        let evaluator = Evaluator::new();
        for value in self.to_vec()? {
            if evaluator.test(&predicate, &value)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// True when every result satisfies `predicate`.
    pub fn all(&self, predicate: &str) -> Result<bool, QueryError> {
        let predicate = GuestExpression::parse(predicate)?;
        let evaluator = Evaluator::new();
        for value in self.to_vec()? {
            if !evaluator.test(&predicate, &value)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// True when a result equals `element` (integers and floats compare by value).
    pub fn contains(&self, element: &Value) -> Result<bool, QueryError> {
        Ok(self.to_vec()?.iter().any(|v| v.loose_eq(element)))
    }

    /// Folds the results with `(acc, value) => ...`, starting from `seed`.
    pub fn aggregate(&self, seed: Value, folder: &str) -> Result<Value, QueryError> {
        let folder = GuestExpression::parse(folder)?;
        let evaluator = Evaluator::new();
        let mut acc = seed;
        for value in self.to_vec()? {
            acc = evaluator.apply(&folder, &[&acc, &value])?;
        }
        Ok(acc)
    }

    /// Materializes the results in reverse order as a new local query.
    pub fn reverse(&self) -> Result<Query, QueryError> {
        let mut results = self.to_vec()?;
        results.reverse();
        Ok(Query::from_values(results).with_options(self.state.options))
    }

    /// Materializes the results followed by `other` as a new local query.
    pub fn concat(&self, other: impl IntoIterator<Item = Value>) -> Result<Query, QueryError> {
        let mut results = self.to_vec()?;
        results.extend(other);
        Ok(Query::from_values(results).with_options(self.state.options))
    }
}

fn sum_values(values: &[Value]) -> Result<Value, QueryError> {
    let evaluator = Evaluator::new();
    let mut total = Value::Integer(0);
    for value in values {
        if !value.is_numeric() {
            return Err(EvalError::TypeError(format!("Cannot sum {}", value.type_name())).into());
        }
        total = evaluator.apply_binop(BinOp::Add, &total, value)?;
    }
    Ok(total)
}
