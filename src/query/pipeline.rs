use std::collections::HashSet;

use log::{debug, trace, warn};

use crate::{
    error::QueryError,
    evaluator::Evaluator,
    expression::GuestExpression,
    filter::{self, Eligibility},
    query::state::{QueryState, Source},
    value::Value,
};

/// Records as fetched, plus whether the where-clause already ran remotely.
struct Fetched {
    rows: Vec<Value>,
    filtered: bool,
}

/// Runs a query: push-down, fetch, sort, residual filtering, windowing and
/// projection, in that order.
pub(crate) fn execute(
    state: &QueryState,
    selector: Option<&GuestExpression>,
) -> Result<Vec<Value>, QueryError> {
    let evaluator = Evaluator::new();
    let Fetched { rows, filtered } = fetch(state)?;
    let fetched = rows.len();

    let rows = sort(state, rows, &evaluator)?;

    let mut out = Vec::new();
    if state.take == Some(0) {
        return Ok(out);
    }

    let mut seen: HashSet<String> = HashSet::new();
    let mut skipping = state.skip_while.is_some();
    // Every record that survives the filters advances the window, including
    // the ones skip_while and skip drop.
    let mut position = 0usize;

    for row in rows {
        if let Some(of_type) = &state.of_type
            && !evaluator.test(of_type, &row)?
        {
            continue;
        }
        if !filtered
            && let Some(predicate) = &state.filter
            && !evaluator.test(predicate, &row)?
        {
            continue;
        }
        if let Some(key) = &state.distinct
            && !seen.insert(evaluator.call(key, &row)?.canonical())
        {
            continue;
        }

        let mut dropped = false;
        if skipping {
            match &state.skip_while {
                Some(predicate) if evaluator.test(predicate, &row)? => dropped = true,
                _ => skipping = false,
            }
        }
        if let Some(skip) = state.skip
            && position < skip
        {
            dropped = true;
        }
        if let Some(predicate) = &state.take_while
            && !evaluator.test(predicate, &row)?
        {
            break;
        }
        position += 1;
        if dropped {
            continue;
        }

        out.push(row);
        if let Some(take) = state.take
            && out.len() >= take
        {
            break;
        }
    }

    trace!("fetched {} record(s), {} after residual pass", fetched, out.len());

    match selector {
        Some(selector) => out
            .iter()
            .map(|row| evaluator.call(selector, row).map_err(QueryError::from))
            .collect(),
        None => Ok(out),
    }
}

fn fetch(state: &QueryState) -> Result<Fetched, QueryError> {
    reject_joins(state)?;
    match &state.source {
        Source::Remote(table) => {
            let mut request = table.query();
            let mut filtered = false;

            if let Some(predicate) = &state.filter {
                if !state.options.pushdown {
                    debug!("push-down disabled, evaluating `{predicate}` locally");
                } else {
                    match filter::classify(predicate) {
                        Eligibility::Remote => {
                            let compiled = filter::compile(predicate)?;
                            debug!("pushing down `{predicate}` as `{compiled}`");
                            request.filter = Some(compiled);
                            filtered = true;
                        }
                        Eligibility::Local(reason) => {
                            debug!("evaluating `{predicate}` locally: {reason}");
                        }
                    }
                }
            }

            let rows = table.fetch(&request)?;
            Ok(Fetched { rows, filtered })
        }
        Source::Local(rows) => Ok(Fetched {
            rows: rows.as_ref().clone(),
            filtered: false,
        }),
    }
}

fn reject_joins(state: &QueryState) -> Result<(), QueryError> {
    if let Some(join) = state.joins.first() {
        warn!("rejecting join with '{}' on `{}`", join.name, join.condition);
        return Err(QueryError::UnsupportedOperation(format!(
            "join with '{}' is not supported",
            join.name
        )));
    }
    Ok(())
}

/// Stable sort on precomputed keys, so equal rows keep arrival order.
fn sort(state: &QueryState, rows: Vec<Value>, evaluator: &Evaluator) -> Result<Vec<Value>, QueryError> {
    if state.order.is_empty() {
        return Ok(rows);
    }

    let mut keyed = Vec::with_capacity(rows.len());
    for row in rows {
        let keys = state
            .order
            .keys()
            .iter()
            .map(|k| evaluator.call(&k.key, &row))
            .collect::<Result<Vec<_>, _>>()?;
        keyed.push((keys, row));
    }

    keyed.sort_by(|(a, _), (b, _)| state.order.compare(a, b));
    Ok(keyed.into_iter().map(|(_, row)| row).collect())
}
