//! Run a query against JSON tables

use std::sync::Arc;

use log::info;

use crate::{MemoryTableClient, Query, QueryOptions, TableSource, Value};

use super::CliError;

/// Table name used when the data is a bare array.
pub const DEFAULT_TABLE: &str = "records";

/// Prefix marking a descending `--order-by` key.
const DESCENDING: &str = "desc:";

/// Options for the query command
#[derive(Debug, Clone)]
pub struct QueryCommand {
    /// JSON text: an array of records or an object of tables
    pub data: Option<String>,
    pub table: Option<String>,
    pub partition: Option<String>,
    pub filter: Option<String>,
    pub of_type: Option<String>,
    pub distinct: Option<String>,
    /// Sort keys in precedence order; `desc:` marks a descending key
    pub order_by: Vec<String>,
    pub skip: Option<usize>,
    pub take: Option<usize>,
    pub skip_while: Option<String>,
    pub take_while: Option<String>,
    pub select: Option<String>,
    /// Print the number of results instead of the results
    pub count: bool,
    pub pushdown: bool,
}

impl Default for QueryCommand {
    fn default() -> Self {
        QueryCommand {
            data: None,
            table: None,
            partition: None,
            filter: None,
            of_type: None,
            distinct: None,
            order_by: Vec::new(),
            skip: None,
            take: None,
            skip_while: None,
            take_while: None,
            select: None,
            count: false,
            pushdown: true,
        }
    }
}

/// Result of a query command
#[derive(Debug, Clone, PartialEq)]
pub enum QueryOutput {
    Count(usize),
    Results(serde_json::Value),
}

/// Build the query described by `command` and execute it
pub fn execute_query(command: &QueryCommand) -> Result<QueryOutput, CliError> {
    let data = command.data.as_ref().ok_or(CliError::NoInput)?;
    let json: serde_json::Value = serde_json::from_str(data)?;

    let table = command.table.as_deref().unwrap_or(DEFAULT_TABLE);
    let client = Arc::new(MemoryTableClient::from_json(json, table)?);
    let mut source = TableSource::new(client, table);
    if let Some(partition) = &command.partition {
        source = source.partition(partition.clone());
    }

    let query = build(command, Query::new(source))?;
    info!("running query on table '{table}'");

    if command.count {
        return Ok(QueryOutput::Count(query.count()?));
    }

    let results = match &command.select {
        Some(selector) => query.select(selector)?,
        None => query.to_vec()?,
    };
    Ok(QueryOutput::Results(to_json(results)))
}

fn build(command: &QueryCommand, mut query: Query) -> Result<Query, CliError> {
    query = query.with_options(QueryOptions {
        pushdown: command.pushdown,
    });

    if let Some(predicate) = &command.filter {
        query = query.filter(predicate)?;
    }
    if let Some(type_name) = &command.of_type {
        query = query.of_type(type_name)?;
    }
    if let Some(key) = &command.distinct {
        query = query.distinct(key)?;
    }
    for (i, key) in command.order_by.iter().enumerate() {
        let key = key.trim();
        query = match (i, key.strip_prefix(DESCENDING).map(str::trim)) {
            (0, Some(key)) => query.order_by_descending(key)?,
            (0, None) => query.order_by(key)?,
            (_, Some(key)) => query.then_by_descending(key)?,
            (_, None) => query.then_by(key)?,
        };
    }
    if let Some(predicate) = &command.skip_while {
        query = query.skip_while(predicate)?;
    }
    if let Some(predicate) = &command.take_while {
        query = query.take_while(predicate)?;
    }
    if let Some(n) = command.skip {
        query = query.skip(n);
    }
    if let Some(n) = command.take {
        query = query.take(n);
    }
    Ok(query)
}

fn to_json(values: Vec<Value>) -> serde_json::Value {
    serde_json::Value::Array(values.into_iter().map(serde_json::Value::from).collect())
}
