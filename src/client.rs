//! The remote store boundary.
//!
//! A [`TableClient`] executes one [`TableQuery`] and returns the matching
//! records in store order. [`MemoryTableClient`] is a complete in-process
//! store: it applies partition selection and evaluates the pushed-down filter
//! with [`grammar`](crate::filter::grammar), so queries behave as they would
//! against a real table service.

use std::{collections::BTreeMap, sync::Arc};

use log::debug;
use parking_lot::Mutex;
use thiserror::Error;

use crate::{
    filter::{CompiledFilter, grammar},
    value::Value,
};

/// Field holding a record's partition.
pub const PARTITION_KEY: &str = "PartitionKey";

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ClientError {
    #[error("no such table: '{0}'")]
    NoSuchTable(String),

    #[error("invalid filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("backend failure: {0}")]
    Backend(String),
}

/// One request to the remote store.
#[derive(Debug, Clone, PartialEq)]
pub struct TableQuery {
    pub table: String,
    pub filter: Option<CompiledFilter>,
    pub partition: Option<String>,
}

impl TableQuery {
    pub fn new(table: impl Into<String>) -> Self {
        TableQuery {
            table: table.into(),
            filter: None,
            partition: None,
        }
    }
}

/// Executes table queries.
pub trait TableClient: Send + Sync {
    fn retrieve_entities(&self, query: &TableQuery) -> Result<Vec<Value>, ClientError>;
}

/// A table on some client, plus the partition to read.
#[derive(Clone)]
pub struct TableSource {
    client: Arc<dyn TableClient>,
    table: String,
    partition: Option<String>,
}

impl TableSource {
    pub fn new(client: Arc<dyn TableClient>, table: impl Into<String>) -> Self {
        TableSource {
            client,
            table: table.into(),
            partition: None,
        }
    }

    /// Restricts reads to one partition.
    pub fn partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = Some(partition.into());
        self
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn partition_key(&self) -> Option<&str> {
        self.partition.as_deref()
    }

    /// A request for this table with no filter yet.
    pub fn query(&self) -> TableQuery {
        TableQuery {
            table: self.table.clone(),
            filter: None,
            partition: self.partition.clone(),
        }
    }

    pub fn fetch(&self, query: &TableQuery) -> Result<Vec<Value>, ClientError> {
        self.client.retrieve_entities(query)
    }
}

impl std::fmt::Debug for TableSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TableSource")
            .field("table", &self.table)
            .field("partition", &self.partition)
            .finish_non_exhaustive()
    }
}

/// In-memory table store.
///
/// Every request is recorded and can be read back with
/// [`MemoryTableClient::requests`].
#[derive(Debug, Default)]
pub struct MemoryTableClient {
    tables: BTreeMap<String, Vec<Value>>,
    requests: Mutex<Vec<TableQuery>>,
}

impl MemoryTableClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) a table.
    pub fn with_table(mut self, name: impl Into<String>, rows: Vec<Value>) -> Self {
        self.tables.insert(name.into(), rows);
        self
    }

    /// Loads tables from JSON.
    ///
    /// An array becomes a single table called `default_table`; an object maps
    /// table names to arrays of records.
    pub fn from_json(json: serde_json::Value, default_table: &str) -> Result<Self, ClientError> {
        let mut client = MemoryTableClient::new();
        match json {
            serde_json::Value::Array(rows) => {
                client
                    .tables
                    .insert(default_table.to_string(), rows.into_iter().map(Value::from).collect());
            }
            serde_json::Value::Object(tables) => {
                for (name, rows) in tables {
                    let serde_json::Value::Array(rows) = rows else {
                        return Err(ClientError::Backend(format!(
                            "table '{name}' must be an array of records"
                        )));
                    };
                    client
                        .tables
                        .insert(name, rows.into_iter().map(Value::from).collect());
                }
            }
            _ => {
                return Err(ClientError::Backend(
                    "expected an array of records or an object of tables".to_string(),
                ));
            }
        }
        Ok(client)
    }

    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }

    /// Requests issued so far, oldest first.
    pub fn requests(&self) -> Vec<TableQuery> {
        self.requests.lock().clone()
    }
}

impl TableClient for MemoryTableClient {
    fn retrieve_entities(&self, query: &TableQuery) -> Result<Vec<Value>, ClientError> {
        self.requests.lock().push(query.clone());

        let rows = self
            .tables
            .get(&query.table)
            .ok_or_else(|| ClientError::NoSuchTable(query.table.clone()))?;

        let filter = match &query.filter {
            Some(text) => Some(grammar::parse(text.as_str()).map_err(|e| {
                ClientError::InvalidFilter {
                    filter: text.to_string(),
                    reason: e.to_string(),
                }
            })?),
            None => None,
        };

        let mut out = Vec::new();
        for row in rows {
            if let Some(partition) = &query.partition
                && row.get(PARTITION_KEY) != Some(&Value::String(partition.clone()))
            {
                continue;
            }
            if let Some(filter) = &filter {
                let keep = filter.matches(row).map_err(|e| ClientError::InvalidFilter {
                    filter: query.filter.as_ref().map(ToString::to_string).unwrap_or_default(),
                    reason: e.to_string(),
                })?;
                if !keep {
                    continue;
                }
            }
            out.push(row.clone());
        }

        debug!(
            "table '{}' returned {} of {} record(s)",
            query.table,
            out.len(),
            rows.len()
        );
        Ok(out)
    }
}
