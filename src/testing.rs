//! In-memory [`QueryExecutor`] for unit and integration tests.
//!
//! Enabled for this crate's own tests and, through the `testing` feature, for
//! the integration tests under `tests/`.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use serde_json::Value;

use crate::database::executor::{QueryExecutor, Row};
use crate::database::manager::DatabaseError;
use crate::filter::QueryDescriptor;

/// Answers each statement with the next scripted row set and records every
/// descriptor it was asked to run. An empty script answers with no rows.
#[derive(Default)]
pub struct ScriptedExecutor {
    responses: Mutex<VecDeque<Vec<Row>>>,
    seen: Mutex<Vec<QueryDescriptor>>,
    unreachable: bool,
}

impl ScriptedExecutor {
    pub fn new(responses: Vec<Vec<Value>>) -> Self {
        let executor = Self::default();
        for rows in responses {
            executor.push(rows);
        }
        executor
    }

    /// Every ping fails, as if the database were down
    pub fn unreachable() -> Self {
        Self {
            unreachable: true,
            ..Self::default()
        }
    }

    /// Queue the rows for the next statement. Non-object values are skipped.
    pub fn push(&self, rows: Vec<Value>) {
        let rows = rows
            .into_iter()
            .filter_map(|v| match v {
                Value::Object(map) => Some(map),
                _ => None,
            })
            .collect();
        self.responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push_back(rows);
    }

    pub fn seen(&self) -> Vec<QueryDescriptor> {
        self.seen.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

#[async_trait]
impl QueryExecutor for ScriptedExecutor {
    async fn fetch_rows(&self, descriptor: &QueryDescriptor) -> Result<Vec<Row>, DatabaseError> {
        self.seen
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(descriptor.clone());
        let next = self
            .responses
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .pop_front();
        Ok(next.unwrap_or_default())
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        if self.unreachable {
            return Err(DatabaseError::QueryError("connection refused".to_string()));
        }
        Ok(())
    }
}
