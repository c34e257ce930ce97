use std::time::Instant;

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Row as _};

use crate::database::manager::DatabaseError;
use crate::database::query_builder::bind_param;
use crate::filter::QueryDescriptor;

/// A result row, keyed by column name
pub type Row = Map<String, Value>;

/// Runs query descriptors against the backing store.
///
/// Every statement is expected to produce rows: mutations use `RETURNING`, so the
/// number of rows returned doubles as the affected-row count.
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn fetch_rows(&self, descriptor: &QueryDescriptor) -> Result<Vec<Row>, DatabaseError>;

    /// Cheap connectivity check used by `/health`
    async fn ping(&self) -> Result<(), DatabaseError>;
}

/// PostgreSQL executor over a shared pool
#[derive(Clone)]
pub struct PgExecutor {
    pool: PgPool,
    log_queries: bool,
}

impl PgExecutor {
    pub fn new(pool: PgPool, log_queries: bool) -> Self {
        Self { pool, log_queries }
    }

    pub fn logs_queries(&self) -> bool {
        self.log_queries
    }
}

#[async_trait]
impl QueryExecutor for PgExecutor {
    async fn fetch_rows(&self, descriptor: &QueryDescriptor) -> Result<Vec<Row>, DatabaseError> {
        // Wrapping in a CTE lets INSERT/UPDATE/DELETE ... RETURNING go through row_to_json too
        let sql = format!("WITH t AS ({}) SELECT row_to_json(t) AS row FROM t", descriptor.query);

        let mut q = sqlx::query(&sql);
        for p in descriptor.params.iter() {
            q = bind_param(q, p);
        }

        let started = Instant::now();
        let rows = q.fetch_all(&self.pool).await?;
        if self.log_queries {
            tracing::info!(
                elapsed_ms = started.elapsed().as_millis() as u64,
                rows = rows.len(),
                "{}",
                descriptor.query
            );
        }

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            match row.try_get::<Value, _>("row")? {
                Value::Object(map) => out.push(map),
                other => {
                    return Err(DatabaseError::QueryError(format!("unexpected row shape: {}", other)))
                }
            }
        }
        Ok(out)
    }

    async fn ping(&self) -> Result<(), DatabaseError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
