use serde_json::{Map, Value};
use sqlx::{self, postgres::PgArguments};
use thiserror::Error;

use crate::database::tables::TableSpec;
use crate::filter::{FilterPredicate, QueryDescriptor};

/// Keys starting with this prefix carry request metadata (e.g. `_token`), never columns.
pub const RESERVED_PREFIX: char = '_';

#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    #[error("Unknown column '{column}' for table '{table}'")]
    UnknownColumn { table: &'static str, column: String },
}

/// Hands out `$n` placeholders while collecting their values in order.
struct Placeholders {
    params: Vec<Value>,
}

impl Placeholders {
    fn new() -> Self {
        Self { params: vec![] }
    }

    fn param(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("${}", self.params.len())
    }

    /// A JSON `null` is written as the `NULL` literal and takes no placeholder.
    /// A bound NULL would carry a parameter type that may not match the column.
    fn value(&mut self, value: Value) -> String {
        if value.is_null() {
            "NULL".to_string()
        } else {
            self.param(value)
        }
    }
}

fn check_column(table: &TableSpec, column: &str) -> Result<(), QueryError> {
    if table.has_column(column) {
        Ok(())
    } else {
        Err(QueryError::UnknownColumn {
            table: table.name,
            column: column.to_string(),
        })
    }
}

fn column_list(table: &TableSpec, columns: &[&str]) -> Result<String, QueryError> {
    if columns.is_empty() {
        return Ok("*".to_string());
    }
    for column in columns {
        check_column(table, column)?;
    }
    Ok(columns.join(", "))
}

/// `SELECT cols FROM table [WHERE p1 AND p2 ...]`
///
/// One placeholder per predicate, numbered from `$1` on every call.
pub fn build_select(
    predicates: &[FilterPredicate],
    select_columns: &[&str],
    table: &TableSpec,
) -> Result<QueryDescriptor, QueryError> {
    let select_clause = column_list(table, select_columns)?;

    let mut placeholders = Placeholders::new();
    let mut conditions = Vec::with_capacity(predicates.len());
    for predicate in predicates {
        check_column(table, predicate.column())?;
        let placeholder = placeholders.param(predicate.param());
        conditions.push(format!("{} {} {}", predicate.column(), predicate.sql_operator(), placeholder));
    }

    let mut query = format!("SELECT {} FROM {}", select_clause, table.name);
    if !conditions.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&conditions.join(" AND "));
    }

    tracing::debug!("Built select: {}", query);
    Ok(QueryDescriptor::new(query, placeholders.params))
}

/// `SELECT cols FROM table WHERE key=$1`
pub fn build_select_by_key(
    table: &TableSpec,
    select_columns: &[&str],
    key_column: &str,
    key_value: Value,
) -> Result<QueryDescriptor, QueryError> {
    let select_clause = column_list(table, select_columns)?;
    check_column(table, key_column)?;

    let query = format!("SELECT {} FROM {} WHERE {}=$1", select_clause, table.name, key_column);
    Ok(QueryDescriptor::new(query, vec![key_value]))
}

/// `DELETE FROM table WHERE key=$1 RETURNING key`
///
/// The returned key doubles as the deleted-row count.
pub fn build_delete(
    table: &TableSpec,
    key_column: &str,
    key_value: Value,
) -> Result<QueryDescriptor, QueryError> {
    check_column(table, key_column)?;

    let query = format!("DELETE FROM {} WHERE {}=$1 RETURNING {}", table.name, key_column, key_column);
    tracing::debug!("Built delete: {}", query);
    Ok(QueryDescriptor::new(query, vec![key_value]))
}

/// `INSERT INTO table (cols) VALUES ($1, ...) RETURNING cols`
///
/// Null values are written as `NULL` and consume no placeholder.
///
/// An empty `values` map produces `INSERT INTO table () VALUES ()`, which the
/// database rejects; callers validate required fields before building.
pub fn build_insert(
    values: &Map<String, Value>,
    table: &TableSpec,
    returning_columns: &[&str],
) -> Result<QueryDescriptor, QueryError> {
    let mut placeholders = Placeholders::new();
    let mut columns = Vec::with_capacity(values.len());
    let mut indices = Vec::with_capacity(values.len());

    for (column, value) in values {
        check_column(table, column)?;
        columns.push(column.as_str());
        indices.push(placeholders.value(value.clone()));
    }
    for column in returning_columns {
        check_column(table, column)?;
    }

    let query = format!(
        "INSERT INTO {} ({}) VALUES ({}) RETURNING {}",
        table.name,
        columns.join(", "),
        indices.join(", "),
        returning_columns.join(", ")
    );

    tracing::debug!("Built insert: {}", query);
    Ok(QueryDescriptor::new(query, placeholders.params))
}

/// `UPDATE table SET c1=$1, ... WHERE key=$n RETURNING *`
///
/// Keys starting with [`RESERVED_PREFIX`] are dropped before the SET list is built.
/// Null values are written as `col=NULL` and consume no placeholder.
/// An empty `values` map leaves the SET list empty; the WHERE clause still binds
/// only the key value.
pub fn build_partial_update(
    table: &TableSpec,
    values: &Map<String, Value>,
    key_column: &str,
    key_value: Value,
) -> Result<QueryDescriptor, QueryError> {
    check_column(table, key_column)?;

    let mut placeholders = Placeholders::new();
    let mut assignments = Vec::with_capacity(values.len());
    for (column, value) in values {
        if column.starts_with(RESERVED_PREFIX) {
            continue;
        }
        check_column(table, column)?;
        assignments.push(format!("{}={}", column, placeholders.value(value.clone())));
    }
    let key_placeholder = placeholders.param(key_value);

    let query = format!(
        "UPDATE {} SET {} WHERE {}={} RETURNING *",
        table.name,
        assignments.join(", "),
        key_column,
        key_placeholder
    );

    tracing::debug!("Built partial update: {}", query);
    Ok(QueryDescriptor::new(query, placeholders.params))
}

/// Bind a JSON scalar onto a sqlx query
pub(crate) fn bind_param<'q>(
    q: sqlx::query::Query<'q, sqlx::Postgres, PgArguments>,
    v: &'q Value,
) -> sqlx::query::Query<'q, sqlx::Postgres, PgArguments> {
    match v {
        Value::Null => {
            let none: Option<String> = None;
            q.bind(none)
        }
        Value::Bool(b) => q.bind(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                q.bind(i)
            } else if let Some(f) = n.as_f64() {
                q.bind(f)
            } else {
                q.bind(n.to_string())
            }
        }
        Value::String(s) => q.bind(s.as_str()),
        Value::Array(_) | Value::Object(_) => q.bind(v.clone()),
    }
}
