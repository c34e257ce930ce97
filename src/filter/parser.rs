use serde_json::{Map, Value};

use super::error::FilterError;
use super::types::{FilterPredicate, FilterVerb};

/// Turns `{verb}_{column}` keys into [`FilterPredicate`]s.
pub struct FilterParser;

impl FilterParser {
    /// Parse every entry of a filter mapping, keeping the mapping's order.
    /// Entries that are absent, null, or use an unknown verb are skipped.
    pub fn parse_filters(filters: &Map<String, Value>) -> Result<Vec<FilterPredicate>, FilterError> {
        let mut predicates = Vec::with_capacity(filters.len());
        for (key, value) in filters {
            if let Some(predicate) = Self::parse_filter(key, value)? {
                predicates.push(predicate);
            }
        }
        Ok(predicates)
    }

    pub fn parse_filter(key: &str, value: &Value) -> Result<Option<FilterPredicate>, FilterError> {
        if value.is_null() {
            return Ok(None);
        }

        let Some((prefix, column)) = key.split_once('_') else {
            return Ok(None);
        };
        let Some(verb) = FilterVerb::from_key_prefix(prefix) else {
            tracing::debug!("Ignoring filter '{}' with unknown verb '{}'", key, prefix);
            return Ok(None);
        };
        if column.is_empty() {
            return Err(FilterError::InvalidColumn(format!("Filter '{}' names no column", key)));
        }

        let column = column.to_string();
        let predicate = match verb {
            FilterVerb::Search => FilterPredicate::Substring {
                column,
                pattern: Self::search_pattern(key, value)?,
            },
            FilterVerb::Min => FilterPredicate::AtLeast {
                column,
                value: Self::bound(key, value)?,
            },
            FilterVerb::Max => FilterPredicate::AtMost {
                column,
                value: Self::bound(key, value)?,
            },
        };
        Ok(Some(predicate))
    }

    fn search_pattern(key: &str, value: &Value) -> Result<String, FilterError> {
        match value {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(n.to_string()),
            other => Err(FilterError::InvalidFilterValue {
                key: key.to_string(),
                reason: format!("expected text, got {}", other),
            }),
        }
    }

    fn bound(key: &str, value: &Value) -> Result<serde_json::Number, FilterError> {
        match value {
            Value::Number(n) => Ok(n.clone()),
            other => Err(FilterError::InvalidFilterValue {
                key: key.to_string(),
                reason: format!("expected a number, got {}", other),
            }),
        }
    }
}
