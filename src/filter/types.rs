use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Comparison requested by the verb half of a `{verb}_{column}` filter key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterVerb {
    Search,
    Min,
    Max,
}

impl FilterVerb {
    pub fn from_key_prefix(prefix: &str) -> Option<Self> {
        match prefix {
            "search" => Some(FilterVerb::Search),
            "min" => Some(FilterVerb::Min),
            "max" => Some(FilterVerb::Max),
            _ => None,
        }
    }
}

/// A single parsed filter. All predicates of a query are AND-ed.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    /// Case-insensitive substring match
    Substring { column: String, pattern: String },
    /// Inclusive lower bound
    AtLeast { column: String, value: Number },
    /// Inclusive upper bound
    AtMost { column: String, value: Number },
}

impl FilterPredicate {
    pub fn column(&self) -> &str {
        match self {
            FilterPredicate::Substring { column, .. }
            | FilterPredicate::AtLeast { column, .. }
            | FilterPredicate::AtMost { column, .. } => column,
        }
    }

    pub fn sql_operator(&self) -> &'static str {
        match self {
            FilterPredicate::Substring { .. } => "ILIKE",
            FilterPredicate::AtLeast { .. } => ">=",
            FilterPredicate::AtMost { .. } => "<=",
        }
    }

    /// Value bound to this predicate's placeholder
    pub fn param(&self) -> Value {
        match self {
            FilterPredicate::Substring { pattern, .. } => Value::String(format!("%{}%", pattern)),
            FilterPredicate::AtLeast { value, .. } | FilterPredicate::AtMost { value, .. } => {
                Value::Number(value.clone())
            }
        }
    }
}

/// Parameterized query text plus its positional arguments (`$1..$n`)
#[derive(Debug, Clone, PartialEq)]
pub struct QueryDescriptor {
    pub query: String,
    pub params: Vec<Value>,
}

impl QueryDescriptor {
    pub fn new(query: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            query: query.into(),
            params,
        }
    }
}
