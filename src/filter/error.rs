use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterError {
    #[error("Invalid column name: {0}")]
    InvalidColumn(String),

    #[error("Invalid value for filter '{key}': {reason}")]
    InvalidFilterValue { key: String, reason: String },
}
