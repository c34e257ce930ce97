pub mod executor;
pub mod manager;
pub mod models;
pub mod query_builder;
pub mod tables;

pub use executor::{PgExecutor, QueryExecutor, Row};
pub use manager::{DatabaseError, DatabaseManager};
