pub mod types;
pub mod parser;
pub mod projection;
pub mod error;

pub use types::*;
pub use error::FilterError;
pub use parser::FilterParser;
pub use projection::project;
