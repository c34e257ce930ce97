pub mod auth;
pub mod response;

pub use auth::{verify_token, Authentication, Identity, RequireAdmin, RequireIdentity};
pub use response::{ApiResponse, ApiResult};
