pub mod auth;
pub mod response;

pub use auth::{admin_guard_middleware, extract_admin_token, AdminSession};
pub use response::{ApiResponse, ApiResult, DashboardUpdate};
