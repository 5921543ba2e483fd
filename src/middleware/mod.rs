pub mod auth;
pub mod extract;
pub mod metrics;
pub mod response;

pub use auth::{current_user_middleware, jwt_auth_middleware, AuthUser, CurrentUser};
pub use extract::{ApiJson, ApiQuery, IdPath};
pub use metrics::track_metrics;
pub use response::{ApiResponse, ApiResult, PagedResponse, PagedResult};
