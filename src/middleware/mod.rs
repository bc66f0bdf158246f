pub mod auth;
pub mod license;
pub mod response;

pub use auth::jwt_auth_middleware;
pub use license::licensed_route_middleware;
pub use response::{ApiResponse, ApiResult};
