//! HTTP middleware
//!
//! - Request ID tagging
//! - Failed-login lockouts for the auth endpoints

mod auth_rate_limiter;
mod request_id;

pub use auth_rate_limiter::AuthRateLimiter;
pub use request_id::{RequestIdMiddleware, RequestIdMiddlewareService};
