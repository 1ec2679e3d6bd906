//! Configuration data models
//!
//! This module defines all configuration structures used by the service.

pub mod app;
pub mod auth;
pub mod logging;
pub mod rate_limit;
pub mod server;
pub mod storage;
pub mod uploads;

pub use app::*;
pub use auth::*;
pub use logging::*;
pub use rate_limit::*;
pub use server::*;
pub use storage::*;
pub use uploads::*;

/// Default values for configuration
pub fn default_host() -> String {
    "0.0.0.0".to_string()
}

/// Default server port
pub fn default_port() -> u16 {
    5000
}

/// Default maximum body size in bytes
pub fn default_max_body_size() -> usize {
    10 * 1024 * 1024 // 10MB
}

/// Default maximum database connections
pub fn default_max_connections() -> u32 {
    10
}

/// Default connection timeout in seconds
pub fn default_connection_timeout() -> u64 {
    5
}

/// Default JWT lifetime: seven days
pub fn default_jwt_expiration() -> u64 {
    7 * 24 * 3600
}

pub(crate) fn default_true() -> bool {
    true
}
