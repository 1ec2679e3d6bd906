//! Failed-login limiter configuration

use serde::{Deserialize, Serialize};

/// Brute-force protection for the login endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Failures allowed inside one window before lockout
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    /// Failure counting window in seconds
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    /// First lockout duration in seconds, doubled on each repeat
    #[serde(default = "default_lockout_secs")]
    pub lockout_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            window_secs: default_window_secs(),
            lockout_secs: default_lockout_secs(),
        }
    }
}

impl RateLimitConfig {
    /// Validate limiter configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_attempts == 0 {
            return Err("Max attempts cannot be 0".to_string());
        }
        if self.window_secs == 0 {
            return Err("Window cannot be 0".to_string());
        }
        Ok(())
    }
}

fn default_max_attempts() -> u32 {
    5
}

fn default_window_secs() -> u64 {
    15 * 60
}

fn default_lockout_secs() -> u64 {
    15 * 60
}
