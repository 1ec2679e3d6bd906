//! Failed-login lockouts

use crate::config::RateLimitConfig;
use crate::utils::error::{AppError, Result};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tracing::warn;

/// Brute-force protection for the credential endpoints
///
/// Clients are keyed by whatever the caller chooses (peer address plus
/// email for login). After `max_attempts` failures inside one window the
/// client is locked out; each repeat lockout doubles in length.
#[derive(Debug)]
pub struct AuthRateLimiter {
    attempts: DashMap<String, Tracker>,
    max_attempts: u32,
    window: Duration,
    base_lockout_secs: u64,
    blocked: AtomicU64,
}

#[derive(Debug)]
struct Tracker {
    failures: u32,
    window_start: Instant,
    lockout_until: Option<Instant>,
    lockouts: u32,
}

impl Tracker {
    fn new(now: Instant) -> Self {
        Self {
            failures: 0,
            window_start: now,
            lockout_until: None,
            lockouts: 0,
        }
    }
}

impl Default for AuthRateLimiter {
    fn default() -> Self {
        Self::from_config(&RateLimitConfig::default())
    }
}

impl AuthRateLimiter {
    pub fn new(max_attempts: u32, window_secs: u64, base_lockout_secs: u64) -> Self {
        Self {
            attempts: DashMap::new(),
            max_attempts,
            window: Duration::from_secs(window_secs),
            base_lockout_secs,
            blocked: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.max_attempts, config.window_secs, config.lockout_secs)
    }

    /// 429 while `client` is locked out
    pub fn check(&self, client: &str) -> Result<()> {
        let now = Instant::now();
        let Some(mut tracker) = self.attempts.get_mut(client) else {
            return Ok(());
        };

        if let Some(until) = tracker.lockout_until {
            if now < until {
                self.blocked.fetch_add(1, Ordering::Relaxed);
                let remaining = until.duration_since(now).as_secs().max(1);
                return Err(AppError::rate_limit(format!(
                    "Too many failed attempts. Try again in {} seconds",
                    remaining
                )));
            }
            tracker.lockout_until = None;
        }

        if now.duration_since(tracker.window_start) > self.window {
            tracker.failures = 0;
            tracker.window_start = now;
        }
        Ok(())
    }

    /// Count a failure; returns the lockout length when this one triggers it
    pub fn record_failure(&self, client: &str) -> Option<u64> {
        let now = Instant::now();
        let mut tracker = self
            .attempts
            .entry(client.to_string())
            .or_insert_with(|| Tracker::new(now));

        if now.duration_since(tracker.window_start) > self.window {
            tracker.failures = 0;
            tracker.window_start = now;
        }
        tracker.failures += 1;
        if tracker.failures < self.max_attempts {
            return None;
        }

        let lockout_secs = self
            .base_lockout_secs
            .saturating_mul(2u64.saturating_pow(tracker.lockouts));
        tracker.lockout_until = Some(now + Duration::from_secs(lockout_secs));
        tracker.lockouts += 1;
        tracker.failures = 0;

        warn!(
            "Client {} locked out for {} seconds (lockout #{})",
            client, lockout_secs, tracker.lockouts
        );
        Some(lockout_secs)
    }

    pub fn record_success(&self, client: &str) {
        self.attempts.remove(client);
    }

    pub fn blocked_attempts(&self) -> u64 {
        self.blocked.load(Ordering::Relaxed)
    }

    /// Forget clients whose window and lockout have both expired
    pub fn cleanup(&self) {
        let now = Instant::now();
        let max_age = self.window * 2;
        self.attempts.retain(|_, t| {
            now.duration_since(t.window_start) < max_age
                || t.lockout_until.is_some_and(|until| until > now)
        });
    }
}
