//! Lock acquisition retry policy

use std::time::Duration;
use tracing::warn;

/// Bounded fixed-delay retry on lock contention
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total acquisition attempts before giving up
    pub max_attempts: u32,
    /// Suspension between consecutive attempts
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            retry_delay: Duration::from_millis(100),
        }
    }
}

impl RetryPolicy {
    /// Create a new RetryPolicy with custom values
    ///
    /// A zero attempt count falls back to the default. A zero delay is
    /// accepted and retries immediately after yielding.
    pub fn new(max_attempts: u32, retry_delay: Duration) -> Self {
        let default = Self::default();

        let max_attempts = if max_attempts == 0 {
            warn!(
                max_attempts,
                default = default.max_attempts,
                "Invalid max_attempts, using default"
            );
            default.max_attempts
        } else {
            max_attempts
        };

        Self {
            max_attempts,
            retry_delay,
        }
    }
}
