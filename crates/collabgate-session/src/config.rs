//! Session timing and retry policy.

use std::time::Duration;

/// Configuration for session behavior.
///
/// Retries use a fixed interval with a hard ceiling. There is no
/// exponential backoff: a handful of collaborators on one document get
/// predictable reconnects, and a long outage ends in [`Failed`] instead of
/// an unbounded reconnect storm.
///
/// [`Failed`]: crate::SessionState::Failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// How long a single connect attempt may take before it counts as a
    /// failure.
    ///
    /// Default: 10 seconds.
    pub connection_timeout: Duration,

    /// Delay between a failure and the next attempt.
    ///
    /// Default: 1 second.
    pub reconnect_interval: Duration,

    /// Maximum consecutive reconnect attempts before the session gives up.
    ///
    /// Default: 5. With 0 the first failure is terminal.
    pub max_reconnect_attempts: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            connection_timeout: Duration::from_millis(10_000),
            reconnect_interval: Duration::from_millis(1_000),
            max_reconnect_attempts: 5,
        }
    }
}
