//! The session's single timer: connection timeout or retry delay.
//!
//! A session never needs both at once. While an attempt is in flight the
//! timer bounds it; while disconnected it counts down to the next attempt.
//! The timer is owned by the driver and dropped (cancelled) with it, so a
//! closed session can't be woken by a stale timer.

use std::pin::Pin;
use std::time::Duration;

use tokio::time::{self, Sleep};

/// What an armed timer means when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TimerKind {
    /// The in-flight connect attempt took too long.
    ConnectTimeout,
    /// The retry delay elapsed; start the next attempt.
    Retry,
}

/// A cancellable one-shot timer.
#[derive(Debug, Default)]
pub(crate) struct SessionTimer {
    armed: Option<(TimerKind, Pin<Box<Sleep>>)>,
}

impl SessionTimer {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Arms the timer, replacing whatever was armed before.
    pub(crate) fn arm(&mut self, kind: TimerKind, after: Duration) {
        self.armed = Some((kind, Box::pin(time::sleep(after))));
    }

    /// Disarms the timer. Returns what was armed, if anything.
    pub(crate) fn cancel(&mut self) -> Option<TimerKind> {
        self.armed.take().map(|(kind, _)| kind)
    }

    pub(crate) fn armed(&self) -> Option<TimerKind> {
        self.armed.as_ref().map(|(kind, _)| *kind)
    }

    /// Waits for the armed timer to fire and disarms it.
    ///
    /// Pends forever when nothing is armed. Cancel-safe: dropping the
    /// future leaves the deadline untouched.
    pub(crate) async fn fired(&mut self) -> TimerKind {
        let Some((kind, sleep)) = self.armed.as_mut() else {
            return std::future::pending().await;
        };
        sleep.as_mut().await;
        let kind = *kind;
        self.armed = None;
        kind
    }
}
