//! Bounded retry with capped backoff and cooperative cancellation.
//!
//! Used by the resolver for geocoding timeouts and, optionally, around
//! routing calls.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Granularity at which a backoff sleep notices cancellation.
const CANCEL_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, the first one included.
    pub max_attempts: usize,
    /// Delay after the first failure.
    pub initial_delay: Duration,
    /// Growth factor applied to the delay after each further failure.
    pub multiplier: f64,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::routing()
    }
}

impl RetryPolicy {
    /// Single attempt, no retry.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            initial_delay: Duration::ZERO,
            multiplier: 1.0,
            max_delay: Duration::ZERO,
        }
    }

    /// Three attempts, two seconds apart.
    pub fn geocoding() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(2),
            multiplier: 1.0,
            max_delay: Duration::from_secs(2),
        }
    }

    /// Three attempts with doubling delay starting at 500ms, capped at 4s.
    pub fn routing() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(500),
            multiplier: 2.0,
            max_delay: Duration::from_secs(4),
        }
    }

    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Set the first delay; the cap is raised to it if lower.
    #[must_use]
    pub fn with_initial_delay(mut self, delay: Duration) -> Self {
        self.initial_delay = delay;
        self.max_delay = self.max_delay.max(delay);
        self
    }

    #[must_use]
    pub fn with_max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Delay to wait after `failures` consecutive failed attempts.
    pub fn delay_after(&self, failures: usize) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let exponent = i32::try_from(failures - 1).unwrap_or(i32::MAX);
        let seconds = self.initial_delay.as_secs_f64() * self.multiplier.powi(exponent);
        Duration::try_from_secs_f64(seconds)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Shared cancellation flag with an optional deadline.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
    deadline: Option<Instant>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deadline(deadline: Instant) -> Self {
        Self {
            cancelled: Arc::default(),
            deadline: Some(deadline),
        }
    }

    pub fn with_timeout(timeout: Duration) -> Self {
        Self::with_deadline(Instant::now() + timeout)
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// Run `operation` until it succeeds, fails with an error `should_retry`
/// rejects, or `policy.max_attempts` is used up.
///
/// The closure receives the 1-based attempt number. The last error is
/// returned unchanged on exhaustion; a cancelled token yields
/// [`Error::Cancelled`] before the next attempt.
pub fn retry<T, F, P>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    should_retry: P,
    mut operation: F,
) -> Result<T>
where
    F: FnMut(usize) -> Result<T>,
    P: Fn(&Error) -> bool,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        debug!(attempt, max_attempts, "starting attempt");
        match operation(attempt) {
            Ok(value) => return Ok(value),
            Err(err) if attempt < max_attempts && should_retry(&err) => {
                let delay = policy.delay_after(attempt);
                warn!(attempt, max_attempts, ?delay, error = %err, "attempt failed, retrying");
                sleep_unless_cancelled(delay, cancel)?;
                attempt += 1;
            }
            Err(err) => return Err(err),
        }
    }
}

fn sleep_unless_cancelled(delay: Duration, cancel: &CancelToken) -> Result<()> {
    let until = Instant::now() + delay;
    loop {
        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }
        let now = Instant::now();
        if now >= until {
            return Ok(());
        }
        std::thread::sleep((until - now).min(CANCEL_POLL));
    }
}
