//! Backoff arithmetic and per-attempt retry decisions.

use std::time::Duration;

use crate::transport::Response;

/// Statuses that are retried. Everything else returns to the caller.
pub const RETRYABLE_STATUS_CODES: [u32; 5] = [429, 500, 502, 503, 504];

/// Decision for one observed response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDecision {
    /// Hand the response to the caller, success or not.
    Return,
    /// Sleep this long, then try again.
    RetryAfter(Duration),
    /// Retry budget spent; raise the terminal error.
    Exhausted,
}

/// Exponential backoff with a server override.
///
/// `max_retries` counts retries, not attempts: a policy with
/// `max_retries = N` performs exactly `N + 1` attempts before giving up,
/// and `max_retries = 0` means a single attempt. Delays double from a
/// one-second base unless the response carries a parsable `Retry-After`
/// header (integer seconds), which overrides the formula for that retry.
/// No jitter.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32) -> Self {
        Self {
            max_retries,
            ..Self::default()
        }
    }

    pub fn is_retryable(status: u32) -> bool {
        RETRYABLE_STATUS_CODES.contains(&status)
    }

    /// Decide what to do with a response observed on `attempt` (1-based).
    pub fn decide(&self, attempt: u32, response: &Response) -> RetryDecision {
        if !Self::is_retryable(response.status) {
            return RetryDecision::Return;
        }
        if attempt >= self.max_retries + 1 {
            return RetryDecision::Exhausted;
        }
        let delay = retry_after(response).unwrap_or_else(|| self.backoff(attempt));
        RetryDecision::RetryAfter(delay)
    }

    /// Backoff after a transport-level failure on `attempt`, or `None` when
    /// the budget is spent. No response means no `Retry-After`, so this is
    /// always the exponential formula.
    pub fn backoff_for_failure(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_retries + 1 {
            return None;
        }
        Some(self.backoff(attempt))
    }

    /// base × 2^(attempt−1), with the shift clamped to keep the arithmetic
    /// in range for absurd attempt counts.
    fn backoff(&self, attempt: u32) -> Duration {
        let exp = 1u32 << attempt.saturating_sub(1).min(16);
        self.base_delay.saturating_mul(exp)
    }
}

/// `Retry-After` as a nonnegative integer number of seconds, if present
/// and parsable. Anything else falls back to the exponential formula.
fn retry_after(response: &Response) -> Option<Duration> {
    response
        .header("Retry-After")?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}
