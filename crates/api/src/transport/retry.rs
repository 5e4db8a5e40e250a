// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backoff for HTTP 429 responses.

use std::time::Duration;

/// Maximum retries after a 429 before giving up.
pub const MAX_RETRIES: u32 = 5;

/// Delay before the first retry; doubles each attempt.
pub const BASE_DELAY: Duration = Duration::from_secs(1);

/// Upper bound for any single backoff, computed or server-supplied.
pub const MAX_DELAY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_retries: MAX_RETRIES, base_delay: BASE_DELAY, max_delay: MAX_DELAY }
    }
}

impl RetryPolicy {
    /// `base_delay * 2^retry`, capped at `max_delay`.
    pub fn backoff(&self, retry: u32) -> Duration {
        let factor = 2u32.checked_pow(retry).unwrap_or(u32::MAX);
        self.base_delay.checked_mul(factor).unwrap_or(self.max_delay).min(self.max_delay)
    }
}

/// Rate-limit state for one logical request.
#[derive(Debug, Clone)]
pub struct RateLimitState {
    policy: RetryPolicy,
    retries: u32,
}

impl RateLimitState {
    pub fn new(policy: RetryPolicy) -> Self {
        Self { policy, retries: 0 }
    }

    /// Requests sent so far, counting the one that just returned 429.
    pub fn attempts(&self) -> u32 {
        self.retries + 1
    }

    /// Record a 429. Returns how long to wait before retrying, or `None` once
    /// the retry budget is spent. A server-supplied delay wins over the
    /// computed one.
    pub fn next_delay(&mut self, retry_after: Option<Duration>) -> Option<Duration> {
        if self.retries >= self.policy.max_retries {
            return None;
        }
        let delay = retry_after
            .map(|d| d.min(self.policy.max_delay))
            .unwrap_or_else(|| self.policy.backoff(self.retries));
        self.retries += 1;
        Some(delay)
    }
}

/// Parse a `Retry-After` header given in (possibly fractional) seconds.
///
/// HTTP-date values are not supported and yield `None`.
pub fn parse_retry_after(value: &str) -> Option<Duration> {
    let secs: f64 = value.trim().parse().ok()?;
    if !secs.is_finite() || secs < 0.0 {
        return None;
    }
    Some(Duration::from_secs_f64(secs))
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
