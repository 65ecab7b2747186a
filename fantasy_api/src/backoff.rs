//! Retry budget and Fibonacci-scaled backoff for the fetch layer.

use std::time::Duration;

/// Retries attempted after the first failed request.
pub const DEFAULT_RETRIES: u32 = 10;

/// Unit multiplied by the Fibonacci sequence between retries.
pub const DEFAULT_BASE: Duration = Duration::from_secs(1);

/// How many times a failed request is retried and how long to wait in between.
///
/// Retry `r` (1-based) waits `fib(r - 1) * base`, so the first retry is
/// immediate and later waits grow like 1, 1, 2, 3, 5 times the base.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub retries: u32,
    pub base: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            base: DEFAULT_BASE,
        }
    }
}

impl RetryPolicy {
    pub fn new(retries: u32, base: Duration) -> Self {
        Self { retries, base }
    }

    /// A policy that gives up after the first failure.
    pub fn none() -> Self {
        Self {
            retries: 0,
            base: Duration::ZERO,
        }
    }

    /// Wait before retry number `retry` (1-based). Retry 0 is the initial request.
    pub fn delay_for_retry(&self, retry: u32) -> Duration {
        if retry == 0 {
            return Duration::ZERO;
        }
        let factor = fibonacci(retry - 1).min(u32::MAX as u64) as u32;
        self.base.saturating_mul(factor)
    }

    /// Every wait the policy would sleep through, in order.
    pub fn schedule(&self) -> Vec<Duration> {
        (1..=self.retries).map(|r| self.delay_for_retry(r)).collect()
    }
}

/// `fib(0) = 0`, `fib(1) = 1`, saturating at `u64::MAX`.
pub fn fibonacci(n: u32) -> u64 {
    let (mut a, mut b) = (0u64, 1u64);
    for _ in 0..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    a
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fibonacci_sequence() {
        let seq: Vec<u64> = (0..8).map(fibonacci).collect();
        assert_eq!(seq, vec![0, 1, 1, 2, 3, 5, 8, 13]);
    }

    #[test]
    fn fibonacci_saturates() {
        assert_eq!(fibonacci(200), u64::MAX);
    }

    #[test]
    fn first_five_retries_are_fibonacci_scaled() {
        let b = Duration::from_millis(250);
        let policy = RetryPolicy::new(5, b);
        assert_eq!(
            policy.schedule(),
            vec![b * 0, b * 1, b * 1, b * 2, b * 3]
        );
    }

    #[test]
    fn first_retry_is_immediate() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for_retry(1), Duration::ZERO);
        assert_eq!(policy.delay_for_retry(2), DEFAULT_BASE);
    }

    #[test]
    fn default_budget_is_ten_retries() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.schedule().len(), 10);
        assert_eq!(policy.delay_for_retry(10), DEFAULT_BASE * 34);
    }

    #[test]
    fn none_policy_has_no_waits() {
        assert!(RetryPolicy::none().schedule().is_empty());
    }
}
