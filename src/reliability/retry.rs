use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryStrategy {
    ExponentialBackoff,
    LinearBackoff,
    FixedDelay,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total delivery attempts per item, including the first one.
    pub max_attempts: u32,
    #[serde(with = "crate::app::config::serde_helpers")]
    pub base_delay: Duration,
    #[serde(with = "crate::app::config::serde_helpers")]
    pub max_delay: Duration,
    pub strategy: RetryStrategy,
    pub jitter: bool,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
            strategy: RetryStrategy::ExponentialBackoff,
            jitter: true,
        }
    }
}

/// Backoff schedule for redelivering a failed item.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    config: RetryConfig,
}

impl RetryPolicy {
    pub fn new(config: RetryConfig) -> Self {
        Self { config }
    }

    pub fn max_attempts(&self) -> u32 {
        self.config.max_attempts
    }

    /// Whether another attempt is allowed after `attempts` have been made.
    pub fn should_retry(&self, attempts: u32) -> bool {
        attempts < self.config.max_attempts
    }

    /// Delay before retry number `attempt` (0-based).
    pub fn calculate_delay(&self, attempt: u32) -> Duration {
        let base_millis = self.config.base_delay.as_millis() as u64;
        let base_delay = match self.config.strategy {
            RetryStrategy::ExponentialBackoff => {
                let multiplier = 2_u64.saturating_pow(attempt);
                Duration::from_millis(base_millis.saturating_mul(multiplier))
            }
            RetryStrategy::LinearBackoff => {
                Duration::from_millis(base_millis.saturating_mul(attempt as u64 + 1))
            }
            RetryStrategy::FixedDelay => self.config.base_delay,
        };

        let capped_delay = std::cmp::min(base_delay, self.config.max_delay);

        if self.config.jitter {
            Self::apply_jitter(capped_delay)
        } else {
            capped_delay
        }
    }

    fn apply_jitter(delay: Duration) -> Duration {
        let mut rng = rand::rng();
        let jitter_factor = rng.random_range(0.5..1.5); // ±50% jitter
        let jittered_millis = (delay.as_millis() as f64 * jitter_factor) as u64;
        Duration::from_millis(jittered_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(strategy: RetryStrategy) -> RetryPolicy {
        RetryPolicy::new(RetryConfig {
            max_attempts: 4,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_millis(500),
            strategy,
            jitter: false,
        })
    }

    #[test]
    fn test_exponential_backoff_is_capped() {
        let policy = policy(RetryStrategy::ExponentialBackoff);
        assert_eq!(policy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_delay(1), Duration::from_millis(200));
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(400));
        assert_eq!(policy.calculate_delay(3), Duration::from_millis(500));
        assert_eq!(policy.calculate_delay(80), Duration::from_millis(500));
    }

    #[test]
    fn test_linear_backoff() {
        let policy = policy(RetryStrategy::LinearBackoff);
        assert_eq!(policy.calculate_delay(0), Duration::from_millis(100));
        assert_eq!(policy.calculate_delay(2), Duration::from_millis(300));
    }

    #[test]
    fn test_fixed_delay() {
        let policy = policy(RetryStrategy::FixedDelay);
        assert_eq!(policy.calculate_delay(0), policy.calculate_delay(3));
    }

    #[test]
    fn test_jitter_stays_within_bounds() {
        let policy = RetryPolicy::new(RetryConfig {
            strategy: RetryStrategy::FixedDelay,
            base_delay: Duration::from_millis(1000),
            ..Default::default()
        });
        for _ in 0..100 {
            let delay = policy.calculate_delay(0);
            assert!(delay >= Duration::from_millis(500));
            assert!(delay <= Duration::from_millis(1500));
        }
    }

    #[test]
    fn test_should_retry_counts_total_attempts() {
        let policy = policy(RetryStrategy::FixedDelay);
        assert!(policy.should_retry(1));
        assert!(policy.should_retry(3));
        assert!(!policy.should_retry(4));
    }
}
