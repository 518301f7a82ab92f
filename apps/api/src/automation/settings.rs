//! Tunables for a run: fit threshold, fetch retry policy, and per-phase pacing.

use std::time::Duration;

/// Bounded exponential backoff.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Delay to wait after the given failed attempt (1-based): base, 2×base, 4×base…, capped.
    pub fn backoff(&self, failed_attempt: u32) -> Duration {
        let exponent = failed_attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// Pauses between consecutive outbound calls of each phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pacing {
    pub catalog: Duration,
    pub scoring: Duration,
    pub generation: Duration,
    pub applying: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSettings {
    /// Postings scoring below this are never tailored, even if the quota is unmet.
    pub min_fit_score: f64,
    pub retry: RetryPolicy,
    pub pacing: Pacing,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            min_fit_score: 0.6,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_secs(1),
                max_delay: Duration::from_secs(30),
            },
            pacing: Pacing {
                catalog: Duration::from_millis(500),
                scoring: Duration::from_millis(200),
                generation: Duration::from_millis(500),
                applying: Duration::from_secs(1),
            },
        }
    }
}

#[cfg(test)]
impl RunSettings {
    /// No pacing and no backoff; keeps scenario tests fast.
    pub fn immediate() -> Self {
        Self {
            min_fit_score: 0.6,
            retry: RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::ZERO,
                max_delay: Duration::ZERO,
            },
            pacing: Pacing {
                catalog: Duration::ZERO,
                scoring: Duration::ZERO,
                generation: Duration::ZERO,
                applying: Duration::ZERO,
            },
        }
    }
}

/// Sleeps for the pacing interval; a zero interval does not yield.
pub(crate) async fn pace(interval: Duration) {
    if !interval.is_zero() {
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backoff_doubles_per_attempt() {
        let policy = RetryPolicy {
            max_attempts: 5,
            base_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(10),
        };
        assert_eq!(policy.backoff(1), Duration::from_millis(100));
        assert_eq!(policy.backoff(2), Duration::from_millis(200));
        assert_eq!(policy.backoff(3), Duration::from_millis(400));
    }

    #[test]
    fn test_backoff_is_capped() {
        let policy = RetryPolicy {
            max_attempts: 40,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
        };
        assert_eq!(policy.backoff(6), Duration::from_secs(30));
        assert_eq!(policy.backoff(40), Duration::from_secs(30));
    }

    #[test]
    fn test_default_settings_match_documented_values() {
        let settings = RunSettings::default();
        assert_eq!(settings.retry.max_attempts, 3);
        assert_eq!(settings.pacing.catalog, Duration::from_millis(500));
        assert!((settings.min_fit_score - 0.6).abs() < f64::EPSILON);
    }
}
