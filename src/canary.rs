//! Canary fault injection
//!
//! Simulates a misbehaving canary deployment on the toggle endpoint. When a
//! canary delay is configured, half of the toggles take the canary path: they
//! sleep for a normally distributed duration around the configured delay and
//! may then fail abruptly with the configured probability.

use std::time::Duration;

use rand::Rng;
use rand_distr::{Distribution, Normal};
use thiserror::Error;

/// Share of toggles that take the canary path once it is enabled.
const CANARY_RATIO: f64 = 0.5;

/// Deliberate fault raised on the canary path.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Something went wrong")]
pub struct InjectedFault;

/// Canary settings resolved from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Canary {
    delay: Duration,
    failure_rate: f64,
}

/// What a single request should do on its way out.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CanaryPlan {
    /// Extra latency to add, `None` when the request is not on the canary path
    pub delay: Option<Duration>,
    /// Whether the request must fail after the delay
    pub fail: bool,
}

impl Canary {
    /// Create canary settings. The failure rate is clamped to `[0, 1]` and
    /// non-finite values disable failures.
    pub fn new(delay: Duration, failure_rate: f64) -> Self {
        let failure_rate = if failure_rate.is_finite() {
            failure_rate.clamp(0.0, 1.0)
        } else {
            0.0
        };

        Self {
            delay,
            failure_rate,
        }
    }

    /// Canary injection only runs with a non-zero delay.
    pub fn is_enabled(&self) -> bool {
        !self.delay.is_zero()
    }

    /// Mean canary delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Probability that a canary request fails.
    pub fn failure_rate(&self) -> f64 {
        self.failure_rate
    }

    /// Draw the plan for one request.
    pub fn plan<R: Rng>(&self, rng: &mut R) -> CanaryPlan {
        if !self.is_enabled() || rng.gen::<f64>() >= CANARY_RATIO {
            return CanaryPlan::default();
        }

        let delay = self.sample_delay(rng);
        let fail = rng.gen::<f64>() < self.failure_rate;

        CanaryPlan {
            delay: Some(delay),
            fail,
        }
    }

    // Standard deviation is a tenth of the mean, in whole milliseconds.
    fn sample_delay<R: Rng>(&self, rng: &mut R) -> Duration {
        let mean_ms = self.delay.as_millis() as f64;
        let std_dev_ms = (self.delay.as_millis() / 10) as f64;

        let sampled_ms = match Normal::new(mean_ms, std_dev_ms) {
            Ok(normal) => normal.sample(rng),
            Err(_) => mean_ms,
        };

        Duration::from_secs_f64(sampled_ms.max(0.0) / 1000.0)
    }
}

impl CanaryPlan {
    /// Check the failure draw.
    pub fn outcome(&self) -> Result<(), InjectedFault> {
        if self.fail {
            Err(InjectedFault)
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    const DRAWS: usize = 2_000;

    #[test]
    fn test_disabled_canary_never_delays_or_fails() {
        let canary = Canary::new(Duration::ZERO, 1.0);
        let mut rng = StdRng::seed_from_u64(7);

        for _ in 0..DRAWS {
            let plan = canary.plan(&mut rng);
            assert_eq!(plan, CanaryPlan::default());
            assert!(plan.outcome().is_ok());
        }
    }

    #[test]
    fn test_roughly_half_of_requests_take_canary_path() {
        let canary = Canary::new(Duration::from_millis(100), 0.0);
        let mut rng = StdRng::seed_from_u64(42);

        let delayed = (0..DRAWS)
            .filter(|_| canary.plan(&mut rng).delay.is_some())
            .count();

        // 50% +/- 5 points
        assert!(
            (900..=1100).contains(&delayed),
            "expected about half delayed, got {}",
            delayed
        );
    }

    #[test]
    fn test_delays_cluster_around_mean() {
        let canary = Canary::new(Duration::from_millis(1000), 0.0);
        let mut rng = StdRng::seed_from_u64(3);

        let delays: Vec<f64> = (0..DRAWS)
            .filter_map(|_| canary.plan(&mut rng).delay)
            .map(|d| d.as_secs_f64() * 1000.0)
            .collect();

        assert!(!delays.is_empty());
        let mean = delays.iter().sum::<f64>() / delays.len() as f64;
        assert!((mean - 1000.0).abs() < 20.0, "mean delay was {}", mean);
        // Six sigma either side
        assert!(delays.iter().all(|d| (400.0..=1600.0).contains(d)));
    }

    #[test]
    fn test_failure_only_on_canary_path() {
        let canary = Canary::new(Duration::from_millis(10), 1.0);
        let mut rng = StdRng::seed_from_u64(11);

        for _ in 0..DRAWS {
            let plan = canary.plan(&mut rng);
            assert_eq!(plan.fail, plan.delay.is_some());
        }
    }

    #[test]
    fn test_zero_failure_rate_never_fails() {
        let canary = Canary::new(Duration::from_millis(10), 0.0);
        let mut rng = StdRng::seed_from_u64(5);

        assert!((0..DRAWS).all(|_| canary.plan(&mut rng).outcome().is_ok()));
    }

    #[test]
    fn test_outcome_reports_injected_fault() {
        let plan = CanaryPlan {
            delay: Some(Duration::from_millis(1)),
            fail: true,
        };

        assert_eq!(plan.outcome(), Err(InjectedFault));
        assert_eq!(InjectedFault.to_string(), "Something went wrong");
    }
}
