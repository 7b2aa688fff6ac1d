//! Randomised reconnect delays.

use std::time::Duration;

use rand::{Rng, SeedableRng, rngs::StdRng};
use rand_distr::StandardNormal;

/// Produces the delay before each reconnect attempt.
///
/// Delays are drawn from a Gaussian distribution centred on the configured
/// mean with the configured jitter as standard deviation. The distribution
/// admits negative samples; those clamp to zero, which callers treat as
/// "retry immediately".
pub(crate) struct ReconnectBackoff {
    mean_secs: f64,
    jitter_secs: f64,
    rng: StdRng,
}

impl ReconnectBackoff {
    pub fn new(delay: Duration, jitter: Duration) -> Self {
        Self::with_rng(delay, jitter, StdRng::from_entropy())
    }

    /// Seedable constructor so tests can fix the jitter sequence.
    pub fn with_rng(delay: Duration, jitter: Duration, rng: StdRng) -> Self {
        Self {
            mean_secs: delay.as_secs_f64(),
            jitter_secs: jitter.as_secs_f64(),
            rng,
        }
    }

    /// Sample the delay for the next reconnect attempt.
    pub fn next_delay(&mut self) -> Duration {
        let z: f64 = self.rng.sample(StandardNormal);
        let secs = self.mean_secs + z * self.jitter_secs;
        if secs <= 0.0 {
            Duration::ZERO
        } else {
            Duration::from_secs_f64(secs)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ReconnectBackoff;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::time::Duration;

    fn seeded(delay_ms: u64, jitter_ms: u64) -> ReconnectBackoff {
        ReconnectBackoff::with_rng(
            Duration::from_millis(delay_ms),
            Duration::from_millis(jitter_ms),
            StdRng::seed_from_u64(42),
        )
    }

    #[test]
    fn zero_jitter_always_yields_the_mean() {
        let mut backoff = seeded(1000, 0);
        for _ in 0..10 {
            assert_eq!(backoff.next_delay(), Duration::from_secs(1));
        }
    }

    #[test]
    fn negative_samples_clamp_to_zero() {
        // Jitter far larger than the mean makes negative samples certain to
        // appear within a few thousand draws.
        let mut backoff = seeded(1, 10_000);
        let clamped = (0..5000).any(|_| backoff.next_delay() == Duration::ZERO);
        assert!(clamped, "expected at least one zero delay");
    }

    #[test]
    fn samples_follow_the_configured_distribution() {
        let mut backoff = seeded(1000, 300);
        let n = 20_000;
        let samples: Vec<f64> = (0..n)
            .map(|_| backoff.next_delay().as_secs_f64())
            .collect();
        let mean = samples.iter().sum::<f64>() / n as f64;
        let var = samples.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n as f64;
        assert!((mean - 1.0).abs() < 0.02, "mean drifted: {mean}");
        assert!((var.sqrt() - 0.3).abs() < 0.02, "std drifted: {}", var.sqrt());
    }
}
