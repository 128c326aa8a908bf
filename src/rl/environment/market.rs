//! Simulated Market State Generator
//!
//! Draws a fresh market condition vector each step. Spread follows a
//! mixture: rare exponential opportunities over fee-dominated noise.

use rand::Rng;
use rand_distr::Exp1;

use crate::rl::config::SamplerConfig;
use crate::rl::core::MarketState;

/// Running episode counters the sampler reads for the rate features
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct EpisodeCounters {
    /// Steps taken this episode
    pub step: usize,
    /// Successful trades this episode
    pub successes: usize,
    /// Reverted trades this episode
    pub reverts: usize,
}

/// Market state sampler
///
/// Stateless apart from its configuration; randomness and counters are
/// passed in by the owning environment.
#[derive(Debug, Clone)]
pub struct MarketStateSampler {
    config: SamplerConfig,
    opportunity_mean: f64,
}

impl MarketStateSampler {
    /// Create a new sampler
    ///
    /// A non-positive opportunity mean is treated as the default mean.
    pub fn new(config: SamplerConfig) -> Self {
        let opportunity_mean = if config.opportunity_mean_spread > 0.0 {
            config.opportunity_mean_spread
        } else {
            SamplerConfig::default().opportunity_mean_spread
        };

        Self {
            config,
            opportunity_mean,
        }
    }

    /// Get configuration
    pub fn config(&self) -> &SamplerConfig {
        &self.config
    }

    /// Draw the spread component
    pub fn sample_spread<R: Rng>(&self, rng: &mut R) -> f64 {
        if rng.gen::<f64>() < self.config.opportunity_prob {
            let unit: f64 = rng.sample(Exp1);
            unit * self.opportunity_mean
        } else {
            uniform(rng, (0.0, self.config.noise_spread_max))
        }
    }

    /// Generate the market state for the current counters
    pub fn sample<R: Rng>(&self, rng: &mut R, counters: &EpisodeCounters) -> MarketState {
        let spread = self.sample_spread(rng);
        let elapsed = counters.step.max(1) as f64;
        let day_length = self.config.day_length.max(1);

        MarketState {
            spread,
            liquidity: uniform(rng, self.config.liquidity_range),
            volatility: uniform(rng, self.config.volatility_range),
            gas_price: uniform(rng, self.config.gas_price_range),
            congestion: uniform(rng, self.config.congestion_range),
            recent_success_rate: counters.successes as f64 / elapsed,
            recent_revert_rate: counters.reverts as f64 / elapsed,
            time_of_day: (counters.step % day_length) as f64 / day_length as f64,
            block_time_variance: uniform(rng, self.config.block_time_variance_range),
        }
    }
}

impl Default for MarketStateSampler {
    fn default() -> Self {
        Self::new(SamplerConfig::default())
    }
}

fn uniform<R: Rng>(rng: &mut R, (lo, hi): (f64, f64)) -> f64 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_components_within_ranges() {
        let sampler = MarketStateSampler::default();
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let counters = EpisodeCounters::default();

        for _ in 0..2000 {
            let state = sampler.sample(&mut rng, &counters);
            assert!(state.spread >= 0.0);
            assert!((0.1..1.0).contains(&state.liquidity));
            assert!((0.0..0.2).contains(&state.volatility));
            assert!((0.2..0.8).contains(&state.gas_price));
            assert!((0.5..1.0).contains(&state.congestion));
            assert!((0.0..0.1).contains(&state.block_time_variance));
        }
    }

    #[test]
    fn test_spread_mostly_noise() {
        let sampler = MarketStateSampler::default();
        let mut rng = ChaCha8Rng::seed_from_u64(11);

        let n = 20_000;
        let noisy = (0..n)
            .filter(|_| sampler.sample_spread(&mut rng) <= 0.0005)
            .count();

        // ~99% noise plus the share of small exponential draws
        assert!(noisy as f64 / n as f64 > 0.97);
    }

    #[test]
    fn test_rate_features_from_counters() {
        let sampler = MarketStateSampler::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let counters = EpisodeCounters {
            step: 10,
            successes: 4,
            reverts: 2,
        };
        let state = sampler.sample(&mut rng, &counters);
        assert!((state.recent_success_rate - 0.4).abs() < 1e-12);
        assert!((state.recent_revert_rate - 0.2).abs() < 1e-12);
        assert!((state.time_of_day - 10.0 / 24.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_steps_guarded() {
        let sampler = MarketStateSampler::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let state = sampler.sample(&mut rng, &EpisodeCounters::default());
        assert_eq!(state.recent_success_rate, 0.0);
        assert_eq!(state.recent_revert_rate, 0.0);
        assert_eq!(state.time_of_day, 0.0);
    }

    #[test]
    fn test_time_of_day_wraps() {
        let sampler = MarketStateSampler::default();
        let mut rng = ChaCha8Rng::seed_from_u64(3);

        let counters = EpisodeCounters {
            step: 30,
            ..Default::default()
        };
        let state = sampler.sample(&mut rng, &counters);
        assert!((state.time_of_day - 0.25).abs() < 1e-12);
    }
}
