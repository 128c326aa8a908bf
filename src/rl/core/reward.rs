//! Reward Functions
//!
//! Maps a trade outcome to the scalar training signal. The reward is not
//! part of PnL accounting.

use serde::{Deserialize, Serialize};

use super::outcome::TradeOutcome;
use super::state::MarketState;

// Re-export config
pub use crate::rl::config::RewardConfig;

/// Reward signal components
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RewardSignal {
    /// Realized PnL
    pub pnl_reward: f64,
    /// Penalty for a reverted transaction
    pub revert_penalty: f64,
    /// Penalty for gas above the configured line
    pub gas_penalty: f64,
    /// Penalty for abstaining on a large spread
    pub missed_opportunity_penalty: f64,
    /// Total reward
    pub total: f64,
}

impl RewardSignal {
    /// Create a zero reward signal
    pub fn zero() -> Self {
        Self::default()
    }

    fn calculate_total(&mut self) {
        self.total = self.pnl_reward
            - self.revert_penalty
            - self.gas_penalty
            - self.missed_opportunity_penalty;
    }
}

/// Trait for computing rewards
pub trait RewardFunction: Send + Sync {
    /// Compute reward for an outcome observed in `state`
    fn compute(&self, outcome: &TradeOutcome, state: &MarketState) -> RewardSignal;
}

/// PnL reward with revert, gas and passivity penalties
#[derive(Debug, Clone, Default)]
pub struct ArbRewardFunction {
    config: RewardConfig,
}

impl ArbRewardFunction {
    /// Create with default config
    pub fn new() -> Self {
        Self::default()
    }

    /// Create with custom config
    pub fn with_config(config: RewardConfig) -> Self {
        Self { config }
    }
}

impl RewardFunction for ArbRewardFunction {
    fn compute(&self, outcome: &TradeOutcome, state: &MarketState) -> RewardSignal {
        let mut signal = RewardSignal {
            pnl_reward: outcome.pnl,
            ..RewardSignal::zero()
        };

        if outcome.reverted {
            signal.revert_penalty = self.config.revert_penalty;
        }

        if outcome.gas_cost > self.config.gas_penalty_threshold {
            signal.gas_penalty = (outcome.gas_cost - self.config.gas_penalty_threshold)
                * self.config.gas_penalty_multiplier;
        }

        if !outcome.attempted && state.spread > self.config.missed_opportunity_spread {
            signal.missed_opportunity_penalty = self.config.missed_opportunity_penalty;
        }

        signal.calculate_total();
        signal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with_spread(spread: f64) -> MarketState {
        MarketState {
            spread,
            ..Default::default()
        }
    }

    #[test]
    fn test_reward_equals_pnl_without_penalties() {
        let reward_fn = ArbRewardFunction::new();
        let outcome = TradeOutcome::executed(84.68, 15.0);

        let signal = reward_fn.compute(&outcome, &state_with_spread(0.01));
        assert_eq!(signal.total, 84.68);
    }

    #[test]
    fn test_revert_penalty() {
        let reward_fn = ArbRewardFunction::new();
        let outcome = TradeOutcome::reverted(9.0);

        let signal = reward_fn.compute(&outcome, &state_with_spread(0.0));
        assert_eq!(signal.revert_penalty, 100.0);
        assert_eq!(signal.total, -109.0);
    }

    #[test]
    fn test_gas_penalty_above_line() {
        let reward_fn = ArbRewardFunction::new();
        let outcome = TradeOutcome::executed(10.0, 80.0);

        let signal = reward_fn.compute(&outcome, &state_with_spread(0.0));
        assert_eq!(signal.gas_penalty, 60.0);
        assert_eq!(signal.total, -50.0);
    }

    #[test]
    fn test_missed_opportunity_only_when_abstaining() {
        let reward_fn = ArbRewardFunction::new();

        let idle = reward_fn.compute(&TradeOutcome::no_trade(), &state_with_spread(0.02));
        assert_eq!(idle.total, -5.0);

        let quiet = reward_fn.compute(&TradeOutcome::no_trade(), &state_with_spread(0.001));
        assert_eq!(quiet.total, 0.0);

        let traded = reward_fn.compute(&TradeOutcome::executed(1.0, 0.5), &state_with_spread(0.02));
        assert_eq!(traded.missed_opportunity_penalty, 0.0);
    }
}
