//! State Representation
//!
//! The observation handed to a policy each step: nine normalized market
//! features, replaced wholesale every step.

use serde::{Deserialize, Serialize};

/// Number of features in the market state vector
pub const STATE_DIM: usize = 9;

/// Observable market conditions for one step
///
/// Feature order is stable and matches [`MarketState::to_array`]; externally
/// trained policies rely on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketState {
    /// Fractional price difference between venues (may exceed 1 loosely)
    pub spread: f64,
    /// Pool liquidity factor, 1.0 = deep
    pub liquidity: f64,
    /// Short-horizon volatility
    pub volatility: f64,
    /// Normalized network gas price
    pub gas_price: f64,
    /// Mempool congestion
    pub congestion: f64,
    /// Successes over elapsed steps this episode
    pub recent_success_rate: f64,
    /// Reverts over elapsed steps this episode
    pub recent_revert_rate: f64,
    /// Phase within the simulated day
    pub time_of_day: f64,
    /// Block time variance
    pub block_time_variance: f64,
}

impl MarketState {
    /// Encode as a flat feature vector
    pub fn to_array(&self) -> [f64; STATE_DIM] {
        [
            self.spread,
            self.liquidity,
            self.volatility,
            self.gas_price,
            self.congestion,
            self.recent_success_rate,
            self.recent_revert_rate,
            self.time_of_day,
            self.block_time_variance,
        ]
    }

    /// Decode from a flat feature vector
    ///
    /// Returns `None` when fewer than [`STATE_DIM`] values are supplied.
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        if values.len() < STATE_DIM {
            return None;
        }
        Some(Self {
            spread: values[0],
            liquidity: values[1],
            volatility: values[2],
            gas_price: values[3],
            congestion: values[4],
            recent_success_rate: values[5],
            recent_revert_rate: values[6],
            time_of_day: values[7],
            block_time_variance: values[8],
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_order() {
        let state = MarketState {
            spread: 0.01,
            liquidity: 0.5,
            time_of_day: 0.25,
            ..Default::default()
        };
        let features = state.to_array();
        assert_eq!(features.len(), STATE_DIM);
        assert_eq!(features[0], 0.01);
        assert_eq!(features[1], 0.5);
        assert_eq!(features[7], 0.25);
    }

    #[test]
    fn test_from_short_slice() {
        assert!(MarketState::from_slice(&[0.0; 8]).is_none());
        let state = MarketState::from_slice(&[0.1; STATE_DIM]).unwrap();
        assert_eq!(state.block_time_variance, 0.1);
    }
}
