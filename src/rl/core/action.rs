//! Action Space
//!
//! Policies emit raw continuous actions; the environment clamps every
//! component into its configured bounds before use. Out-of-range proposals
//! are never rejected.

use serde::{Deserialize, Serialize};

use crate::rl::config::ActionSpaceConfig;

/// Dimension of the raw action vector
pub const ACTION_DIM: usize = 5;

/// Arbitrage strategy labels
///
/// Informational only: the cost model prices every strategy the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum StrategyKind {
    DexArb = 0,
    Triangular = 1,
    Backrun = 2,
    Liquidation = 3,
}

impl StrategyKind {
    /// Convert from selector index
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            0 => Some(Self::DexArb),
            1 => Some(Self::Triangular),
            2 => Some(Self::Backrun),
            3 => Some(Self::Liquidation),
            _ => None,
        }
    }

    /// Get all labels in selector order
    pub fn all() -> &'static [StrategyKind] {
        &[
            Self::DexArb,
            Self::Triangular,
            Self::Backrun,
            Self::Liquidation,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DexArb => "dex_arb",
            Self::Triangular => "triangular",
            Self::Backrun => "backrun",
            Self::Liquidation => "liquidation",
        }
    }
}

impl Default for StrategyKind {
    fn default() -> Self {
        Self::DexArb
    }
}

/// Raw action as proposed by a policy
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ArbAction {
    /// Minimum spread required to trade
    pub threshold: f64,
    /// Continuous trade-size selector, truncated to an index
    pub trade_size: f64,
    /// Continuous strategy selector, truncated to an index
    pub strategy: f64,
    /// Priority fee multiplier
    pub priority_fee: f64,
    /// Flash-loan flag, set when above the configured cutoff
    pub flashloan: f64,
}

impl ArbAction {
    /// Create a new raw action
    pub fn new(
        threshold: f64,
        trade_size: f64,
        strategy: f64,
        priority_fee: f64,
        flashloan: f64,
    ) -> Self {
        Self {
            threshold,
            trade_size,
            strategy,
            priority_fee,
            flashloan,
        }
    }

    /// Create from a raw vector
    ///
    /// Missing trailing components default to zero.
    pub fn from_slice(values: &[f64]) -> Self {
        let get = |i: usize| values.get(i).copied().unwrap_or(0.0);
        Self::new(get(0), get(1), get(2), get(3), get(4))
    }

    /// Convert to vector representation
    pub fn to_array(&self) -> [f64; ACTION_DIM] {
        [
            self.threshold,
            self.trade_size,
            self.strategy,
            self.priority_fee,
            self.flashloan,
        ]
    }
}

/// Action after clamping, ready for the cost model
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAction {
    pub threshold: f64,
    pub trade_size_index: usize,
    /// Notional in USD selected by `trade_size_index`
    pub trade_size: f64,
    pub strategy: StrategyKind,
    pub priority_fee: f64,
    pub use_flashloan: bool,
}

/// Bounds used to clamp raw actions
#[derive(Debug, Clone, PartialEq)]
pub struct ActionSpace {
    config: ActionSpaceConfig,
}

impl Default for ActionSpace {
    fn default() -> Self {
        Self::new(ActionSpaceConfig::default())
    }
}

impl ActionSpace {
    pub fn new(config: ActionSpaceConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ActionSpaceConfig {
        &self.config
    }

    pub fn trade_sizes(&self) -> &[f64] {
        &self.config.trade_sizes
    }

    /// Lower bound of each raw component
    pub fn low(&self) -> [f64; ACTION_DIM] {
        [
            self.config.threshold_range.0,
            0.0,
            0.0,
            self.config.priority_fee_range.0,
            0.0,
        ]
    }

    /// Upper bound of each raw component
    pub fn high(&self) -> [f64; ACTION_DIM] {
        [
            self.config.threshold_range.1,
            self.max_size_index() as f64,
            (StrategyKind::all().len() - 1) as f64,
            self.config.priority_fee_range.1,
            1.0,
        ]
    }

    fn max_size_index(&self) -> usize {
        self.config.trade_sizes.len().saturating_sub(1)
    }

    /// Clamp a raw action into the configured bounds
    ///
    /// NaN components fall to the lower bound.
    pub fn resolve(&self, action: &ArbAction) -> ResolvedAction {
        let (t_lo, t_hi) = self.config.threshold_range;
        let (p_lo, p_hi) = self.config.priority_fee_range;

        let trade_size_index = clamp_index(action.trade_size, self.max_size_index());
        let strategy_index = clamp_index(action.strategy, StrategyKind::all().len() - 1);

        ResolvedAction {
            threshold: clamp(action.threshold, t_lo, t_hi),
            trade_size_index,
            trade_size: self
                .config
                .trade_sizes
                .get(trade_size_index)
                .copied()
                .unwrap_or(0.0),
            strategy: StrategyKind::from_index(strategy_index).unwrap_or_default(),
            priority_fee: clamp(action.priority_fee, p_lo, p_hi),
            use_flashloan: action.flashloan > self.config.flashloan_cutoff,
        }
    }
}

fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    if value.is_nan() {
        lo
    } else {
        value.clamp(lo, hi)
    }
}

fn clamp_index(value: f64, max_index: usize) -> usize {
    // Truncation toward zero after clamping, as a float-to-int cast does
    clamp(value, 0.0, max_index as f64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_roundtrip() {
        for (i, strategy) in StrategyKind::all().iter().enumerate() {
            assert_eq!(StrategyKind::from_index(i), Some(*strategy));
        }
        assert_eq!(StrategyKind::from_index(4), None);
        assert_eq!(StrategyKind::Backrun.as_str(), "backrun");
    }

    #[test]
    fn test_resolve_clamps_out_of_range() {
        let space = ActionSpace::default();
        let action = ArbAction::new(0.9, 7.5, -2.0, 12.0, 0.2);
        let resolved = space.resolve(&action);

        assert_eq!(resolved.threshold, 0.005);
        assert_eq!(resolved.trade_size_index, 3);
        assert_eq!(resolved.trade_size, 10_000.0);
        assert_eq!(resolved.strategy, StrategyKind::DexArb);
        assert_eq!(resolved.priority_fee, 5.0);
        assert!(!resolved.use_flashloan);
    }

    #[test]
    fn test_resolve_truncates_selectors() {
        let space = ActionSpace::default();
        let resolved = space.resolve(&ArbAction::new(0.001, 2.99, 1.7, 2.0, 0.51));

        assert_eq!(resolved.trade_size_index, 2);
        assert_eq!(resolved.trade_size, 1000.0);
        assert_eq!(resolved.strategy, StrategyKind::Triangular);
        assert!(resolved.use_flashloan);
    }

    #[test]
    fn test_resolve_nan_falls_to_lower_bound() {
        let space = ActionSpace::default();
        let resolved = space.resolve(&ArbAction::new(f64::NAN, f64::NAN, 0.0, f64::NAN, f64::NAN));

        assert_eq!(resolved.threshold, 0.0005);
        assert_eq!(resolved.trade_size_index, 0);
        assert_eq!(resolved.priority_fee, 0.0);
        assert!(!resolved.use_flashloan);
    }

    #[test]
    fn test_bounds_follow_config() {
        let space = ActionSpace::default();
        assert_eq!(space.low(), [0.0005, 0.0, 0.0, 0.0, 0.0]);
        assert_eq!(space.high(), [0.005, 3.0, 3.0, 5.0, 1.0]);
    }

    #[test]
    fn test_from_short_slice() {
        let action = ArbAction::from_slice(&[0.001, 1.0]);
        assert_eq!(action.to_array(), [0.001, 1.0, 0.0, 0.0, 0.0]);
    }
}
