//! Simulation Configuration
//!
//! Configuration structs for the environment, cost model, reward function,
//! market sampler and action space. Defaults reproduce the reference
//! L1 mainnet economics.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Main simulation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Episode and capital settings
    pub env: EnvConfig,
    /// Trade economics
    pub costs: CostModelConfig,
    /// Reward shaping
    pub reward: RewardConfig,
    /// Market state generator
    pub sampler: SamplerConfig,
    /// Action bounds and discrete option lists
    pub actions: ActionSpaceConfig,
}

/// Environment configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvConfig {
    /// Capital available to non-flash-loan trades at episode start (USD)
    pub initial_capital: f64,
    /// Step budget per episode (truncation)
    pub max_steps: usize,
    /// Cumulative PnL below which the episode terminates (USD)
    pub daily_loss_limit: f64,
    /// Reward returned when a trade is refused for lack of capital
    pub insufficient_capital_penalty: f64,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            initial_capital: 100.0,
            max_steps: 1000,
            daily_loss_limit: -10_000.0,
            insufficient_capital_penalty: -10.0,
        }
    }
}

/// Trade cost model configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModelConfig {
    /// Network gas multiplier (1.0 = L1, ~0.01 = L2)
    pub gas_multiplier: f64,
    /// Gas units for a plain swap route
    pub swap_gas_units: f64,
    /// Gas units for a flash-loan route
    pub flashloan_gas_units: f64,
    /// Base gas price in gwei
    pub base_gas_price_gwei: f64,
    /// Extra gwei per unit of priority fee
    pub priority_fee_gwei: f64,
    /// Reference native asset price (USD)
    pub native_price_usd: f64,
    /// Pool depth in USD at liquidity factor 1.0
    pub pool_depth_usd: f64,
    /// Exponent of the price impact curve
    pub impact_exponent: f64,
    /// Flash-loan fee as a fraction of notional
    pub flashloan_fee_rate: f64,
    /// Congestion above which the busy revert probability applies
    pub congestion_threshold: f64,
    /// Revert probability when congestion exceeds the threshold
    pub busy_revert_prob: f64,
    /// Revert probability otherwise
    pub calm_revert_prob: f64,
    /// Priority fee at which the full revert reduction applies
    pub priority_fee_scale: f64,
    /// Revert reduction at `priority_fee_scale`
    pub max_priority_revert_reduction: f64,
    /// Floor on the revert probability
    pub min_revert_prob: f64,
    /// Fraction of gas burned by a reverted transaction
    pub revert_gas_fraction: f64,
}

impl Default for CostModelConfig {
    fn default() -> Self {
        Self {
            gas_multiplier: 1.0,
            swap_gas_units: 150_000.0,
            flashloan_gas_units: 300_000.0,
            base_gas_price_gwei: 20.0,
            priority_fee_gwei: 10.0,
            native_price_usd: 2500.0,
            pool_depth_usd: 10_000_000.0,
            impact_exponent: 1.5,
            flashloan_fee_rate: 0.0009,
            congestion_threshold: 0.8,
            busy_revert_prob: 0.8,
            calm_revert_prob: 0.3,
            priority_fee_scale: 5.0,
            max_priority_revert_reduction: 0.4,
            min_revert_prob: 0.1,
            revert_gas_fraction: 0.6,
        }
    }
}

/// Reward function configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RewardConfig {
    /// Flat penalty for a reverted trade
    pub revert_penalty: f64,
    /// Gas cost (USD) above which the excess is penalized
    pub gas_penalty_threshold: f64,
    /// Multiplier applied to gas cost above the threshold
    pub gas_penalty_multiplier: f64,
    /// Spread above which abstaining is penalized
    pub missed_opportunity_spread: f64,
    /// Penalty for abstaining on a large spread
    pub missed_opportunity_penalty: f64,
}

impl Default for RewardConfig {
    fn default() -> Self {
        Self {
            revert_penalty: 100.0,
            gas_penalty_threshold: 50.0,
            gas_penalty_multiplier: 2.0,
            missed_opportunity_spread: 0.01,
            missed_opportunity_penalty: 5.0,
        }
    }
}

/// Market state sampler configuration
///
/// Ranges are `[low, high)` uniform draws.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplerConfig {
    /// Probability that a step carries a real opportunity
    pub opportunity_prob: f64,
    /// Mean of the exponential spread draw for opportunities
    pub opportunity_mean_spread: f64,
    /// Upper bound of the fee-dominated noise spread
    pub noise_spread_max: f64,
    pub liquidity_range: (f64, f64),
    pub volatility_range: (f64, f64),
    pub gas_price_range: (f64, f64),
    pub congestion_range: (f64, f64),
    pub block_time_variance_range: (f64, f64),
    /// Steps per simulated day for the time-of-day phase
    pub day_length: usize,
}

impl Default for SamplerConfig {
    fn default() -> Self {
        Self {
            opportunity_prob: 0.01,
            opportunity_mean_spread: 0.002,
            noise_spread_max: 0.0005,
            liquidity_range: (0.1, 1.0),
            volatility_range: (0.0, 0.2),
            gas_price_range: (0.2, 0.8),
            congestion_range: (0.5, 1.0),
            block_time_variance_range: (0.0, 0.1),
            day_length: 24,
        }
    }
}

/// Action space configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActionSpaceConfig {
    /// Bounds of the profitability threshold
    pub threshold_range: (f64, f64),
    /// Selectable trade notionals (USD), ascending
    pub trade_sizes: Vec<f64>,
    /// Bounds of the priority fee multiplier
    pub priority_fee_range: (f64, f64),
    /// Raw value above which the flash-loan flag is set
    pub flashloan_cutoff: f64,
}

impl Default for ActionSpaceConfig {
    fn default() -> Self {
        Self {
            threshold_range: (0.0005, 0.005),
            trade_sizes: vec![50.0, 100.0, 1000.0, 10_000.0],
            priority_fee_range: (0.0, 5.0),
            flashloan_cutoff: 0.5,
        }
    }
}

/// Backtest run configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    /// Episodes to run
    pub episodes: usize,
    /// Capital at the start of the run (USD)
    pub initial_capital: f64,
    /// Seed for the first episode; entropy when unset
    pub seed: Option<u64>,
    /// Results document path
    pub output: PathBuf,
}

impl Default for BacktestConfig {
    fn default() -> Self {
        Self {
            episodes: 100,
            initial_capital: 10_000.0,
            seed: None,
            output: PathBuf::from("backtest_results.json"),
        }
    }
}

impl BacktestConfig {
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.episodes == 0 {
            errors.push("backtest.episodes must be at least 1".to_string());
        }
        if self.initial_capital <= 0.0 {
            errors.push("backtest.initial_capital must be positive".to_string());
        }
        errors
    }
}

/// Execution venue presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Venue {
    /// Mainnet gas economics
    L1,
    /// Rollup gas economics (~1% of L1)
    L2,
}

impl Venue {
    /// Gas multiplier applied by the cost model
    pub fn gas_multiplier(self) -> f64 {
        match self {
            Venue::L1 => 1.0,
            Venue::L2 => 0.01,
        }
    }
}

impl std::str::FromStr for Venue {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "l1" | "mainnet" => Ok(Venue::L1),
            "l2" | "rollup" => Ok(Venue::L2),
            other => Err(format!("unknown venue '{other}' (expected l1 or l2)")),
        }
    }
}

impl SimConfig {
    /// Collect every configuration problem
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.env.initial_capital <= 0.0 {
            errors.push("env.initial_capital must be positive".to_string());
        }
        if self.env.max_steps == 0 {
            errors.push("env.max_steps must be at least 1".to_string());
        }

        let c = &self.costs;
        if c.gas_multiplier < 0.0 {
            errors.push("costs.gas_multiplier must not be negative".to_string());
        }
        if c.pool_depth_usd <= 0.0 {
            errors.push("costs.pool_depth_usd must be positive".to_string());
        }
        if c.priority_fee_scale <= 0.0 {
            errors.push("costs.priority_fee_scale must be positive".to_string());
        }
        if c.impact_exponent <= 0.0 {
            errors.push("costs.impact_exponent must be positive".to_string());
        }
        for (name, p) in [
            ("costs.busy_revert_prob", c.busy_revert_prob),
            ("costs.calm_revert_prob", c.calm_revert_prob),
            ("costs.min_revert_prob", c.min_revert_prob),
            ("costs.revert_gas_fraction", c.revert_gas_fraction),
            ("sampler.opportunity_prob", self.sampler.opportunity_prob),
        ] {
            if !(0.0..=1.0).contains(&p) {
                errors.push(format!("{name} must be within [0, 1], got {p}"));
            }
        }

        let s = &self.sampler;
        if s.opportunity_mean_spread <= 0.0 {
            errors.push("sampler.opportunity_mean_spread must be positive".to_string());
        }
        if s.day_length == 0 {
            errors.push("sampler.day_length must be at least 1".to_string());
        }
        for (name, (lo, hi)) in [
            ("sampler.liquidity_range", s.liquidity_range),
            ("sampler.volatility_range", s.volatility_range),
            ("sampler.gas_price_range", s.gas_price_range),
            ("sampler.congestion_range", s.congestion_range),
            ("sampler.block_time_variance_range", s.block_time_variance_range),
            ("actions.threshold_range", self.actions.threshold_range),
            ("actions.priority_fee_range", self.actions.priority_fee_range),
        ] {
            if lo >= hi {
                errors.push(format!("{name} must have low < high, got ({lo}, {hi})"));
            }
        }
        if s.liquidity_range.0 <= 0.0 {
            errors.push("sampler.liquidity_range must stay above zero".to_string());
        }

        if self.actions.trade_sizes.is_empty() {
            errors.push("actions.trade_sizes must not be empty".to_string());
        } else if self
            .actions
            .trade_sizes
            .windows(2)
            .any(|w| w[0] >= w[1] || w[0] <= 0.0)
        {
            errors.push("actions.trade_sizes must be positive and ascending".to_string());
        }

        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(SimConfig::default().validate().is_empty());
    }

    #[test]
    fn test_validation_collects_all_problems() {
        let mut config = SimConfig::default();
        config.env.initial_capital = 0.0;
        config.costs.busy_revert_prob = 1.5;
        config.actions.trade_sizes = vec![100.0, 50.0];

        let errors = config.validate();
        assert_eq!(errors.len(), 3);
        assert!(errors.iter().any(|e| e.contains("initial_capital")));
        assert!(errors.iter().any(|e| e.contains("busy_revert_prob")));
        assert!(errors.iter().any(|e| e.contains("ascending")));
    }

    #[test]
    fn test_backtest_config_validation() {
        assert!(BacktestConfig::default().validate().is_empty());

        let config = BacktestConfig {
            episodes: 0,
            initial_capital: -1.0,
            ..Default::default()
        };
        assert_eq!(config.validate().len(), 2);
    }

    #[test]
    fn test_venue_presets() {
        assert_eq!("l2".parse::<Venue>().unwrap().gas_multiplier(), 0.01);
        assert_eq!("L1".parse::<Venue>().unwrap(), Venue::L1);
        assert!("l3".parse::<Venue>().is_err());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: SimConfig =
            serde_json::from_str(r#"{"costs": {"gas_multiplier": 0.01}}"#).unwrap();
        assert_eq!(config.costs.gas_multiplier, 0.01);
        assert_eq!(config.costs.swap_gas_units, 150_000.0);
        assert_eq!(config.env.max_steps, 1000);
    }
}
