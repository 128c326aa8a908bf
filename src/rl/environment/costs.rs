//! Trade Cost Model
//!
//! Prices a single arbitrage attempt: gas, super-linear slippage, flash-loan
//! fee and a congestion-driven revert draw. Pricing (`quote`) is pure; only
//! `evaluate` consumes randomness.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::rl::config::CostModelConfig;
use crate::rl::core::{MarketState, ResolvedAction, TradeOutcome};

/// Deterministic price breakdown of a trade that cleared the threshold gate
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TradeQuote {
    pub trade_size: f64,
    pub gas_units: f64,
    pub gas_price_gwei: f64,
    pub gas_cost: f64,
    pub pool_depth: f64,
    pub price_impact: f64,
    pub slippage: f64,
    pub flashloan_fee: f64,
    pub gross_profit: f64,
    /// Gross profit less slippage, gas and flash-loan fee
    pub net_profit: f64,
    pub revert_probability: f64,
}

/// Trade transition function
#[derive(Debug, Clone, Default)]
pub struct TradeCostModel {
    config: CostModelConfig,
}

impl TradeCostModel {
    pub fn new(config: CostModelConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CostModelConfig {
        &self.config
    }

    /// Price a trade, or `None` when the spread does not clear the threshold
    pub fn quote(&self, action: &ResolvedAction, state: &MarketState) -> Option<TradeQuote> {
        if state.spread < action.threshold {
            return None;
        }

        let c = &self.config;
        let trade_size = action.trade_size;

        let base_units = if action.use_flashloan {
            c.flashloan_gas_units
        } else {
            c.swap_gas_units
        };
        let gas_units = base_units * c.gas_multiplier;
        let gas_price_gwei = c.base_gas_price_gwei + action.priority_fee * c.priority_fee_gwei;
        let gas_cost = gas_units * gas_price_gwei * 1e-9 * c.native_price_usd;

        let pool_depth = state.liquidity * c.pool_depth_usd;
        let price_impact = if pool_depth > 0.0 {
            (trade_size / pool_depth).powf(c.impact_exponent)
        } else {
            // An empty pool absorbs the whole notional
            1.0
        };
        let slippage = trade_size * price_impact;

        let flashloan_fee = if action.use_flashloan {
            trade_size * c.flashloan_fee_rate
        } else {
            0.0
        };

        let gross_profit = trade_size * state.spread;
        let net_profit = gross_profit - slippage - gas_cost - flashloan_fee;

        Some(TradeQuote {
            trade_size,
            gas_units,
            gas_price_gwei,
            gas_cost,
            pool_depth,
            price_impact,
            slippage,
            flashloan_fee,
            gross_profit,
            net_profit,
            revert_probability: self.revert_probability(action.priority_fee, state.congestion),
        })
    }

    /// Probability that a sent transaction reverts
    pub fn revert_probability(&self, priority_fee: f64, congestion: f64) -> f64 {
        let c = &self.config;
        let base = if congestion > c.congestion_threshold {
            c.busy_revert_prob
        } else {
            c.calm_revert_prob
        };
        let reduction = (priority_fee / c.priority_fee_scale) * c.max_priority_revert_reduction;
        (base - reduction).max(c.min_revert_prob).clamp(0.0, 1.0)
    }

    /// Turn a quote into an outcome given the revert draw
    pub fn settle(&self, quote: &TradeQuote, reverted: bool) -> TradeOutcome {
        if reverted {
            TradeOutcome::reverted(quote.gas_cost * self.config.revert_gas_fraction)
        } else {
            TradeOutcome::executed(quote.net_profit, quote.gas_cost)
        }
    }

    /// Full stochastic evaluation of one step
    ///
    /// Gated steps consume no randomness.
    pub fn evaluate<R: Rng>(
        &self,
        action: &ResolvedAction,
        state: &MarketState,
        rng: &mut R,
    ) -> TradeOutcome {
        match self.quote(action, state) {
            Some(quote) => {
                let reverted = rng.gen::<f64>() < quote.revert_probability;
                self.settle(&quote, reverted)
            }
            None => TradeOutcome::no_trade(),
        }
    }
}
