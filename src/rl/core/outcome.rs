//! Trade Outcome
//!
//! Economic result of one step.

use serde::{Deserialize, Serialize};

/// Result of attempting (or declining) a trade
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TradeOutcome {
    /// Whether the trade passed the threshold gate and was sent
    pub attempted: bool,
    /// Trade executed without reverting
    pub success: bool,
    /// Signed PnL in USD, gas already netted in
    pub pnl: f64,
    /// Gas burned in USD (partial gas for reverts)
    pub gas_cost: f64,
    /// Transaction reverted on chain
    pub reverted: bool,
}

impl TradeOutcome {
    /// Zero-valued outcome for a step where no trade was sent
    pub fn no_trade() -> Self {
        Self::default()
    }

    /// Reverted transaction burning `gas_cost`
    pub fn reverted(gas_cost: f64) -> Self {
        Self {
            attempted: true,
            success: false,
            pnl: -gas_cost,
            gas_cost,
            reverted: true,
        }
    }

    /// Executed transaction
    pub fn executed(pnl: f64, gas_cost: f64) -> Self {
        Self {
            attempted: true,
            success: true,
            pnl,
            gas_cost,
            reverted: false,
        }
    }
}
