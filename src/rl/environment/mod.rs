//! Simulated Arbitrage Environment
//!
//! This module provides a gym-like environment over synthetic market
//! conditions for evaluating arbitrage decision policies without risking
//! real capital.

mod arbitrage;
mod costs;
mod market;

pub use arbitrage::{ArbitrageEnvironment, EpisodePhase, StepInfo, StepReason, StepResult};
pub use costs::{TradeCostModel, TradeQuote};
pub use market::{EpisodeCounters, MarketStateSampler};
