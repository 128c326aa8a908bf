//! Core RL abstractions
//!
//! Fundamental types for state representation, actions, outcomes and rewards.

pub mod action;
pub mod outcome;
pub mod reward;
pub mod state;

pub use action::{ActionSpace, ArbAction, ResolvedAction, StrategyKind, ACTION_DIM};
pub use outcome::TradeOutcome;
pub use reward::{ArbRewardFunction, RewardFunction, RewardSignal};
pub use state::{MarketState, STATE_DIM};
