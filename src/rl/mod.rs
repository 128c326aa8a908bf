//! Arbitrage Decision Simulation
//!
//! A gym-like environment for flash-loan arbitrage decisions and the
//! machinery to evaluate policies against it.
//!
//! # Features
//!
//! - **State Representation**: 9 normalized market features per step
//! - **Action Space**: threshold, trade size, strategy, priority fee, flash-loan flag
//! - **Cost Model**: gas, super-linear slippage, flash-loan fee and reverts
//! - **Backtesting**: trade log, capital trajectory, drawdown and Sharpe ratio

pub mod backtest;
pub mod config;
pub mod core;
pub mod environment;
pub mod policy;

// Config exports
pub use config::{
    ActionSpaceConfig, BacktestConfig, CostModelConfig, EnvConfig, RewardConfig, SamplerConfig,
    SimConfig, Venue,
};

// Core exports
pub use core::{
    ActionSpace, ArbAction, ArbRewardFunction, MarketState, ResolvedAction, RewardFunction,
    RewardSignal, StrategyKind, TradeOutcome, ACTION_DIM, STATE_DIM,
};

// Environment exports
pub use environment::{
    ArbitrageEnvironment, EpisodePhase, MarketStateSampler, StepInfo, StepReason, StepResult,
    TradeCostModel, TradeQuote,
};

// Policy exports
pub use policy::{HeuristicPolicy, LinearModel, LinearPolicy, Policy, PolicyKind, RandomPolicy};

// Backtest exports
pub use backtest::{
    evaluate_policy, summarize_results, BacktestReport, BacktestResult, Backtester,
    EpisodeResult, EvaluationSummary, ResultsDocument, TradeRecord,
};
