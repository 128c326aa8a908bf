//! Backtesting
//!
//! Multi-episode runs of a policy against the arbitrage environment, the
//! performance metrics computed over them, and the persisted results.

pub mod metrics;
mod recorder;
mod runner;

pub use recorder::{ResultsDocument, ResultsSummary, RunMetadata};
pub use runner::{
    evaluate_policy, summarize_results, BacktestReport, BacktestResult, Backtester,
    EpisodeResult, EvaluationSummary, TradeRecord,
};
