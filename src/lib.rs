pub mod cli;
pub mod config;
pub mod error;
pub mod rl;

pub use config::{AppConfig, LoggingConfig};
pub use error::{Result, SimError};
pub use rl::{
    ArbAction, ArbitrageEnvironment, BacktestReport, Backtester, MarketState, Policy, SimConfig,
};
