use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::AppConfig;
use crate::rl::config::Venue;
use crate::rl::policy::PolicyKind;

#[derive(Parser, Debug)]
#[command(name = "arbsim")]
#[command(version = "0.1.0")]
#[command(about = "Flash-loan arbitrage decision simulator and backtester", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Configuration directory (default.toml, <ARBSIM_ENV>.toml)
    #[arg(short, long, default_value = "config", env = "ARBSIM_CONFIG_DIR")]
    pub config: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a multi-episode backtest and write the results document
    Backtest {
        #[command(flatten)]
        run: RunArgs,
        /// Results document path
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Initial capital in USD
        #[arg(long)]
        capital: Option<f64>,
        /// Verbose output (per-trade detail)
        #[arg(short, long)]
        verbose: bool,
    },
    /// Evaluate a policy over full episodes
    Evaluate {
        #[command(flatten)]
        run: RunArgs,
    },
    /// Print the effective configuration
    Config,
}

/// Options shared by backtest and evaluate
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Number of episodes
    #[arg(short, long)]
    pub episodes: Option<usize>,
    /// Step budget per episode
    #[arg(long)]
    pub steps: Option<usize>,
    /// Network gas multiplier (overrides --venue)
    #[arg(long)]
    pub gas_multiplier: Option<f64>,
    /// Execution venue preset (l1, l2)
    #[arg(long)]
    pub venue: Option<Venue>,
    /// Decision policy (random, heuristic, model)
    #[arg(short, long, default_value = "heuristic")]
    pub policy: PolicyKind,
    /// Model file for the model policy
    #[arg(short, long)]
    pub model: Option<PathBuf>,
    /// Random seed
    #[arg(short, long)]
    pub seed: Option<u64>,
}

impl RunArgs {
    /// Apply command-line overrides on top of loaded configuration
    pub fn apply(&self, config: &mut AppConfig) {
        if let Some(episodes) = self.episodes {
            config.backtest.episodes = episodes;
        }
        if let Some(steps) = self.steps {
            config.sim.env.max_steps = steps;
        }
        if let Some(venue) = self.venue {
            config.sim.costs.gas_multiplier = venue.gas_multiplier();
        }
        if let Some(multiplier) = self.gas_multiplier {
            config.sim.costs.gas_multiplier = multiplier;
        }
        if self.seed.is_some() {
            config.backtest.seed = self.seed;
        }
    }
}
