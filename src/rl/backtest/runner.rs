//! Backtest Runner
//!
//! Drives episodes of the arbitrage environment against a policy and
//! accumulates the trade log and capital trajectory across the whole run.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::metrics;
use crate::rl::config::{BacktestConfig, SimConfig};
use crate::rl::environment::ArbitrageEnvironment;
use crate::rl::policy::Policy;

/// Episodes between progress log lines
const PROGRESS_INTERVAL: usize = 10;
/// Trade PnL (USD) logged as a big win
const BIG_WIN_PNL: f64 = 5.0;

/// One attempted trade
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRecord {
    pub episode: usize,
    /// Episode step, counting capital-guard steps
    pub step: usize,
    pub pnl: f64,
    pub gas_cost: f64,
    pub success: bool,
    /// Run capital after this trade settled
    pub capital_after: f64,
}

/// Aggregate trade statistics
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    pub total_trades: usize,
    pub successful_trades: usize,
    pub failed_trades: usize,
    /// Sum of trade PnL, gas already netted
    pub total_pnl: f64,
    /// Informational gas total, not subtracted again
    pub total_gas_spent: f64,
    pub net_pnl: f64,
    pub win_rate: f64,
    pub avg_profit_per_trade: f64,
    /// Percent, in [0, 100]
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub trades: Vec<TradeRecord>,
}

impl BacktestResult {
    /// Compute aggregates from a trade log and capital trajectory
    pub fn from_trades(trades: Vec<TradeRecord>, capital_history: &[f64]) -> Self {
        let total_trades = trades.len();
        let successful_trades = trades.iter().filter(|t| t.success).count();
        let total_pnl: f64 = trades.iter().map(|t| t.pnl).sum();
        let total_gas_spent: f64 = trades.iter().map(|t| t.gas_cost).sum();
        let pnls: Vec<f64> = trades.iter().map(|t| t.pnl).collect();

        Self {
            total_trades,
            successful_trades,
            failed_trades: total_trades - successful_trades,
            total_pnl,
            total_gas_spent,
            net_pnl: total_pnl,
            win_rate: metrics::win_rate(successful_trades, total_trades),
            avg_profit_per_trade: metrics::avg_profit(total_pnl, total_trades),
            max_drawdown: metrics::max_drawdown(capital_history),
            sharpe_ratio: metrics::sharpe_ratio(&pnls),
            trades,
        }
    }
}

/// Full outcome of a backtest run
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestReport {
    pub result: BacktestResult,
    pub initial_capital: f64,
    pub final_capital: f64,
    /// Starts with the initial capital, one entry per recorded trade
    pub capital_history: Vec<f64>,
    pub episodes_run: usize,
    /// Run ended with capital exhausted
    pub bankrupt: bool,
}

impl BacktestReport {
    pub fn return_pct(&self) -> f64 {
        if self.initial_capital == 0.0 {
            return 0.0;
        }
        (self.final_capital / self.initial_capital - 1.0) * 100.0
    }
}

/// Backtester
///
/// One engine for every variant; policies and venue economics are
/// substituted through the constructor.
pub struct Backtester {
    env: ArbitrageEnvironment,
    policy: Box<dyn Policy>,
    config: BacktestConfig,
}

impl Backtester {
    pub fn new(sim: SimConfig, config: BacktestConfig, policy: Box<dyn Policy>) -> Self {
        let env = match config.seed {
            Some(seed) => ArbitrageEnvironment::with_seed(sim, seed),
            None => ArbitrageEnvironment::new(sim),
        };
        Self {
            env,
            policy,
            config,
        }
    }

    pub fn config(&self) -> &BacktestConfig {
        &self.config
    }

    pub fn environment(&self) -> &ArbitrageEnvironment {
        &self.env
    }

    pub fn policy_label(&self) -> &'static str {
        self.policy.label()
    }

    /// Run every configured episode
    pub fn run(&mut self) -> BacktestReport {
        let episodes = self.config.episodes;
        let initial_capital = self.config.initial_capital;
        let max_steps = self.env.config().max_steps;

        info!(
            episodes,
            initial_capital,
            policy = self.policy.label(),
            gas_multiplier = self.env.cost_model().config().gas_multiplier,
            "Starting backtest"
        );

        let mut capital = initial_capital;
        let mut capital_history = vec![initial_capital];
        let mut trades = Vec::new();
        let mut episodes_run = 0;

        for episode in 0..episodes {
            if capital <= 0.0 {
                warn!(episode, capital, "Capital exhausted, stopping backtest");
                break;
            }

            self.env.set_initial_capital(capital);
            let seed = if episode == 0 { self.config.seed } else { None };
            let mut state = self.env.reset(seed);
            self.policy.observe_capital(capital);

            // Capital-guard steps do not advance the environment, so the
            // runner bounds the loop itself.
            for step in 0..max_steps {
                let action = self.policy.choose(&state);
                let result = self.env.step(&action);
                let info = &result.info;

                if info.pnl != 0.0 {
                    capital += info.pnl;
                    capital_history.push(capital);
                    trades.push(TradeRecord {
                        episode,
                        step,
                        pnl: info.pnl,
                        gas_cost: info.gas_cost,
                        success: info.success,
                        capital_after: capital,
                    });

                    if info.pnl > BIG_WIN_PNL {
                        info!(
                            episode,
                            step,
                            pnl = info.pnl,
                            strategy = info.strategy.as_str(),
                            "Big win"
                        );
                    }
                    self.policy.observe_capital(capital);
                }

                state = result.observation;

                if capital <= 0.0 {
                    warn!(episode, capital, "Bankrupt, ending episode");
                    break;
                }
                if result.done() {
                    break;
                }
            }

            episodes_run += 1;
            debug!(episode, "{}", self.env);

            if (episode + 1) % PROGRESS_INTERVAL == 0 {
                info!(
                    "Episode {}/{}: Capital=${:.2}, Trades={}, Win Rate={:.1}%",
                    episode + 1,
                    episodes,
                    capital,
                    trades.len(),
                    metrics::win_rate(
                        trades.iter().filter(|t: &&TradeRecord| t.success).count(),
                        trades.len()
                    ) * 100.0
                );
            }
        }

        let bankrupt = capital <= 0.0;
        if bankrupt {
            warn!(episodes_run, capital, "Backtest ended bankrupt");
        }

        let result = BacktestResult::from_trades(trades, &capital_history);
        info!(
            trades = result.total_trades,
            net_pnl = result.net_pnl,
            sharpe = result.sharpe_ratio,
            max_drawdown = result.max_drawdown,
            "Backtest complete"
        );

        BacktestReport {
            result,
            initial_capital,
            final_capital: capital,
            capital_history,
            episodes_run,
            bankrupt,
        }
    }
}

/// Outcome of one evaluation episode
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EpisodeResult {
    pub total_reward: f64,
    /// Steps taken
    pub length: usize,
    pub final_pnl: f64,
    pub num_successes: usize,
    pub num_reverts: usize,
}

/// Averages over evaluation episodes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvaluationSummary {
    pub num_episodes: usize,
    pub avg_reward: f64,
    pub avg_pnl: f64,
    pub avg_length: f64,
    pub avg_successes: f64,
    pub avg_reverts: f64,
}

/// Run full episodes of a policy and report per-episode totals
///
/// Only the first episode is reseeded; later ones continue the stream.
pub fn evaluate_policy(
    env: &mut ArbitrageEnvironment,
    policy: &mut dyn Policy,
    episodes: usize,
    seed: Option<u64>,
) -> Vec<EpisodeResult> {
    let max_steps = env.config().max_steps;
    let mut results = Vec::with_capacity(episodes);

    for episode in 0..episodes {
        let mut state = env.reset(if episode == 0 { seed } else { None });
        policy.observe_capital(env.available_capital());
        let mut total_reward = 0.0;

        for _ in 0..max_steps {
            let action = policy.choose(&state);
            let result = env.step(&action);
            total_reward += result.reward;
            state = result.observation;
            if result.info.pnl != 0.0 {
                policy.observe_capital(env.available_capital());
            }
            if result.done() {
                break;
            }
        }

        let episode_result = EpisodeResult {
            total_reward,
            length: env.step_count(),
            final_pnl: env.episode_pnl(),
            num_successes: env.num_successes(),
            num_reverts: env.num_reverts(),
        };
        info!(
            "Episode {}: Reward={:.2}, PnL=${:.2}, Successes={}, Reverts={}",
            episode + 1,
            episode_result.total_reward,
            episode_result.final_pnl,
            episode_result.num_successes,
            episode_result.num_reverts
        );
        results.push(episode_result);
    }

    results
}

/// Summarize evaluation results
pub fn summarize_results(results: &[EpisodeResult]) -> EvaluationSummary {
    if results.is_empty() {
        return EvaluationSummary::default();
    }

    let n = results.len() as f64;
    EvaluationSummary {
        num_episodes: results.len(),
        avg_reward: results.iter().map(|r| r.total_reward).sum::<f64>() / n,
        avg_pnl: results.iter().map(|r| r.final_pnl).sum::<f64>() / n,
        avg_length: results.iter().map(|r| r.length as f64).sum::<f64>() / n,
        avg_successes: results.iter().map(|r| r.num_successes as f64).sum::<f64>() / n,
        avg_reverts: results.iter().map(|r| r.num_reverts as f64).sum::<f64>() / n,
    }
}
