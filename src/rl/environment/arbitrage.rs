//! Arbitrage Simulation Environment
//!
//! Provides a gym-like interface with reset/step over the market sampler,
//! the trade cost model and the reward function.

use std::fmt;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::costs::TradeCostModel;
use super::market::{EpisodeCounters, MarketStateSampler};
use crate::rl::config::{EnvConfig, SimConfig};
use crate::rl::core::{
    ActionSpace, ArbAction, ArbRewardFunction, MarketState, RewardFunction, StrategyKind,
    TradeOutcome,
};

/// Lifecycle of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpisodePhase {
    /// Freshly reset, no step taken
    Reset,
    /// At least one step taken, still running
    Active,
    /// Loss limit breached
    Terminated,
    /// Step budget exhausted
    Truncated,
}

/// Why a step short-circuited before the cost model ran
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepReason {
    /// Non-flash-loan notional above available capital
    InsufficientCapital,
}

impl StepReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InsufficientCapital => "insufficient_capital",
        }
    }
}

/// Additional step information
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    /// PnL of this step's trade (0 when no trade)
    pub pnl: f64,
    /// Gas burned by this step's trade
    pub gas_cost: f64,
    pub success: bool,
    pub reverted: bool,
    /// Trade cleared the threshold gate and was sent
    pub attempted: bool,
    /// Set when the step was refused before pricing
    pub reason: Option<StepReason>,
    /// Strategy label chosen by the action
    pub strategy: StrategyKind,
    /// Notional selected by the action (USD)
    pub trade_size: f64,
    /// Cumulative PnL this episode
    pub total_pnl: f64,
    /// Cumulative gas this episode
    pub total_gas: f64,
    pub num_successes: usize,
    pub num_reverts: usize,
    /// Steps taken this episode
    pub step: usize,
}

/// Result of taking a step in the environment
#[derive(Debug, Clone, PartialEq)]
pub struct StepResult {
    /// Market state for the next decision
    pub observation: MarketState,
    /// Reward signal
    pub reward: f64,
    /// Episode ended on the loss limit
    pub terminated: bool,
    /// Episode ended on the step budget
    pub truncated: bool,
    /// Additional info
    pub info: StepInfo,
}

impl StepResult {
    pub fn done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Arbitrage environment
///
/// Owns its generator; `reset(Some(seed))` makes the rest of the episode
/// reproducible for a fixed action sequence.
pub struct ArbitrageEnvironment {
    config: EnvConfig,
    action_space: ActionSpace,
    sampler: MarketStateSampler,
    cost_model: TradeCostModel,
    reward_fn: Box<dyn RewardFunction>,
    rng: ChaCha8Rng,
    state: MarketState,
    counters: EpisodeCounters,
    total_pnl: f64,
    total_gas: f64,
    phase: EpisodePhase,
}

impl ArbitrageEnvironment {
    /// Create a new environment seeded from OS entropy
    pub fn new(config: SimConfig) -> Self {
        Self::with_rng(config, ChaCha8Rng::from_entropy())
    }

    /// Create a new environment with a fixed seed
    pub fn with_seed(config: SimConfig, seed: u64) -> Self {
        Self::with_rng(config, ChaCha8Rng::seed_from_u64(seed))
    }

    fn with_rng(config: SimConfig, rng: ChaCha8Rng) -> Self {
        let mut env = Self {
            config: config.env,
            action_space: ActionSpace::new(config.actions),
            sampler: MarketStateSampler::new(config.sampler),
            cost_model: TradeCostModel::new(config.costs),
            reward_fn: Box::new(ArbRewardFunction::with_config(config.reward)),
            rng,
            state: MarketState::default(),
            counters: EpisodeCounters::default(),
            total_pnl: 0.0,
            total_gas: 0.0,
            phase: EpisodePhase::Reset,
        };
        env.state = env.sampler.sample(&mut env.rng, &env.counters);
        env
    }

    /// Replace the reward function
    pub fn with_reward_function(mut self, reward_fn: Box<dyn RewardFunction>) -> Self {
        self.reward_fn = reward_fn;
        self
    }

    /// Reset the environment for a new episode
    ///
    /// Without a seed the generator continues its current stream.
    pub fn reset(&mut self, seed: Option<u64>) -> MarketState {
        if let Some(seed) = seed {
            self.rng = ChaCha8Rng::seed_from_u64(seed);
        }

        self.counters = EpisodeCounters::default();
        self.total_pnl = 0.0;
        self.total_gas = 0.0;
        self.phase = EpisodePhase::Reset;
        self.state = self.sampler.sample(&mut self.rng, &self.counters);

        self.state
    }

    /// Take a step in the environment
    pub fn step(&mut self, action: &ArbAction) -> StepResult {
        let resolved = self.action_space.resolve(action);

        if !resolved.use_flashloan && resolved.trade_size > self.available_capital() {
            return StepResult {
                observation: self.state,
                reward: self.config.insufficient_capital_penalty,
                terminated: false,
                truncated: false,
                info: StepInfo {
                    reason: Some(StepReason::InsufficientCapital),
                    strategy: resolved.strategy,
                    trade_size: resolved.trade_size,
                    ..self.running_info()
                },
            };
        }

        let acted_on = self.state;
        let outcome = self.cost_model.evaluate(&resolved, &acted_on, &mut self.rng);
        let reward = self.reward_fn.compute(&outcome, &acted_on);

        self.apply(&outcome);
        self.state = self.sampler.sample(&mut self.rng, &self.counters);

        let terminated = self.total_pnl < self.config.daily_loss_limit;
        let truncated = self.counters.step >= self.config.max_steps;
        self.phase = if terminated {
            EpisodePhase::Terminated
        } else if truncated {
            EpisodePhase::Truncated
        } else {
            EpisodePhase::Active
        };

        if outcome.attempted {
            debug!(
                step = self.counters.step,
                strategy = resolved.strategy.as_str(),
                size = resolved.trade_size,
                flashloan = resolved.use_flashloan,
                pnl = outcome.pnl,
                gas = outcome.gas_cost,
                reverted = outcome.reverted,
                "trade attempted"
            );
        }

        StepResult {
            observation: self.state,
            reward: reward.total,
            terminated,
            truncated,
            info: StepInfo {
                pnl: outcome.pnl,
                gas_cost: outcome.gas_cost,
                success: outcome.success,
                reverted: outcome.reverted,
                attempted: outcome.attempted,
                strategy: resolved.strategy,
                trade_size: resolved.trade_size,
                ..self.running_info()
            },
        }
    }

    fn apply(&mut self, outcome: &TradeOutcome) {
        self.counters.step += 1;
        self.total_pnl += outcome.pnl;
        self.total_gas += outcome.gas_cost;
        if outcome.success {
            self.counters.successes += 1;
        }
        if outcome.reverted {
            self.counters.reverts += 1;
        }
    }

    fn running_info(&self) -> StepInfo {
        StepInfo {
            total_pnl: self.total_pnl,
            total_gas: self.total_gas,
            num_successes: self.counters.successes,
            num_reverts: self.counters.reverts,
            step: self.counters.step,
            ..Default::default()
        }
    }

    /// Set the capital the next episode starts from
    pub fn set_initial_capital(&mut self, capital: f64) {
        self.config.initial_capital = capital;
    }

    /// Capital available to a non-flash-loan trade
    pub fn available_capital(&self) -> f64 {
        self.config.initial_capital + self.total_pnl
    }

    /// Get current observation
    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn phase(&self) -> EpisodePhase {
        self.phase
    }

    pub fn action_space(&self) -> &ActionSpace {
        &self.action_space
    }

    pub fn cost_model(&self) -> &TradeCostModel {
        &self.cost_model
    }

    pub fn config(&self) -> &EnvConfig {
        &self.config
    }

    /// Get episode PnL
    pub fn episode_pnl(&self) -> f64 {
        self.total_pnl
    }

    /// Get episode gas spend
    pub fn episode_gas(&self) -> f64 {
        self.total_gas
    }

    /// Get step count
    pub fn step_count(&self) -> usize {
        self.counters.step
    }

    pub fn num_successes(&self) -> usize {
        self.counters.successes
    }

    pub fn num_reverts(&self) -> usize {
        self.counters.reverts
    }
}

impl fmt::Display for ArbitrageEnvironment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Step: {}, Total PnL: ${:.2}, Successes: {}, Reverts: {}",
            self.counters.step, self.total_pnl, self.counters.successes, self.counters.reverts
        )
    }
}
