//! Decision Policies
//!
//! A policy maps an observed market state to a raw action. The environment
//! clamps every component, so policies may propose anything.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Result, SimError};
use crate::rl::core::{ActionSpace, ArbAction, MarketState, ACTION_DIM, STATE_DIM};

/// Decision policy driven by the backtester
#[cfg_attr(test, mockall::automock)]
pub trait Policy: Send {
    /// Choose a raw action for the observed state
    fn choose(&mut self, state: &MarketState) -> ArbAction;

    /// Receive the capital available before the next decision
    fn observe_capital(&mut self, _capital: f64) {}

    /// Short label used in logs and results metadata
    fn label(&self) -> &'static str;
}

/// Which policy a run uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PolicyKind {
    Random,
    Heuristic,
    Model,
}

impl PolicyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::Heuristic => "heuristic",
            Self::Model => "model",
        }
    }
}

impl PolicyKind {
    /// Construct the policy for a run
    pub fn build(
        self,
        action_space: &ActionSpace,
        initial_capital: f64,
        seed: Option<u64>,
        model: Option<&Path>,
    ) -> Result<Box<dyn Policy>> {
        match self {
            Self::Random => Ok(Box::new(RandomPolicy::new(action_space, seed))),
            Self::Heuristic => Ok(Box::new(HeuristicPolicy::new(action_space, initial_capital))),
            Self::Model => {
                let path = model.ok_or_else(|| {
                    SimError::ModelLoad("the model policy needs a model file".to_string())
                })?;
                Ok(Box::new(LinearPolicy::load(path, action_space)?))
            }
        }
    }
}

impl std::str::FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "random" => Ok(Self::Random),
            "heuristic" | "rule" => Ok(Self::Heuristic),
            "model" | "trained" => Ok(Self::Model),
            other => Err(format!(
                "unknown policy '{other}' (expected random, heuristic or model)"
            )),
        }
    }
}

/// Stream index the random policy reads, disjoint from the environment's
pub const RANDOM_POLICY_STREAM: u64 = 1;

/// Uniform sampler over the action bounds
///
/// A shared seed selects the same key as the environment generator but a
/// separate ChaCha stream, so actions never replay market draws.
pub struct RandomPolicy {
    low: [f64; ACTION_DIM],
    high: [f64; ACTION_DIM],
    rng: ChaCha8Rng,
}

impl RandomPolicy {
    pub fn new(action_space: &ActionSpace, seed: Option<u64>) -> Self {
        let mut rng = match seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        rng.set_stream(RANDOM_POLICY_STREAM);
        Self {
            low: action_space.low(),
            high: action_space.high(),
            rng,
        }
    }
}

impl Policy for RandomPolicy {
    fn choose(&mut self, _state: &MarketState) -> ArbAction {
        let mut values = [0.0; ACTION_DIM];
        for (i, value) in values.iter_mut().enumerate() {
            *value = if self.high[i] > self.low[i] {
                self.rng.gen_range(self.low[i]..self.high[i])
            } else {
                self.low[i]
            };
        }
        ArbAction::from_slice(&values)
    }

    fn label(&self) -> &'static str {
        "random"
    }
}

/// Capital-tiered rule
///
/// Trades the largest affordable size at the lowest threshold and highest
/// priority fee once the spread clears `min_spread`; abstains otherwise.
pub struct HeuristicPolicy {
    min_spread: f64,
    trade_sizes: Vec<f64>,
    threshold: f64,
    priority_fee: f64,
    abstain_threshold: f64,
    capital: f64,
}

impl HeuristicPolicy {
    pub const DEFAULT_MIN_SPREAD: f64 = 0.001;

    pub fn new(action_space: &ActionSpace, initial_capital: f64) -> Self {
        let low = action_space.low();
        let high = action_space.high();
        Self {
            min_spread: Self::DEFAULT_MIN_SPREAD,
            trade_sizes: action_space.trade_sizes().to_vec(),
            threshold: low[0],
            priority_fee: high[3],
            // Clamped down to the threshold ceiling by the environment
            abstain_threshold: 0.9,
            capital: initial_capital,
        }
    }

    pub fn with_min_spread(mut self, min_spread: f64) -> Self {
        self.min_spread = min_spread;
        self
    }

    /// Index of the largest trade size not above current capital
    pub fn size_tier(&self) -> usize {
        self.trade_sizes
            .iter()
            .rposition(|&size| size <= self.capital)
            .unwrap_or(0)
    }
}

impl Policy for HeuristicPolicy {
    fn choose(&mut self, state: &MarketState) -> ArbAction {
        if state.spread >= self.min_spread {
            ArbAction::new(
                self.threshold,
                self.size_tier() as f64,
                0.0,
                self.priority_fee,
                0.0,
            )
        } else {
            ArbAction::new(self.abstain_threshold, 0.0, 0.0, 0.0, 0.0)
        }
    }

    fn observe_capital(&mut self, capital: f64) {
        self.capital = capital;
    }

    fn label(&self) -> &'static str {
        "heuristic"
    }
}

/// Serialized linear model produced by an external trainer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearModel {
    /// One row of state weights per action component
    pub weights: Vec<Vec<f64>>,
    pub bias: Vec<f64>,
}

impl LinearModel {
    fn check_dimensions(&self) -> Result<()> {
        if self.weights.len() != ACTION_DIM || self.bias.len() != ACTION_DIM {
            return Err(SimError::ModelLoad(format!(
                "expected {} weight rows and bias terms, got {} and {}",
                ACTION_DIM,
                self.weights.len(),
                self.bias.len()
            )));
        }
        if let Some((row, w)) = self
            .weights
            .iter()
            .enumerate()
            .find(|(_, w)| w.len() != STATE_DIM)
        {
            return Err(SimError::ModelLoad(format!(
                "weight row {} has {} entries, expected {}",
                row,
                w.len(),
                STATE_DIM
            )));
        }
        Ok(())
    }
}

/// Trained decision model
///
/// Each action component is `sigmoid(w · s + b)` rescaled into its bounds.
pub struct LinearPolicy {
    model: LinearModel,
    low: [f64; ACTION_DIM],
    high: [f64; ACTION_DIM],
}

impl std::fmt::Debug for LinearPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LinearPolicy")
            .field("low", &self.low)
            .field("high", &self.high)
            .finish()
    }
}

impl LinearPolicy {
    pub fn new(model: LinearModel, action_space: &ActionSpace) -> Result<Self> {
        model.check_dimensions()?;
        Ok(Self {
            model,
            low: action_space.low(),
            high: action_space.high(),
        })
    }

    /// Parse a model from JSON text
    pub fn from_json(json: &str, action_space: &ActionSpace) -> Result<Self> {
        let model: LinearModel = serde_json::from_str(json)
            .map_err(|e| SimError::ModelLoad(format!("invalid model file: {e}")))?;
        Self::new(model, action_space)
    }

    /// Load a model file
    pub fn load(path: impl AsRef<Path>, action_space: &ActionSpace) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| SimError::ModelLoad(format!("{}: {e}", path.display())))?;
        let policy = Self::from_json(&json, action_space)?;
        info!("Loaded linear policy from {}", path.display());
        Ok(policy)
    }

    pub fn model(&self) -> &LinearModel {
        &self.model
    }
}

impl Policy for LinearPolicy {
    fn choose(&mut self, state: &MarketState) -> ArbAction {
        let features = state.to_array();
        let mut values = [0.0; ACTION_DIM];

        for (i, value) in values.iter_mut().enumerate() {
            let z = self.model.weights[i]
                .iter()
                .zip(features.iter())
                .map(|(w, x)| w * x)
                .sum::<f64>()
                + self.model.bias[i];
            *value = self.low[i] + sigmoid(z) * (self.high[i] - self.low[i]);
        }

        ArbAction::from_slice(&values)
    }

    fn label(&self) -> &'static str {
        "model"
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::core::StrategyKind;

    fn zero_model() -> LinearModel {
        LinearModel {
            weights: vec![vec![0.0; STATE_DIM]; ACTION_DIM],
            bias: vec![0.0; ACTION_DIM],
        }
    }

    #[test]
    fn test_random_policy_within_bounds() {
        let space = ActionSpace::default();
        let mut policy = RandomPolicy::new(&space, Some(3));
        let low = space.low();
        let high = space.high();

        for _ in 0..1000 {
            let action = policy.choose(&MarketState::default()).to_array();
            for i in 0..ACTION_DIM {
                assert!(action[i] >= low[i] && action[i] <= high[i]);
            }
        }
    }

    #[test]
    fn test_random_policy_seeded() {
        let space = ActionSpace::default();
        let mut a = RandomPolicy::new(&space, Some(8));
        let mut b = RandomPolicy::new(&space, Some(8));
        let state = MarketState::default();

        for _ in 0..20 {
            assert_eq!(a.choose(&state), b.choose(&state));
        }
    }

    #[test]
    fn test_random_policy_stream_independent_of_environment() {
        let space = ActionSpace::default();
        let low = space.low();
        let high = space.high();

        let mut env_rng = ChaCha8Rng::seed_from_u64(42);
        let env_draw: f64 = env_rng.gen();
        let mut policy = RandomPolicy::new(&space, Some(42));
        let action = policy.choose(&MarketState::default());

        let policy_draw = (action.threshold - low[0]) / (high[0] - low[0]);
        assert!((policy_draw - env_draw).abs() > 1e-9);

        let mut other = RandomPolicy::new(&space, Some(43));
        assert_ne!(other.choose(&MarketState::default()), action);
    }

    #[test]
    fn test_heuristic_capital_tiers() {
        let space = ActionSpace::default();
        let mut policy = HeuristicPolicy::new(&space, 100.0);
        assert_eq!(policy.size_tier(), 1);

        policy.observe_capital(25_000.0);
        assert_eq!(policy.size_tier(), 3);
        policy.observe_capital(1_500.0);
        assert_eq!(policy.size_tier(), 2);
        policy.observe_capital(20.0);
        assert_eq!(policy.size_tier(), 0);
    }

    #[test]
    fn test_heuristic_trades_on_wide_spread() {
        let space = ActionSpace::default();
        let mut policy = HeuristicPolicy::new(&space, 2_000.0);

        let wide = MarketState {
            spread: 0.004,
            ..Default::default()
        };
        let resolved = space.resolve(&policy.choose(&wide));
        assert_eq!(resolved.threshold, 0.0005);
        assert_eq!(resolved.trade_size, 1000.0);
        assert_eq!(resolved.priority_fee, 5.0);
        assert_eq!(resolved.strategy, StrategyKind::DexArb);
        assert!(!resolved.use_flashloan);
    }

    #[test]
    fn test_heuristic_abstains_on_narrow_spread() {
        let space = ActionSpace::default();
        let mut policy = HeuristicPolicy::new(&space, 2_000.0);

        let narrow = MarketState {
            spread: 0.0004,
            ..Default::default()
        };
        let resolved = space.resolve(&policy.choose(&narrow));
        assert_eq!(resolved.threshold, 0.005);
        assert_eq!(resolved.trade_size_index, 0);
    }

    #[test]
    fn test_linear_policy_midpoint() {
        let space = ActionSpace::default();
        let mut policy = LinearPolicy::new(zero_model(), &space).unwrap();

        let action = policy.choose(&MarketState::default());
        assert!((action.threshold - 0.00275).abs() < 1e-12);
        assert!((action.trade_size - 1.5).abs() < 1e-12);
        assert!((action.priority_fee - 2.5).abs() < 1e-12);
        assert!((action.flashloan - 0.5).abs() < 1e-12);
        assert!(!space.resolve(&action).use_flashloan);
    }

    #[test]
    fn test_linear_policy_rejects_bad_shape() {
        let space = ActionSpace::default();
        let mut model = zero_model();
        model.weights[2].pop();
        assert!(matches!(
            LinearPolicy::new(model, &space),
            Err(SimError::ModelLoad(_))
        ));

        let err = LinearPolicy::from_json(r#"{"weights": [], "bias": []}"#, &space).unwrap_err();
        assert!(err.to_string().contains("weight rows"));

        assert!(LinearPolicy::from_json("not json", &space).is_err());
    }

    #[test]
    fn test_linear_policy_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        std::fs::write(&path, serde_json::to_string(&zero_model()).unwrap()).unwrap();

        let policy = LinearPolicy::load(&path, &ActionSpace::default()).unwrap();
        assert_eq!(policy.label(), "model");
        assert!(LinearPolicy::load(dir.path().join("missing.json"), &ActionSpace::default()).is_err());
    }

    #[test]
    fn test_policy_kind_parse() {
        assert_eq!("heuristic".parse::<PolicyKind>().unwrap(), PolicyKind::Heuristic);
        assert_eq!(PolicyKind::Model.as_str(), "model");
        assert!("greedy".parse::<PolicyKind>().is_err());
    }

    #[test]
    fn test_policy_kind_build() {
        let space = ActionSpace::default();
        let policy = PolicyKind::Random.build(&space, 100.0, Some(1), None).unwrap();
        assert_eq!(policy.label(), "random");

        let policy = PolicyKind::Heuristic.build(&space, 100.0, None, None).unwrap();
        assert_eq!(policy.label(), "heuristic");

        assert!(matches!(
            PolicyKind::Model.build(&space, 100.0, None, None),
            Err(SimError::ModelLoad(_))
        ));
    }
}
