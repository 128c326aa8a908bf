use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::rl::config::{BacktestConfig, SimConfig};

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Simulation economics and episode settings
    #[serde(default)]
    pub sim: SimConfig,
    /// Backtest run settings
    #[serde(default)]
    pub backtest: BacktestConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directives used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Enable JSON formatted logs
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info,arbsim=debug".to_string()
}

impl AppConfig {
    /// Load configuration from files and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific directory
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self, ConfigError> {
        let config_dir = config_dir.as_ref();

        let builder = Config::builder()
            // Start with default values
            .set_default("logging.level", default_log_level())?
            .set_default("logging.json", false)?
            // Load default config file
            .add_source(File::from(config_dir.join("default.toml")).required(false))
            // Load environment-specific config (e.g., config/l2.toml)
            .add_source(
                File::from(config_dir.join(
                    std::env::var("ARBSIM_ENV").unwrap_or_else(|_| "development".to_string()),
                ))
                .required(false),
            )
            // Override with environment variables (ARBSIM_BACKTEST__EPISODES, etc.)
            .add_source(
                Environment::with_prefix("ARBSIM")
                    .separator("__")
                    .try_parsing(true),
            );

        builder.build()?.try_deserialize()
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = self.sim.validate();
        errors.extend(self.backtest.validate());

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_files() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(dir.path()).unwrap();

        assert_eq!(config.sim, SimConfig::default());
        assert_eq!(config.backtest.episodes, 100);
        assert_eq!(config.logging.level, "info,arbsim=debug");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_default_toml_overrides() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("default.toml"),
            r#"
[sim.env]
max_steps = 250

[sim.costs]
gas_multiplier = 0.01

[backtest]
episodes = 12
initial_capital = 500.0
seed = 9

[logging]
json = true
"#,
        )
        .unwrap();

        let config = AppConfig::load_from(dir.path()).unwrap();
        assert_eq!(config.sim.env.max_steps, 250);
        assert_eq!(config.sim.costs.gas_multiplier, 0.01);
        assert_eq!(config.sim.costs.swap_gas_units, 150_000.0);
        assert_eq!(config.backtest.episodes, 12);
        assert_eq!(config.backtest.initial_capital, 500.0);
        assert_eq!(config.backtest.seed, Some(9));
        assert!(config.logging.json);
    }

    #[test]
    fn test_validate_collects_sections() {
        let mut config = AppConfig::default();
        config.sim.env.max_steps = 0;
        config.backtest.episodes = 0;

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }
}
