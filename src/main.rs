use arbsim::cli::{Cli, Commands};
use arbsim::config::AppConfig;
use arbsim::error::{Result, SimError};
use clap::Parser;
use tracing::warn;

mod main_commands;
mod main_runtime;

use main_runtime::{init_logging, init_logging_simple};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = AppConfig::load_from(&cli.config)?;

    match &cli.command {
        Commands::Backtest {
            run,
            output,
            capital,
            verbose,
        } => {
            if *verbose && std::env::var("RUST_LOG").is_err() {
                config.logging.level = "debug".to_string();
            }
            init_logging(&config.logging);

            run.apply(&mut config);
            if let Some(capital) = capital {
                config.backtest.initial_capital = *capital;
            }
            if let Some(output) = output {
                config.backtest.output = output.clone();
            }
            validate(&config)?;

            main_commands::run_backtest(config, run.policy, run.model.clone()).await?;
        }
        Commands::Evaluate { run } => {
            init_logging(&config.logging);

            run.apply(&mut config);
            validate(&config)?;

            main_commands::run_evaluate(config, run.policy, run.model.clone()).await?;
        }
        Commands::Config => {
            init_logging_simple();
            main_commands::show_config(&config)?;
        }
    }

    Ok(())
}

fn validate(config: &AppConfig) -> Result<()> {
    config.validate().map_err(|errors| {
        for e in &errors {
            warn!("Invalid configuration: {}", e);
        }
        SimError::from_validation(errors)
    })
}
