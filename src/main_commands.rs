use arbsim::config::AppConfig;
use arbsim::error::Result;

mod backtest;
mod evaluate;

pub(crate) use backtest::run_backtest;
pub(crate) use evaluate::run_evaluate;

/// Print the effective merged configuration and its validation outcome
pub(crate) fn show_config(config: &AppConfig) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(config)?);

    match config.validate() {
        Ok(()) => println!("\n\x1b[32m✓ Configuration is valid\x1b[0m"),
        Err(errors) => {
            println!("\n\x1b[31m✗ Configuration has {} problem(s):\x1b[0m", errors.len());
            for e in errors {
                println!("  - {}", e);
            }
        }
    }
    Ok(())
}
