use std::path::PathBuf;

use anyhow::Context;
use arbsim::config::AppConfig;
use arbsim::error::Result;
use arbsim::rl::backtest::RunMetadata;
use arbsim::rl::{ActionSpace, Backtester, PolicyKind, ResultsDocument};
use tracing::info;

pub(crate) async fn run_backtest(
    config: AppConfig,
    policy_kind: PolicyKind,
    model: Option<PathBuf>,
) -> Result<()> {
    let AppConfig { sim, backtest, .. } = config;
    let gas_multiplier = sim.costs.gas_multiplier;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Arbitrage Backtest                             ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  Episodes:        {:>10}                                   ║",
        backtest.episodes
    );
    println!(
        "║  Steps/Episode:   {:>10}                                   ║",
        sim.env.max_steps
    );
    println!(
        "║  Initial Capital: {:>10.2}                                   ║",
        backtest.initial_capital
    );
    println!(
        "║  Gas Multiplier:  {:>10.4}                                   ║",
        gas_multiplier
    );
    println!(
        "║  Policy:          {:>10}                                   ║",
        policy_kind.as_str()
    );
    if let Some(seed) = backtest.seed {
        println!(
            "║  Seed:            {:>10}                                   ║",
            seed
        );
    }
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let action_space = ActionSpace::new(sim.actions.clone());
    let policy = policy_kind.build(
        &action_space,
        backtest.initial_capital,
        backtest.seed,
        model.as_deref(),
    )?;

    let output = backtest.output.clone();
    let metadata = RunMetadata::new(
        policy.label(),
        backtest.seed,
        backtest.episodes,
        gas_multiplier,
    );

    let mut backtester = Backtester::new(sim, backtest, policy);
    let report = tokio::task::spawn_blocking(move || backtester.run())
        .await
        .context("backtest task failed")?;

    let r = &report.result;
    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║               Backtest Summary                               ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  Episodes Run:    {:>10}                                   ║",
        report.episodes_run
    );
    println!(
        "║  Total Trades:    {:>10}                                   ║",
        r.total_trades
    );
    println!(
        "║  Successful:      {:>10}                                   ║",
        r.successful_trades
    );
    println!(
        "║  Failed:          {:>10}                                   ║",
        r.failed_trades
    );
    println!(
        "║  Win Rate:        {:>9.1}%                                   ║",
        r.win_rate * 100.0
    );
    println!(
        "║  Total PnL:       {:>10.2}                                   ║",
        r.total_pnl
    );
    println!(
        "║  Gas Spent:       {:>10.2}                                   ║",
        r.total_gas_spent
    );
    println!(
        "║  Net PnL:         {:>10.2}                                   ║",
        r.net_pnl
    );
    println!(
        "║  Avg Profit:      {:>10.2}                                   ║",
        r.avg_profit_per_trade
    );
    println!(
        "║  Max Drawdown:    {:>9.1}%                                   ║",
        r.max_drawdown
    );
    println!(
        "║  Sharpe Ratio:    {:>10.2}                                   ║",
        r.sharpe_ratio
    );
    println!(
        "║  Final Capital:   {:>10.2}                                   ║",
        report.final_capital
    );
    println!(
        "║  Return:          {:>9.2}%                                   ║",
        report.return_pct()
    );
    println!("╚══════════════════════════════════════════════════════════════╝");

    if report.bankrupt {
        println!("\n\x1b[31m✗ Capital exhausted after {} episode(s)\x1b[0m", report.episodes_run);
    }

    let document = ResultsDocument::from_report(&report, metadata);
    document.save(&output).await?;
    info!("Backtest finished, results at {}", output.display());

    Ok(())
}
