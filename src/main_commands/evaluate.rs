use std::path::PathBuf;

use anyhow::Context;
use arbsim::config::AppConfig;
use arbsim::error::Result;
use arbsim::rl::{evaluate_policy, summarize_results, ArbitrageEnvironment, PolicyKind};

pub(crate) async fn run_evaluate(
    config: AppConfig,
    policy_kind: PolicyKind,
    model: Option<PathBuf>,
) -> Result<()> {
    let AppConfig { sim, backtest, .. } = config;
    let episodes = backtest.episodes;
    let seed = backtest.seed;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║               Policy Evaluation                              ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  Episodes:        {:>10}                                   ║",
        episodes
    );
    println!(
        "║  Policy:          {:>10}                                   ║",
        policy_kind.as_str()
    );
    println!(
        "║  Gas Multiplier:  {:>10.4}                                   ║",
        sim.costs.gas_multiplier
    );
    println!("╚══════════════════════════════════════════════════════════════╝\n");

    let mut env = match seed {
        Some(seed) => ArbitrageEnvironment::with_seed(sim, seed),
        None => ArbitrageEnvironment::new(sim),
    };
    let mut policy = policy_kind.build(
        env.action_space(),
        env.available_capital(),
        seed,
        model.as_deref(),
    )?;

    let results = tokio::task::spawn_blocking(move || {
        evaluate_policy(&mut env, policy.as_mut(), episodes, seed)
    })
    .await
    .context("evaluation task failed")?;

    let summary = summarize_results(&results);

    println!("\n╔══════════════════════════════════════════════════════════════╗");
    println!("║               Evaluation Summary                             ║");
    println!("╠══════════════════════════════════════════════════════════════╣");
    println!(
        "║  Avg Reward:      {:>10.2}                                   ║",
        summary.avg_reward
    );
    println!(
        "║  Avg PnL:         {:>10.2}                                   ║",
        summary.avg_pnl
    );
    println!(
        "║  Avg Length:      {:>10.1}                                   ║",
        summary.avg_length
    );
    println!(
        "║  Avg Successes:   {:>10.1}                                   ║",
        summary.avg_successes
    );
    println!(
        "║  Avg Reverts:     {:>10.1}                                   ║",
        summary.avg_reverts
    );
    println!("╚══════════════════════════════════════════════════════════════╝");

    Ok(())
}
