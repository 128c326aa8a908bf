//! Results Recorder
//!
//! Persists a backtest report as a JSON document with `summary`, `trades`,
//! `capital_history` and `metadata` sections.

use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::runner::{BacktestReport, TradeRecord};
use crate::error::Result;

/// Aggregate figures of a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsSummary {
    pub total_trades: usize,
    pub successful_trades: usize,
    pub failed_trades: usize,
    pub total_pnl: f64,
    pub total_gas_spent: f64,
    pub net_pnl: f64,
    pub win_rate: f64,
    pub avg_profit_per_trade: f64,
    pub max_drawdown: f64,
    pub sharpe_ratio: f64,
    pub initial_capital: f64,
    pub final_capital: f64,
    pub return_pct: f64,
    pub episodes_run: usize,
    pub bankrupt: bool,
}

/// Run provenance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunMetadata {
    pub generated_at: DateTime<Utc>,
    pub policy: String,
    pub seed: Option<u64>,
    pub episodes: usize,
    pub gas_multiplier: f64,
}

impl RunMetadata {
    pub fn new(policy: &str, seed: Option<u64>, episodes: usize, gas_multiplier: f64) -> Self {
        Self {
            generated_at: Utc::now(),
            policy: policy.to_string(),
            seed,
            episodes,
            gas_multiplier,
        }
    }
}

/// Persisted results document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultsDocument {
    pub summary: ResultsSummary,
    pub trades: Vec<TradeRecord>,
    pub capital_history: Vec<f64>,
    pub metadata: RunMetadata,
}

impl ResultsDocument {
    pub fn from_report(report: &BacktestReport, metadata: RunMetadata) -> Self {
        let r = &report.result;
        Self {
            summary: ResultsSummary {
                total_trades: r.total_trades,
                successful_trades: r.successful_trades,
                failed_trades: r.failed_trades,
                total_pnl: r.total_pnl,
                total_gas_spent: r.total_gas_spent,
                net_pnl: r.net_pnl,
                win_rate: r.win_rate,
                avg_profit_per_trade: r.avg_profit_per_trade,
                max_drawdown: r.max_drawdown,
                sharpe_ratio: r.sharpe_ratio,
                initial_capital: report.initial_capital,
                final_capital: report.final_capital,
                return_pct: report.return_pct(),
                episodes_run: report.episodes_run,
                bankrupt: report.bankrupt,
            },
            trades: r.trades.clone(),
            capital_history: report.capital_history.clone(),
            metadata,
        }
    }

    /// Write the document as pretty JSON, creating parent directories
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, json).await?;

        info!("Results saved to {}", path.display());
        Ok(())
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let json = tokio::fs::read_to_string(path).await?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rl::backtest::runner::BacktestResult;

    fn sample_report() -> BacktestReport {
        let trades = vec![
            TradeRecord {
                episode: 0,
                step: 3,
                pnl: 84.68,
                gas_cost: 15.0,
                success: true,
                capital_after: 10_084.68,
            },
            TradeRecord {
                episode: 1,
                step: 7,
                pnl: -9.0,
                gas_cost: 9.0,
                success: false,
                capital_after: 10_075.68,
            },
        ];
        let capital_history = vec![10_000.0, 10_084.68, 10_075.68];
        BacktestReport {
            result: BacktestResult::from_trades(trades, &capital_history),
            initial_capital: 10_000.0,
            final_capital: 10_075.68,
            capital_history,
            episodes_run: 2,
            bankrupt: false,
        }
    }

    #[tokio::test]
    async fn test_save_and_load_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("results.json");

        let doc = ResultsDocument::from_report(
            &sample_report(),
            RunMetadata::new("heuristic", Some(42), 2, 0.01),
        );
        doc.save(&path).await.unwrap();

        let loaded = ResultsDocument::load(&path).await.unwrap();
        assert_eq!(loaded, doc);
        assert_eq!(loaded.summary.total_trades, 2);
        assert_eq!(loaded.capital_history.len(), 3);
    }

    #[tokio::test]
    async fn test_document_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.json");

        ResultsDocument::from_report(&sample_report(), RunMetadata::new("random", None, 2, 1.0))
            .save(&path)
            .await
            .unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert!(raw["summary"]["return_pct"].is_f64());
        assert!(raw["summary"]["sharpe_ratio"].is_number());
        assert_eq!(raw["trades"][0]["step"], 3);
        assert_eq!(raw["trades"][1]["success"], false);
        assert!(raw["capital_history"].as_array().unwrap().iter().all(|v| v.is_number()));
        assert_eq!(raw["metadata"]["policy"], "random");
        assert!(raw["metadata"]["seed"].is_null());
        assert!(raw["metadata"]["generated_at"].is_string());
    }
}
