//! Performance Metrics
//!
//! Every ratio degrades to 0 on an empty or degenerate denominator.

/// Periods per year used to annualize the Sharpe ratio
pub const ANNUALIZATION_PERIODS: f64 = 252.0;

/// Fraction of trades that succeeded
pub fn win_rate(successes: usize, total_trades: usize) -> f64 {
    if total_trades == 0 {
        return 0.0;
    }
    successes as f64 / total_trades as f64
}

/// Average PnL per trade
pub fn avg_profit(total_pnl: f64, total_trades: usize) -> f64 {
    if total_trades == 0 {
        return 0.0;
    }
    total_pnl / total_trades as f64
}

/// Maximum peak-to-trough decline of the capital trajectory, in percent
///
/// Points under a non-positive peak contribute no drawdown.
pub fn max_drawdown(capital_history: &[f64]) -> f64 {
    if capital_history.len() < 2 {
        return 0.0;
    }

    let mut peak = capital_history[0];
    let mut max_dd = 0.0f64;
    for &capital in capital_history {
        if capital > peak {
            peak = capital;
        }
        if peak > 0.0 {
            let drawdown = (peak - capital) / peak;
            if drawdown > max_dd {
                max_dd = drawdown;
            }
        }
    }

    (max_dd * 100.0).clamp(0.0, 100.0)
}

/// Annualized Sharpe ratio of the trade-level PnL sequence
///
/// Uses the population standard deviation.
pub fn sharpe_ratio(pnls: &[f64]) -> f64 {
    if pnls.len() < 2 {
        return 0.0;
    }
    let first = pnls[0];
    if pnls.iter().all(|&p| p == first) {
        return 0.0;
    }

    let n = pnls.len() as f64;
    let mean = pnls.iter().sum::<f64>() / n;
    let variance = pnls.iter().map(|p| (p - mean).powi(2)).sum::<f64>() / n;
    let std = variance.sqrt();

    if std > f64::EPSILON {
        mean / std * ANNUALIZATION_PERIODS.sqrt()
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio_guards() {
        assert_eq!(win_rate(0, 0), 0.0);
        assert_eq!(avg_profit(12.0, 0), 0.0);
        assert_eq!(win_rate(3, 4), 0.75);
        assert_eq!(avg_profit(12.0, 4), 3.0);
    }

    #[test]
    fn test_drawdown_monotonic_is_zero() {
        assert_eq!(max_drawdown(&[100.0, 100.0, 150.0, 200.0]), 0.0);
        assert_eq!(max_drawdown(&[100.0]), 0.0);
        assert_eq!(max_drawdown(&[]), 0.0);
    }

    #[test]
    fn test_drawdown_from_peak() {
        // Peak 200, trough 50
        let dd = max_drawdown(&[100.0, 200.0, 150.0, 50.0, 180.0]);
        assert!((dd - 75.0).abs() < 1e-9);
    }

    #[test]
    fn test_drawdown_bounded_through_bankruptcy() {
        let dd = max_drawdown(&[100.0, 40.0, -20.0, -50.0]);
        assert_eq!(dd, 100.0);

        // Peak never positive
        assert_eq!(max_drawdown(&[0.0, -5.0, -10.0]), 0.0);
    }

    #[test]
    fn test_sharpe_degenerate() {
        assert_eq!(sharpe_ratio(&[]), 0.0);
        assert_eq!(sharpe_ratio(&[5.0]), 0.0);
        assert_eq!(sharpe_ratio(&[0.1, 0.1, 0.1]), 0.0);
    }

    #[test]
    fn test_sharpe_annualized() {
        // mean 2, population std 1
        let sharpe = sharpe_ratio(&[1.0, 3.0]);
        assert!((sharpe - 2.0 * 252f64.sqrt()).abs() < 1e-9);

        assert!(sharpe_ratio(&[-1.0, -3.0]) < 0.0);
    }
}
