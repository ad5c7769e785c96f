//! Backtest Metrics
//!
//! Derived day-level metrics: hit rate, winning lines, drawdown, best and
//! worst day.

use serde::{Deserialize, Serialize};

use super::evaluator::BacktestSummary;

/// Profit of a single day, used for best/worst reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayProfit {
    pub date: String,
    pub profit: f64,
}

/// Backtest evaluation metrics
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestMetrics {
    /// Share of rounds that were profitable
    pub hit_rate: f64,
    /// Winning lines per bet
    pub avg_winning_lines: f64,
    /// Largest peak-to-trough drop of cumulative profit
    pub max_drawdown: f64,
    pub best_day: Option<DayProfit>,
    pub worst_day: Option<DayProfit>,
    pub avg_bets_per_round: f64,
}

/// Calculate metrics from a backtest summary
pub fn calculate_metrics(summary: &BacktestSummary) -> BacktestMetrics {
    if summary.days.is_empty() {
        return BacktestMetrics::default();
    }

    let days = summary.days.len() as f64;
    let hit_rate = summary.profitable_days as f64 / days;
    let avg_bets_per_round = summary.total_bets as f64 / days;

    let total_lines: usize = summary.days.iter().map(|d| d.winning_lines).sum();
    let avg_winning_lines = if summary.total_bets > 0 {
        total_lines as f64 / summary.total_bets as f64
    } else {
        0.0
    };

    // Drawdown over cumulative profit, starting from zero
    let mut cumulative = 0.0;
    let mut peak = 0.0f64;
    let mut max_drawdown = 0.0f64;
    for day in &summary.days {
        cumulative += day.profit();
        peak = peak.max(cumulative);
        max_drawdown = max_drawdown.max(peak - cumulative);
    }

    let to_profit = |d: &super::evaluator::DayResult| DayProfit {
        date: d.date.clone(),
        profit: d.profit(),
    };
    let best_day = summary
        .days
        .iter()
        .max_by(|a, b| a.profit().total_cmp(&b.profit()))
        .map(to_profit);
    let worst_day = summary
        .days
        .iter()
        .min_by(|a, b| a.profit().total_cmp(&b.profit()))
        .map(to_profit);

    BacktestMetrics {
        hit_rate,
        avg_winning_lines,
        max_drawdown,
        best_day,
        worst_day,
        avg_bets_per_round,
    }
}
