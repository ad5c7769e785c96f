//! Backtesting engine for replaying strategies over historical rounds

pub mod evaluator;
pub mod generator;
pub mod metrics;
pub mod simulator;

pub use evaluator::{evaluate_bet_sets, evaluate_round, BacktestSummary, DayResult};
pub use generator::{BetSetGenerator, GeneratorConfig, UpsetConfig};
pub use metrics::{calculate_metrics, BacktestMetrics, DayProfit};
pub use simulator::{BacktestConfig, BacktestEngine};
