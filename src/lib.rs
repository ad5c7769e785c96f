//! Gridpool - Backtesting and strategy optimization for 3x3 grid pool betting
//!
//! This library provides:
//! - Implied probabilities from bookmaker odds
//! - The fixed 27-line scoring grid and grid selection policies
//! - Pluggable probability adjustment strategies
//! - A deterministic, date-seeded bet-set generator
//! - Payout and ROI evaluation over historical rounds
//! - Exhaustive grid search over strategy parameters
//!
//! # Example
//!
//! ```no_run
//! use gridpool::backtesting::{BacktestConfig, BacktestEngine};
//! use gridpool::data::load_rounds_dir;
//! use gridpool::strategy::Strategy;
//!
//! let dataset = load_rounds_dir("data/rounds").unwrap();
//! let engine = BacktestEngine::new(BacktestConfig::default());
//! let summary = engine.run(&dataset, &Strategy::default()).unwrap();
//! println!("ROI: {:.1}%", summary.roi());
//! ```

pub mod backtesting;
pub mod config;
pub mod core;
pub mod data;
pub mod error;
pub mod models;
pub mod optimizer;
pub mod strategy;

// Re-export commonly used types
pub use backtesting::{
    BacktestConfig, BacktestEngine, BacktestSummary, BetSetGenerator, GeneratorConfig,
};
pub use config::{EngineConfig, SweepSpec};
pub use error::{EngineError, Result};
pub use models::{Bet, BetSet, Outcome, Round, TeamPair};
pub use optimizer::{
    GridSearch, OptimizationReport, ParameterAxis, ParameterSpace, SearchConfig, Trial,
};
pub use strategy::Strategy;
