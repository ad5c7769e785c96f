//! Exhaustive grid search
//!
//! Every point of the parameter space is applied to the base strategy and
//! backtested over the whole dataset. Trials are independent, so they can
//! run on the rayon pool; results are collected in enumeration order either
//! way and ranked by ROI with a stable sort.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

use super::space::{ParameterPoint, ParameterSpace};
use crate::backtesting::simulator::BacktestEngine;
use crate::data::rounds::RoundDataset;
use crate::error::Result;
use crate::strategy::Strategy;

/// Trials between progress log lines
const PROGRESS_LOG_INTERVAL: usize = 100;

/// Ranking and reporting options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub top_k: usize,
    pub diverse_count: usize,
    /// Accepted trials must differ from every earlier pick by more than this
    pub min_distance: f64,
    /// Parameters the distance is measured over (all when empty)
    pub distance_params: Vec<String>,
    /// Dispatch trials on the rayon pool when the `parallel` feature is on
    pub parallel: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 10,
            diverse_count: 5,
            min_distance: 0.1,
            distance_params: Vec::new(),
            parallel: true,
        }
    }
}

/// Result of one parameter point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trial {
    /// Position in enumeration order
    pub index: usize,
    pub params: ParameterPoint,
    pub roi: f64,
    pub profit: f64,
    pub profitable_days: usize,
    pub total_cost: f64,
    pub total_winnings: f64,
}

/// Ranked outcome of a grid search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizationReport {
    pub strategy_kind: String,
    pub search_space_size: usize,
    /// Every trial, best ROI first
    pub trials: Vec<Trial>,
    pub best: Option<Trial>,
    pub top: Vec<Trial>,
    pub diverse: Vec<Trial>,
}

/// Grid search over a base strategy
#[derive(Debug, Clone)]
pub struct GridSearch {
    pub base: Strategy,
    pub space: ParameterSpace,
    pub config: SearchConfig,
}

impl GridSearch {
    pub fn new(base: Strategy, space: ParameterSpace, config: SearchConfig) -> Self {
        Self { base, space, config }
    }

    /// Check every axis name against the base strategy
    pub fn validate(&self) -> Result<()> {
        self.space.validate()?;
        for axis in &self.space.axes {
            let mut probe = self.base.clone();
            probe.with_override(&axis.name, axis.values[0])?;
        }
        Ok(())
    }

    pub fn run(
        &self,
        engine: &BacktestEngine,
        dataset: &RoundDataset,
    ) -> Result<OptimizationReport> {
        self.run_with_progress(engine, dataset, |_| {})
    }

    /// Run every trial, calling `on_trial` as each one finishes
    pub fn run_with_progress<F>(
        &self,
        engine: &BacktestEngine,
        dataset: &RoundDataset,
        on_trial: F,
    ) -> Result<OptimizationReport>
    where
        F: Fn(&Trial) + Sync,
    {
        self.validate()?;

        let total = self.space.size();
        info!(
            "Grid search: {} trials over {} axes ({} rounds)",
            total,
            self.space.axes.len(),
            dataset.len()
        );

        let done = AtomicUsize::new(0);
        let evaluate = |(index, params): (usize, ParameterPoint)| -> Result<Trial> {
            let strategy = self.base.with_overrides(params.overrides())?;
            let summary = engine.run(dataset, &strategy)?;
            let trial = Trial {
                index,
                params,
                roi: summary.roi(),
                profit: summary.profit(),
                profitable_days: summary.profitable_days,
                total_cost: summary.total_cost,
                total_winnings: summary.total_winnings,
            };
            on_trial(&trial);
            let finished = done.fetch_add(1, Ordering::Relaxed) + 1;
            if finished % PROGRESS_LOG_INTERVAL == 0 {
                info!("Grid search progress: {}/{}", finished, total);
            }
            Ok(trial)
        };

        let trials: Vec<Trial> = if self.use_parallel() {
            self.run_parallel(&evaluate)?
        } else {
            self.space.points().enumerate().map(evaluate).collect::<Result<_>>()?
        };

        let trials = rank_trials(trials);
        let top: Vec<Trial> = trials.iter().take(self.config.top_k).cloned().collect();
        let diverse = select_diverse(
            &trials,
            self.config.diverse_count,
            self.config.min_distance,
            &self.config.distance_params,
        );

        if let Some(best) = trials.first() {
            info!("Best trial #{}: ROI {:.2}% ({})", best.index, best.roi, best.params.describe());
        }

        Ok(OptimizationReport {
            strategy_kind: self.base.kind().to_string(),
            search_space_size: total,
            best: trials.first().cloned(),
            top,
            diverse,
            trials,
        })
    }

    #[cfg(feature = "parallel")]
    fn use_parallel(&self) -> bool {
        self.config.parallel
    }

    #[cfg(not(feature = "parallel"))]
    fn use_parallel(&self) -> bool {
        false
    }

    #[cfg(feature = "parallel")]
    fn run_parallel<E>(&self, evaluate: &E) -> Result<Vec<Trial>>
    where
        E: Fn((usize, ParameterPoint)) -> Result<Trial> + Sync,
    {
        let points: Vec<ParameterPoint> = self.space.points().collect();
        // indexed collect keeps enumeration order
        points.into_par_iter().enumerate().map(evaluate).collect()
    }

    #[cfg(not(feature = "parallel"))]
    fn run_parallel<E>(&self, evaluate: &E) -> Result<Vec<Trial>>
    where
        E: Fn((usize, ParameterPoint)) -> Result<Trial> + Sync,
    {
        self.space.points().enumerate().map(evaluate).collect()
    }
}

/// Sort by ROI descending; equal ROI keeps enumeration order
pub fn rank_trials(mut trials: Vec<Trial>) -> Vec<Trial> {
    trials.sort_by(|a, b| b.roi.total_cmp(&a.roi));
    trials
}

/// Greedy diversity filter over ranked trials
pub fn select_diverse(
    ranked: &[Trial],
    count: usize,
    min_distance: f64,
    names: &[String],
) -> Vec<Trial> {
    let mut chosen: Vec<Trial> = Vec::with_capacity(count);
    for trial in ranked {
        if chosen.len() >= count {
            break;
        }
        let far_enough = chosen
            .iter()
            .all(|c| trial.params.distance(&c.params, names) > min_distance);
        if far_enough {
            chosen.push(trial.clone());
        }
    }
    chosen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backtesting::generator::GeneratorConfig;
    use crate::backtesting::simulator::BacktestConfig;
    use crate::error::EngineError;
    use crate::models::Round;
    use crate::optimizer::space::ParameterAxis;

    fn trial(index: usize, roi: f64, x: f64) -> Trial {
        Trial {
            index,
            params: ParameterPoint(vec![("x".to_string(), x)]),
            roi,
            profit: 0.0,
            profitable_days: 0,
            total_cost: 0.0,
            total_winnings: 0.0,
        }
    }

    fn dataset() -> RoundDataset {
        let round = |date: &str, results: &str| Round {
            date: date.to_string(),
            odds: [2.2, 3.1, 3.4].repeat(9),
            result: Some(results.chars().map(|c| c.to_string()).collect()),
            teams: None,
        };
        RoundDataset::new(vec![round("2024-01-06", "001201100"), round("2024-01-13", "110002010")])
    }

    fn engine() -> BacktestEngine {
        BacktestEngine::new(BacktestConfig {
            generator: GeneratorConfig {
                target_count: 8,
                ..Default::default()
            },
            ..Default::default()
        })
    }

    #[test]
    fn test_rank_by_roi_with_stable_ties() {
        let ranked = rank_trials(vec![
            trial(0, 12.5, 0.0),
            trial(1, 18.3, 1.0),
            trial(2, 18.3, 2.0),
        ]);
        let order: Vec<usize> = ranked.iter().map(|t| t.index).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_select_diverse() {
        let ranked = vec![
            trial(0, 30.0, 1.0),
            trial(1, 29.0, 1.05),
            trial(2, 20.0, 1.5),
            trial(3, 10.0, 2.0),
        ];
        let diverse = select_diverse(&ranked, 2, 0.1, &[]);
        let order: Vec<usize> = diverse.iter().map(|t| t.index).collect();
        assert_eq!(order, vec![0, 2]);
    }

    #[test]
    fn test_distance_must_strictly_exceed() {
        let ranked = vec![trial(0, 30.0, 1.0), trial(1, 29.0, 1.5)];
        assert_eq!(select_diverse(&ranked, 5, 0.5, &[]).len(), 1);
    }

    #[test]
    fn test_search_covers_space() {
        let space = ParameterSpace::new(vec![
            ParameterAxis::new("draw_boost", vec![0.8, 1.0, 1.2]),
            ParameterAxis::new("fav_weight", vec![0.0, 0.3]),
        ]);
        let search = GridSearch::new(Strategy::default(), space, SearchConfig::default());
        let report = search.run(&engine(), &dataset()).unwrap();

        assert_eq!(report.search_space_size, 6);
        assert_eq!(report.trials.len(), 6);
        assert_eq!(report.strategy_kind, "linear");
        let best = report.best.unwrap();
        assert!(report.trials.iter().all(|t| t.roi <= best.roi));
        for pair in report.trials.windows(2) {
            assert!(pair[0].roi >= pair[1].roi);
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let axis = ParameterAxis::new("home_boost", vec![0.8, 0.9, 1.0, 1.1, 1.2]);
        let space = ParameterSpace::new(vec![axis]);
        let sequential = GridSearch::new(
            Strategy::default(),
            space.clone(),
            SearchConfig {
                parallel: false,
                ..Default::default()
            },
        )
        .run(&engine(), &dataset())
        .unwrap();
        let parallel = GridSearch::new(Strategy::default(), space, SearchConfig::default())
            .run(&engine(), &dataset())
            .unwrap();
        assert_eq!(sequential.trials, parallel.trials);
    }

    #[test]
    fn test_unknown_axis_rejected_before_trials() {
        let space = ParameterSpace::new(vec![ParameterAxis::new("draw_factor", vec![0.9])]);
        let search = GridSearch::new(Strategy::default(), space, SearchConfig::default());
        let calls = AtomicUsize::new(0);
        let err = search
            .run_with_progress(&engine(), &dataset(), |_| {
                calls.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap_err();
        assert!(matches!(err, EngineError::UnknownParameter { .. }));
        assert_eq!(calls.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn test_progress_called_per_trial() {
        let axis = ParameterAxis::new("conf_boost", vec![0.0, 0.5, 1.0]);
        let space = ParameterSpace::new(vec![axis]);
        let search = GridSearch::new(Strategy::default(), space, SearchConfig::default());
        let calls = AtomicUsize::new(0);
        search
            .run_with_progress(&engine(), &dataset(), |_| {
                calls.fetch_add(1, Ordering::Relaxed);
            })
            .unwrap();
        assert_eq!(calls.load(Ordering::Relaxed), 3);
    }
}
