//! Backtest Engine
//!
//! Replays a strategy over every settled round: implied probabilities, grid
//! selection, strategy adjustment, bet-set generation and payout evaluation.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use super::evaluator::{evaluate_round, BacktestSummary};
use super::generator::{BetSetGenerator, GeneratorConfig};
use super::metrics::calculate_metrics;
use crate::core::constants::GRID_SIZE;
use crate::core::grid::{GridPolicy, GridSelection};
use crate::core::probability::{implied_probabilities, Probability};
use crate::core::rng::DrawStreams;
use crate::data::history::TeamFormLookup;
use crate::data::rounds::RoundDataset;
use crate::error::Result;
use crate::models::{BetSet, Round};
use crate::strategy::{MatchContext, Strategy};

/// Backtest engine configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BacktestConfig {
    pub grid_policy: GridPolicy,
    pub generator: GeneratorConfig,
    /// Inclusive date filters
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl BacktestConfig {
    fn in_range(&self, date: &str) -> bool {
        self.start_date.as_deref().map_or(true, |start| date >= start)
            && self.end_date.as_deref().map_or(true, |end| date <= end)
    }
}

/// Backtest engine
///
/// Holds no per-round state, so one engine can serve many trials at once.
#[derive(Debug, Clone, Default)]
pub struct BacktestEngine {
    pub config: BacktestConfig,
    lookup: Option<Arc<TeamFormLookup>>,
}

impl BacktestEngine {
    pub fn new(config: BacktestConfig) -> Self {
        Self { config, lookup: None }
    }

    /// Attach the team-form lookup used by team-aware strategies
    pub fn with_lookup(mut self, lookup: Arc<TeamFormLookup>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn lookup(&self) -> Option<&TeamFormLookup> {
        self.lookup.as_deref()
    }

    /// Adjusted probabilities of the grid positions
    pub fn adjusted_probabilities(
        &self,
        round: &Round,
        grid: &GridSelection,
        implied: &[Probability],
        strategy: &Strategy,
    ) -> [Probability; GRID_SIZE] {
        let lookup = self.lookup();
        let mut adjusted = [Probability::uniform(); GRID_SIZE];
        for (pos, slot) in adjusted.iter_mut().enumerate() {
            let index = grid.match_index(pos);
            let ctx = MatchContext {
                probability: implied[index],
                odds: round.match_odds(index),
                teams: round.teams_at(index),
                date: &round.date,
                lookup,
            };
            *slot = strategy.apply(&ctx);
        }
        adjusted
    }

    /// Build the bet set of one round under a strategy
    pub fn build_bet_set(&self, round: &Round, strategy: &Strategy) -> Result<BetSet> {
        let implied = implied_probabilities(&round.odds);
        let grid =
            GridSelection::from_probabilities(&round.date, &implied, self.config.grid_policy)?;
        let adjusted = self.adjusted_probabilities(round, &grid, &implied, strategy);
        let mut streams = DrawStreams::for_date(&round.date);
        let generator = BetSetGenerator::new(self.config.generator);
        Ok(generator.generate(&round.date, grid, &adjusted, &mut streams))
    }

    /// Run the strategy over every settled round in date order
    pub fn run(&self, dataset: &RoundDataset, strategy: &Strategy) -> Result<BacktestSummary> {
        if strategy.requires_team_data() && self.lookup.is_none() {
            warn!(
                "Strategy {} uses team form but no team histories are loaded",
                strategy.name()
            );
        }

        let mut summary = BacktestSummary::new();
        for round in dataset.settled().filter(|r| self.config.in_range(&r.date)) {
            let bet_set = self.build_bet_set(round, strategy)?;
            if let Some(day) = evaluate_round(round, &bet_set) {
                debug!(
                    "{}: {} bets, winnings {:.1}, lines {}",
                    day.date, day.bets, day.winnings, day.winning_lines
                );
                summary.push(day);
            }
        }
        Ok(summary)
    }

    /// Print summary of a backtest run
    pub fn print_summary(&self, strategy: &Strategy, summary: &BacktestSummary) {
        let metrics = calculate_metrics(summary);

        println!("\n{}", "=".repeat(60));
        println!("BACKTEST RESULTS");
        println!("{}", "=".repeat(60));
        println!("Strategy: {}", strategy.name());
        println!("Grid policy: {}", self.config.grid_policy.name());
        println!("Target bets per round: {}", self.config.generator.target_count);
        println!("{}", "-".repeat(60));
        println!("Rounds: {}", summary.days.len());
        println!("Total bets: {}", summary.total_bets);
        println!("Underfilled rounds: {}", summary.underfilled_rounds);
        println!("Profitable days: {}", summary.profitable_days);
        println!("{}", "-".repeat(60));
        println!("Total cost: {:.0}", summary.total_cost);
        println!("Total winnings: {:.1}", summary.total_winnings);
        println!("Total profit: {:.1}", summary.profit());
        println!("ROI: {:.1}%", summary.roi());
        println!("{}", "-".repeat(60));
        println!("Hit rate: {:.1}%", metrics.hit_rate * 100.0);
        println!("Avg winning lines per bet: {:.2}", metrics.avg_winning_lines);
        println!("Max drawdown: {:.1}", metrics.max_drawdown);
        if let Some(best) = &metrics.best_day {
            println!("Best day: {} ({:+.1})", best.date, best.profit);
        }
        if let Some(worst) = &metrics.worst_day {
            println!("Worst day: {} ({:+.1})", worst.date, worst.profit);
        }
        println!("{}", "=".repeat(60));
    }
}
