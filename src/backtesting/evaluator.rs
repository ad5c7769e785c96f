//! Payout evaluation
//!
//! A bet wins a line when its three picks on the line's grid positions all
//! equal the actual outcomes. The line pays the product of the odds of the
//! three predicted outcomes. Every bet costs `PRICE_PER_BET` regardless of
//! outcome.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::constants::{GRID_SIZE, PRICE_PER_BET};
use crate::core::grid::{lines, GridSelection};
use crate::data::rounds::RoundDataset;
use crate::models::{Bet, BetSet, Outcome, Round};

/// Evaluation of one round's bet set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayResult {
    pub date: String,
    pub bets: usize,
    pub cost: f64,
    pub winnings: f64,
    /// Winning lines summed over all bets
    pub winning_lines: usize,
    pub underfilled: bool,
}

impl DayResult {
    pub fn profit(&self) -> f64 {
        self.winnings - self.cost
    }

    /// Winnings strictly exceed cost
    pub fn is_profitable(&self) -> bool {
        self.winnings > self.cost
    }
}

/// Aggregate over evaluated rounds
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BacktestSummary {
    pub days: Vec<DayResult>,
    pub total_bets: usize,
    pub total_cost: f64,
    pub total_winnings: f64,
    pub profitable_days: usize,
    pub underfilled_rounds: usize,
}

impl BacktestSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, day: DayResult) {
        self.total_bets += day.bets;
        self.total_cost += day.cost;
        self.total_winnings += day.winnings;
        if day.is_profitable() {
            self.profitable_days += 1;
        }
        if day.underfilled {
            self.underfilled_rounds += 1;
        }
        self.days.push(day);
    }

    pub fn profit(&self) -> f64 {
        self.total_winnings - self.total_cost
    }

    /// ROI in percent, 0 when nothing was staked
    pub fn roi(&self) -> f64 {
        if self.total_cost == 0.0 {
            0.0
        } else {
            self.profit() / self.total_cost * 100.0
        }
    }
}

/// Actual outcome at each grid position
fn actual_picks(round: &Round, grid: &GridSelection) -> Option<[Outcome; GRID_SIZE]> {
    let mut actual = [Outcome::Home; GRID_SIZE];
    for (pos, slot) in actual.iter_mut().enumerate() {
        *slot = round.actual_outcome(grid.match_index(pos))?;
    }
    Some(actual)
}

/// Winnings and winning line count of a single bet
pub fn score_bet(
    round: &Round,
    grid: &GridSelection,
    actual: &[Outcome; GRID_SIZE],
    bet: &Bet,
) -> (f64, usize) {
    let mut winnings = 0.0;
    let mut winning_lines = 0;
    for line in lines() {
        if line.positions().iter().all(|&pos| bet.picks[pos] == actual[pos]) {
            winnings += line
                .positions()
                .iter()
                .map(|&pos| round.outcome_odds(grid.match_index(pos), bet.picks[pos]))
                .product::<f64>();
            winning_lines += 1;
        }
    }
    (winnings, winning_lines)
}

/// Evaluate a bet set against its round
///
/// Returns `None` when the round has no results yet.
pub fn evaluate_round(round: &Round, bet_set: &BetSet) -> Option<DayResult> {
    let actual = actual_picks(round, &bet_set.grid)?;

    let mut winnings = 0.0;
    let mut winning_lines = 0;
    for bet in &bet_set.bets {
        let (w, n) = score_bet(round, &bet_set.grid, &actual, bet);
        winnings += w;
        winning_lines += n;
    }

    Some(DayResult {
        date: round.date.clone(),
        bets: bet_set.len(),
        cost: bet_set.len() as f64 * PRICE_PER_BET,
        winnings,
        winning_lines,
        underfilled: bet_set.is_underfilled(),
    })
}

/// Evaluate many bet sets, skipping dates missing from the dataset
pub fn evaluate_bet_sets<'a, I>(dataset: &RoundDataset, bet_sets: I) -> BacktestSummary
where
    I: IntoIterator<Item = &'a BetSet>,
{
    let mut summary = BacktestSummary::new();
    for bet_set in bet_sets {
        let Some(round) = dataset.get(&bet_set.date) else {
            debug!("Skipping bet set for unknown date {}", bet_set.date);
            continue;
        };
        if let Some(day) = evaluate_round(round, bet_set) {
            summary.push(day);
        }
    }
    summary
}
