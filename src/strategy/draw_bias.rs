//! Draw-sensitive transforms
//!
//! `DrawBiasParams` rescales the draw odd itself and recomputes the implied
//! probability. `TeamDrawParams` derives a draw bias from the two teams'
//! historical draw rate against a league baseline and moves probability
//! mass between the draw and the home/away outcomes.

use serde::{Deserialize, Serialize};

use super::{Adjustment, MatchContext, ProbabilityTransform};
use crate::core::probability::Probability;
use crate::data::history::{capped_min_matches, DRAW_RATE_WINDOW};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DrawBiasParams {
    /// Multiplier on the draw odd (< 1 favors draws)
    pub draw_factor: f64,
    /// Only adjust matches whose odds spread is within `even_threshold`
    pub even_only: bool,
    pub even_threshold: f64,
}

impl Default for DrawBiasParams {
    fn default() -> Self {
        Self {
            draw_factor: 0.9,
            even_only: false,
            even_threshold: 1.0,
        }
    }
}

impl DrawBiasParams {
    /// Max odd minus min odd within the threshold
    pub fn is_even(&self, odds: &[f64; 3]) -> bool {
        let max = odds.iter().copied().fold(f64::MIN, f64::max);
        let min = odds.iter().copied().fold(f64::MAX, f64::min);
        max - min <= self.even_threshold
    }
}

impl ProbabilityTransform for DrawBiasParams {
    fn adjust(&self, ctx: &MatchContext<'_>) -> Adjustment {
        let applies = self.draw_factor.is_finite()
            && self.draw_factor > 0.0
            && (!self.even_only || self.is_even(&ctx.odds));
        if !applies {
            return Adjustment {
                probability: ctx.probability,
                odds: ctx.odds,
            };
        }

        let odds = [ctx.odds[0], ctx.odds[1] * self.draw_factor, ctx.odds[2]];
        Adjustment {
            probability: Probability::from_odds(&odds),
            odds,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "draw_factor" => self.draw_factor = value,
            "even_only" => self.even_only = value != 0.0,
            "even_threshold" => self.even_threshold = value,
            _ => return false,
        }
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TeamDrawParams {
    /// Baseline draw frequency of the league
    pub league_draw_rate: f64,
    pub sensitivity: f64,
    pub min_bias: f64,
    pub max_bias: f64,
    /// Cap on the adjusted draw probability
    pub max_draw_probability: f64,
    pub min_matches: usize,
}

impl Default for TeamDrawParams {
    fn default() -> Self {
        Self {
            league_draw_rate: 0.27,
            sensitivity: 1.0,
            min_bias: 0.7,
            max_bias: 1.4,
            max_draw_probability: 0.6,
            min_matches: 5,
        }
    }
}

impl TeamDrawParams {
    /// Bias bounds are ordered (`min_bias <= max_bias`, neither NaN)
    pub fn has_valid_bounds(&self) -> bool {
        self.min_bias <= self.max_bias
    }

    /// Draw bias for a combined team draw rate, neutral when the bounds are inverted
    pub fn bias(&self, team_rate: f64) -> f64 {
        if !self.has_valid_bounds() {
            return 1.0;
        }
        let raw = 1.0 + self.sensitivity * (team_rate / self.league_draw_rate - 1.0);
        raw.clamp(self.min_bias, self.max_bias)
    }

    /// Scale the draw by `bias` and share the rest between home and away
    pub fn shift(&self, p: &Probability, bias: f64) -> Probability {
        let sides = p.home + p.away;
        if sides <= 0.0 {
            return *p;
        }
        let draw = (p.draw * bias).min(self.max_draw_probability).clamp(0.0, 1.0);
        let rest = 1.0 - draw;
        Probability {
            home: p.home / sides * rest,
            draw,
            away: p.away / sides * rest,
        }
    }

    fn team_rate(&self, ctx: &MatchContext<'_>) -> Option<f64> {
        let lookup = ctx.lookup?;
        let teams = ctx.teams?;
        let home = lookup.form(&teams.home, ctx.date)?;
        let away = lookup.form(&teams.away, ctx.date)?;
        let required = self.min_matches.min(DRAW_RATE_WINDOW);
        if home.matches < required || away.matches < required {
            return None;
        }
        Some((home.draw_rate + away.draw_rate) / 2.0)
    }
}

impl ProbabilityTransform for TeamDrawParams {
    fn adjust(&self, ctx: &MatchContext<'_>) -> Adjustment {
        let probability = match self.team_rate(ctx) {
            Some(rate) if self.league_draw_rate > 0.0 && self.has_valid_bounds() => {
                self.shift(&ctx.probability, self.bias(rate))
            }
            _ => ctx.probability,
        };
        Adjustment {
            probability,
            odds: ctx.odds,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "league_draw_rate" => self.league_draw_rate = value,
            "sensitivity" => self.sensitivity = value,
            "min_bias" => self.min_bias = value,
            "max_bias" => self.max_bias = value,
            "max_draw_probability" => self.max_draw_probability = value,
            "min_matches" => self.min_matches = capped_min_matches(value),
            _ => return false,
        }
        true
    }
}
