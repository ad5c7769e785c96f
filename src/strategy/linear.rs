//! Linear reweighting
//!
//! Multiply each outcome by a fixed boost, then optionally amplify the
//! favorite and, when the favorite already holds more than half the mass,
//! amplify it further in proportion to that excess.

use serde::{Deserialize, Serialize};

use super::{Adjustment, MatchContext, ProbabilityTransform};
use crate::core::probability::{favorite_of, Probability};

/// Share above which confidence amplification applies
const CONFIDENCE_PIVOT: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinearParams {
    pub home_boost: f64,
    pub draw_boost: f64,
    pub away_boost: f64,
    /// Favorite multiplied by (1 + fav_weight); 0 disables
    pub fav_weight: f64,
    /// Favorite multiplied by (1 + conf_boost * (share - 0.5)) when share > 0.5; 0 disables
    pub conf_boost: f64,
}

impl Default for LinearParams {
    fn default() -> Self {
        Self {
            home_boost: 1.0,
            draw_boost: 1.0,
            away_boost: 1.0,
            fav_weight: 0.0,
            conf_boost: 0.0,
        }
    }
}

impl LinearParams {
    /// Apply the reweighting to a probability triple
    ///
    /// Weights that cannot be renormalized leave the input unchanged.
    pub fn reweight(&self, probability: &Probability) -> Probability {
        let mut w = [
            probability.home * self.home_boost,
            probability.draw * self.draw_boost,
            probability.away * self.away_boost,
        ];

        let fav = favorite_of(&w).index();
        if self.fav_weight != 0.0 {
            w[fav] *= 1.0 + self.fav_weight;
        }

        if self.conf_boost != 0.0 {
            let total: f64 = w.iter().sum();
            if total > 0.0 {
                let share = w[fav] / total;
                if share > CONFIDENCE_PIVOT {
                    w[fav] *= 1.0 + self.conf_boost * (share - CONFIDENCE_PIVOT);
                }
            }
        }

        Probability::normalized(w).unwrap_or(*probability)
    }
}

impl ProbabilityTransform for LinearParams {
    fn adjust(&self, ctx: &MatchContext<'_>) -> Adjustment {
        Adjustment {
            probability: self.reweight(&ctx.probability),
            odds: ctx.odds,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "home_boost" => self.home_boost = value,
            "draw_boost" => self.draw_boost = value,
            "away_boost" => self.away_boost = value,
            "fav_weight" => self.fav_weight = value,
            "conf_boost" => self.conf_boost = value,
            _ => return false,
        }
        true
    }
}
