//! Value-edge detection
//!
//! Expected value per outcome: ev[i] = p[i] * odds[i].
//! The favorite (lowest odd) is classified as a strong favorite or as sitting
//! in the trap zone, and scaled depending on whether its EV clears the value
//! threshold. Any outcome with EV above the global threshold gets an extra
//! boost of (ev - 1) * ev_multiplier.

use serde::{Deserialize, Serialize};

use super::{Adjustment, MatchContext, ProbabilityTransform};
use crate::core::constants::OUTCOME_COUNT;
use crate::core::probability::Probability;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValueEdgeParams {
    /// Min odd below this marks a strong favorite
    pub strong_fav_odds: f64,
    /// Trap zone band for the min odd (inclusive)
    pub trap_low: f64,
    pub trap_high: f64,
    pub strong_fav_mult: f64,
    pub strong_fav_value_mult: f64,
    pub trap_mult: f64,
    pub trap_value_mult: f64,
    /// EV the favorite needs for the value multipliers
    pub value_threshold: f64,
    /// EV above which any outcome is boosted
    pub ev_threshold: f64,
    pub ev_multiplier: f64,
}

impl Default for ValueEdgeParams {
    fn default() -> Self {
        Self {
            strong_fav_odds: 1.5,
            trap_low: 1.8,
            trap_high: 2.3,
            strong_fav_mult: 1.1,
            strong_fav_value_mult: 1.25,
            trap_mult: 0.9,
            trap_value_mult: 1.05,
            value_threshold: 0.95,
            ev_threshold: 1.0,
            ev_multiplier: 1.0,
        }
    }
}

/// How the favorite of a match is priced
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FavoriteClass {
    Strong,
    Trap,
    Neutral,
}

impl ValueEdgeParams {
    pub fn classify(&self, min_odd: f64) -> FavoriteClass {
        if min_odd < self.strong_fav_odds {
            FavoriteClass::Strong
        } else if (self.trap_low..=self.trap_high).contains(&min_odd) {
            FavoriteClass::Trap
        } else {
            FavoriteClass::Neutral
        }
    }

    pub fn reweight(&self, probability: &Probability, odds: &[f64; OUTCOME_COUNT]) -> Probability {
        let p = probability.as_array();
        let ev: [f64; OUTCOME_COUNT] = [p[0] * odds[0], p[1] * odds[1], p[2] * odds[2]];

        // Favorite = lowest odd, ties in home, draw, away order
        let mut fav = 0;
        for i in 1..OUTCOME_COUNT {
            if odds[i] < odds[fav] {
                fav = i;
            }
        }

        let mut w = p;
        let has_value = ev[fav] >= self.value_threshold;
        match self.classify(odds[fav]) {
            FavoriteClass::Strong => {
                w[fav] *= if has_value {
                    self.strong_fav_value_mult
                } else {
                    self.strong_fav_mult
                };
            }
            FavoriteClass::Trap => {
                w[fav] *= if has_value {
                    self.trap_value_mult
                } else {
                    self.trap_mult
                };
            }
            FavoriteClass::Neutral => {}
        }

        for i in 0..OUTCOME_COUNT {
            if ev[i] > self.ev_threshold {
                w[i] *= 1.0 + (ev[i] - 1.0) * self.ev_multiplier;
            }
        }

        Probability::normalized(w).unwrap_or(*probability)
    }
}

impl ProbabilityTransform for ValueEdgeParams {
    fn adjust(&self, ctx: &MatchContext<'_>) -> Adjustment {
        Adjustment {
            probability: self.reweight(&ctx.probability, &ctx.odds),
            odds: ctx.odds,
        }
    }

    fn set_param(&mut self, name: &str, value: f64) -> bool {
        match name {
            "strong_fav_odds" => self.strong_fav_odds = value,
            "trap_low" => self.trap_low = value,
            "trap_high" => self.trap_high = value,
            "strong_fav_mult" => self.strong_fav_mult = value,
            "strong_fav_value_mult" => self.strong_fav_value_mult = value,
            "trap_mult" => self.trap_mult = value,
            "trap_value_mult" => self.trap_value_mult = value,
            "value_threshold" => self.value_threshold = value,
            "ev_threshold" => self.ev_threshold = value,
            "ev_multiplier" => self.ev_multiplier = value,
            _ => return false,
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let params = ValueEdgeParams::default();
        assert_eq!(params.classify(1.3), FavoriteClass::Strong);
        assert_eq!(params.classify(1.8), FavoriteClass::Trap);
        assert_eq!(params.classify(2.3), FavoriteClass::Trap);
        assert_eq!(params.classify(1.6), FavoriteClass::Neutral);
        assert_eq!(params.classify(2.6), FavoriteClass::Neutral);
    }

    #[test]
    fn test_strong_favorite_boosted() {
        let params = ValueEdgeParams {
            ev_threshold: 10.0,
            ..Default::default()
        };
        let odds = [1.3, 5.0, 9.0];
        let base = Probability::from_odds(&odds);
        // implied EV = 1 / overround ~ 0.926 < 0.95: non-value multiplier
        let p = params.reweight(&base, &odds);
        let w_home = base.home * 1.1;
        let expected = w_home / (w_home + base.draw + base.away);
        assert!((p.home - expected).abs() < 1e-9);
    }

    #[test]
    fn test_trap_zone_penalized() {
        let params = ValueEdgeParams {
            value_threshold: 2.0,
            ev_threshold: 10.0,
            ..Default::default()
        };
        let odds = [2.0, 3.3, 3.6];
        let base = Probability::from_odds(&odds);
        let p = params.reweight(&base, &odds);
        assert!(p.home < base.home);
        assert!((p.total() - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_strong_favorite_with_value() {
        let params = ValueEdgeParams {
            ev_threshold: 10.0,
            ..Default::default()
        };
        let odds = [1.3, 5.0, 9.0];
        // home EV = 0.75 * 1.3 = 0.975 clears 0.95
        let base = Probability::normalized([0.75, 0.15, 0.10]).unwrap();
        let p = params.reweight(&base, &odds);
        let w_home = 0.75 * 1.25;
        assert!((p.home - w_home / (w_home + 0.25)).abs() < 1e-9);
        assert!((p.draw - 0.15 / (w_home + 0.25)).abs() < 1e-9);
    }

    #[test]
    fn test_trap_favorite_with_value() {
        let params = ValueEdgeParams {
            ev_threshold: 10.0,
            ..Default::default()
        };
        let odds = [2.0, 3.3, 3.6];
        // home EV = 0.5 * 2.0 = 1.0 clears 0.95
        let base = Probability::normalized([0.5, 0.3, 0.2]).unwrap();
        let p = params.reweight(&base, &odds);
        let w_home = 0.5 * 1.05;
        assert!((p.home - w_home / (w_home + 0.5)).abs() < 1e-9);
        assert!(p.home > base.home);
    }

    #[test]
    fn test_global_ev_boost() {
        let params = ValueEdgeParams {
            ev_threshold: 1.0,
            ev_multiplier: 2.0,
            ..Default::default()
        };
        // draw mispriced: probability well above 1/odds
        let base = Probability::normalized([0.35, 0.40, 0.25]).unwrap();
        let odds = [2.6, 3.2, 3.9];
        let p = params.reweight(&base, &odds);
        assert!(p.draw > base.draw);
    }

    #[test]
    fn test_neutral_match_without_value_unchanged() {
        let params = ValueEdgeParams::default();
        let odds = [2.6, 3.1, 2.9];
        let base = Probability::from_odds(&odds);
        let p = params.reweight(&base, &odds);
        assert!((p.home - base.home).abs() < 1e-12);
        assert!((p.away - base.away).abs() < 1e-12);
    }
}
