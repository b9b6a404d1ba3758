//! Risk/return scoring: return bands, risk metrics, suitability.

use crate::allocation::Allocation;
use crate::answers::InvestorAnswers;
use crate::asset::Asset;
use crate::profile::{classify, Tier};
use crate::transforms::{Goal, Regime};
use serde::Serialize;

const SPECULATIVE_THRESHOLD: f64 = 15.0;
const RESERVE_THRESHOLD: f64 = 60.0;
const DEFI_THRESHOLD: f64 = 10.0;
const CONCENTRATION_THRESHOLD: f64 = 50.0;

pub const BASE_SUITABILITY: i32 = 70;
pub const REGIME_PENALTY: i32 = 10;
pub const OPTIMIZATION_PENALTY: i32 = 5;

/// Expected annual return band, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReturnBand {
    pub min: f64,
    pub max: f64,
    pub average: f64,
    pub quarterly: f64,
    pub yearly: f64,
}

impl ReturnBand {
    /// Derive average/quarterly/yearly from a min-max range, floored at zero.
    pub fn from_range(min: f64, max: f64) -> Self {
        let min = min.max(0.0);
        let max = max.max(min);
        let average = (min + max) / 2.0;
        Self {
            min,
            max,
            average,
            quarterly: (average / 4.0 * 10.0).round() / 10.0,
            yearly: average,
        }
    }

    pub fn width(&self) -> f64 {
        self.max - self.min
    }

    fn shifted(&self, min_delta: f64, max_delta: f64) -> Self {
        Self::from_range(self.min + min_delta, self.max + max_delta)
    }
}

pub fn expected_returns(tier: Tier) -> ReturnBand {
    match tier {
        Tier::Conservative => ReturnBand::from_range(8.0, 25.0),
        Tier::Balanced => ReturnBand::from_range(15.0, 50.0),
        Tier::Aggressive => ReturnBand::from_range(25.0, 100.0),
    }
}

/// Bear only lowers the band and floors it at zero.
pub fn adjust_for_regime(returns: &ReturnBand, regime: Regime) -> ReturnBand {
    match regime {
        Regime::Bear => returns.shifted(-10.0, -25.0),
        Regime::Bull => returns.shifted(5.0, 30.0),
    }
}

pub fn adjust_for_optimization(returns: &ReturnBand, goal: Goal) -> ReturnBand {
    match goal {
        Goal::Growth => returns.shifted(3.0, 20.0),
        Goal::Stability => returns.shifted(-3.0, -15.0),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConcentrationRisk {
    Medium,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetrics {
    pub volatility: &'static str,
    pub max_drawdown: &'static str,
    /// 1 (calm) to 10 (wild)
    pub risk_score: u8,
    /// 0 to 10, two points per held asset
    pub diversification_score: u8,
    pub concentration_risk: ConcentrationRisk,
    /// Herfindahl-Hirschman index over percentages, 0..=10_000
    pub hhi: f64,
    /// 10_000 / hhi: the number of equal positions with the same concentration
    pub effective_assets: f64,
}

fn base_risk(tier: Tier) -> (&'static str, &'static str, i32) {
    match tier {
        Tier::Conservative => ("Low-Medium", "20-35%", 3),
        Tier::Balanced => ("Medium-High", "35-55%", 5),
        Tier::Aggressive => ("High", "55-80%", 8),
    }
}

/// Sum of squared percentages.
pub fn herfindahl_index(allocation: &Allocation) -> f64 {
    allocation.iter().map(|(_, v)| v * v).sum()
}

pub fn risk_metrics(tier: Tier, allocation: &Allocation) -> RiskMetrics {
    let (volatility, max_drawdown, mut score) = base_risk(tier);

    let speculative_heavy = allocation
        .iter()
        .any(|(a, v)| a.is_speculative() && v > SPECULATIVE_THRESHOLD);
    if speculative_heavy {
        score += 2;
    }
    if allocation.get(Asset::PRIMARY_RESERVE) > RESERVE_THRESHOLD {
        score -= 1;
    }
    let defi_heavy = allocation.iter().any(|(a, v)| a.is_defi() && v > DEFI_THRESHOLD);
    if defi_heavy {
        score += 1;
    }

    let held = allocation.held().len();
    let concentration_risk = if allocation.iter().any(|(_, v)| v > CONCENTRATION_THRESHOLD) {
        ConcentrationRisk::High
    } else {
        ConcentrationRisk::Medium
    };

    let hhi = herfindahl_index(allocation);
    let effective_assets = if hhi > 0.0 { 10_000.0 / hhi } else { 0.0 };

    RiskMetrics {
        volatility,
        max_drawdown,
        risk_score: score.clamp(1, 10) as u8,
        diversification_score: (2 * held).min(10) as u8,
        concentration_risk,
        hhi,
        effective_assets,
    }
}

/// How well a tier fits the investor, 0 to 100.
pub fn suitability_score(tier: Tier, answers: &InvestorAnswers) -> u8 {
    let mut score = BASE_SUITABILITY;

    if answers.risk == tier.expected_risk() {
        score += 15;
    } else {
        score -= 10;
    }

    let horizon = classify(&answers.objective, &answers.risk).horizon;
    if tier.suits_horizon(horizon) {
        score += 10;
    }

    if answers.experience >= tier.required_experience() {
        score += 5;
    }

    score.clamp(0, 100) as u8
}

/// Apply a flat penalty to a base-tier score, staying within 0..=100.
pub fn penalized(score: u8, penalty: i32) -> u8 {
    (score as i32 - penalty).clamp(0, 100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::Experience;
    use crate::profile::base_allocation;

    #[test]
    fn test_return_bands_monotonic() {
        let c = expected_returns(Tier::Conservative);
        let b = expected_returns(Tier::Balanced);
        let a = expected_returns(Tier::Aggressive);
        assert!(c.average < b.average && b.average < a.average);
        assert!(c.width() < b.width() && b.width() < a.width());
        assert_eq!(b.average, 32.5);
        assert_eq!(b.quarterly, 8.1);
    }

    #[test]
    fn test_bear_never_goes_negative() {
        let c = expected_returns(Tier::Conservative);
        let bear = adjust_for_regime(&c, Regime::Bear);
        assert_eq!(bear.min, 0.0);
        assert_eq!(bear.max, 0.0);
        assert!(bear.average >= 0.0);

        let stable = adjust_for_optimization(&c, Goal::Stability);
        assert_eq!(stable.min, 5.0);
        assert_eq!(stable.max, 10.0);
    }

    #[test]
    fn test_bull_and_growth_raise_band() {
        let b = expected_returns(Tier::Balanced);
        assert!(adjust_for_regime(&b, Regime::Bull).average > b.average);
        assert!(adjust_for_optimization(&b, Goal::Growth).average > b.average);
    }

    #[test]
    fn test_risk_scores_ordered_for_base_tables() {
        let scores: Vec<u8> = Tier::ALL
            .iter()
            .map(|t| risk_metrics(*t, &base_allocation(*t)).risk_score)
            .collect();
        assert!(scores[0] < scores[1] && scores[1] < scores[2], "{scores:?}");
        // Conservative: 3 - 1 (BTC 70 > 60); aggressive: 8 + 1 (PENDLE 15 > 10)
        assert_eq!(scores, vec![2, 5, 9]);
    }

    #[test]
    fn test_risk_adjustments_and_clamp() {
        let meme_heavy = Allocation::from_pairs(&[(Asset::Spx6900, 40.0), (Asset::Pendle, 30.0), (Asset::Sol, 30.0)]);
        let m = risk_metrics(Tier::Aggressive, &meme_heavy);
        assert_eq!(m.risk_score, 10);
        assert_eq!(m.diversification_score, 6);
        assert_eq!(m.concentration_risk, ConcentrationRisk::Medium);
    }

    #[test]
    fn test_concentration_and_hhi() {
        let c = base_allocation(Tier::Conservative);
        let m = risk_metrics(Tier::Conservative, &c);
        assert_eq!(m.concentration_risk, ConcentrationRisk::High);
        assert_eq!(m.diversification_score, 10);
        assert_eq!(m.hhi, 4900.0 + 169.0 + 49.0 + 25.0 + 25.0);

        let solo = Allocation::from_pairs(&[(Asset::Btc, 100.0)]);
        let m = risk_metrics(Tier::Conservative, &solo);
        assert_eq!(m.hhi, 10_000.0);
        assert_eq!(m.effective_assets, 1.0);
        assert_eq!(m.diversification_score, 2);
    }

    #[test]
    fn test_suitability_scoring() {
        let answers = InvestorAnswers::from_tokens("medium", "low");
        // match +15, conservative suits medium +10, beginner supports conservative +5
        assert_eq!(suitability_score(Tier::Conservative, &answers), 100);
        // mismatch -10, conservative-only horizon fit fails for aggressive, no experience
        assert_eq!(suitability_score(Tier::Aggressive, &answers), 60);

        let advanced = InvestorAnswers::from_tokens("long", "high").with_experience(Experience::Advanced);
        assert_eq!(suitability_score(Tier::Aggressive, &advanced), 100);
        assert_eq!(suitability_score(Tier::Balanced, &advanced), 75);
    }

    #[test]
    fn test_penalty_floors_at_zero() {
        assert_eq!(penalized(80, REGIME_PENALTY), 70);
        assert_eq!(penalized(3, REGIME_PENALTY), 0);
    }
}
