//! Scenario comparison: ranking by return, risk and suitability, plus a few
//! rule-based recommendations.

use crate::error::{EngineError, Result};
use crate::profile::Tier;
use crate::scenario::Scenario;
use serde::Serialize;

const LOW_RISK_CEILING: u8 = 4;
const HIGH_RETURN_FLOOR: f64 = 40.0;

/// One row of the comparison table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioMetrics {
    pub id: String,
    pub name: String,
    pub tier: Tier,
    pub average_return: f64,
    pub risk_score: u8,
    pub diversification_score: u8,
    pub suitability_score: u8,
}

impl From<&Scenario> for ScenarioMetrics {
    fn from(s: &Scenario) -> Self {
        Self {
            id: s.id.clone(),
            name: s.name.clone(),
            tier: s.tier,
            average_return: s.expected_return.average,
            risk_score: s.risk_metrics.risk_score,
            diversification_score: s.risk_metrics.diversification_score,
            suitability_score: s.suitability_score,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecommendationKind {
    Balanced,
    LowestRisk,
    HighestReturn,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub kind: RecommendationKind,
    pub scenario_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub best_return: String,
    pub lowest_risk: String,
    pub best_suitability: String,
    /// Input order
    pub metrics: Vec<ScenarioMetrics>,
    /// Ascending risk score
    pub by_risk: Vec<String>,
    /// Descending average return
    pub by_return: Vec<String>,
    pub recommendations: Vec<Recommendation>,
}

/// First row for which `better(candidate, current_best)` never fires again.
fn pick<'a>(
    rows: &'a [ScenarioMetrics],
    better: impl Fn(&ScenarioMetrics, &ScenarioMetrics) -> bool,
) -> &'a ScenarioMetrics {
    let mut best = &rows[0];
    for row in &rows[1..] {
        if better(row, best) {
            best = row;
        }
    }
    best
}

/// Rank a set of scenarios. Needs at least two.
pub fn compare(scenarios: &[Scenario]) -> Result<Comparison> {
    if scenarios.len() < 2 {
        return Err(EngineError::InsufficientScenarios {
            found: scenarios.len(),
        });
    }

    let metrics: Vec<ScenarioMetrics> = scenarios.iter().map(ScenarioMetrics::from).collect();

    let best_return = pick(&metrics, |a, b| a.average_return > b.average_return);
    let lowest_risk = pick(&metrics, |a, b| a.risk_score < b.risk_score);
    let best_suitability = pick(&metrics, |a, b| a.suitability_score > b.suitability_score);

    let mut risk_sorted: Vec<&ScenarioMetrics> = metrics.iter().collect();
    risk_sorted.sort_by_key(|m| m.risk_score);

    let mut return_sorted: Vec<&ScenarioMetrics> = metrics.iter().collect();
    return_sorted.sort_by(|a, b| b.average_return.total_cmp(&a.average_return));

    let mut recommendations = Vec::new();
    if let Some(balanced) = metrics.iter().find(|m| m.tier == Tier::Balanced) {
        recommendations.push(Recommendation {
            kind: RecommendationKind::Balanced,
            scenario_id: balanced.id.clone(),
            reason: format!("{} balances growth and downside protection", balanced.name),
        });
    }
    if lowest_risk.risk_score <= LOW_RISK_CEILING {
        recommendations.push(Recommendation {
            kind: RecommendationKind::LowestRisk,
            scenario_id: lowest_risk.id.clone(),
            reason: format!(
                "{} carries the lowest risk (score {}/10)",
                lowest_risk.name, lowest_risk.risk_score
            ),
        });
    }
    if best_return.average_return > HIGH_RETURN_FLOOR {
        recommendations.push(Recommendation {
            kind: RecommendationKind::HighestReturn,
            scenario_id: best_return.id.clone(),
            reason: format!(
                "{} targets the highest return (~{:.1}% a year)",
                best_return.name, best_return.average_return
            ),
        });
    }

    Ok(Comparison {
        best_return: best_return.id.clone(),
        lowest_risk: lowest_risk.id.clone(),
        best_suitability: best_suitability.id.clone(),
        by_risk: risk_sorted.iter().map(|m| m.id.clone()).collect(),
        by_return: return_sorted.iter().map(|m| m.id.clone()).collect(),
        recommendations,
        metrics,
    })
}
