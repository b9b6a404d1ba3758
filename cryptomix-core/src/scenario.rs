//! Scenario generation: current profile, alternatives, market regimes and
//! optimization variants, each normalized and scored.

use crate::allocation::{normalize, Allocation};
use crate::answers::InvestorAnswers;
use crate::compare::{compare, Comparison};
use crate::error::{EngineError, Result};
use crate::profile::{classify, tier_allocation, Tier};
use crate::scoring::{
    adjust_for_optimization, adjust_for_regime, expected_returns, penalized, risk_metrics,
    suitability_score, ReturnBand, RiskMetrics, OPTIMIZATION_PENALTY, REGIME_PENALTY,
};
use crate::transforms::{market_regime_adjust, optimization_adjust, Goal, Regime};
use crate::valuation::{portfolio_data, PortfolioData, PriceBook, PriceLookup};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ScenarioKind {
    Current,
    Alternative,
    MarketRegime { regime: Regime },
    Optimization { goal: Goal },
}

/// A scored allocation variant. Read-only once generated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scenario {
    pub id: String,
    pub name: String,
    pub kind: ScenarioKind,
    pub tier: Tier,
    pub recommended: bool,
    pub description: String,
    pub allocation: Allocation,
    pub expected_return: ReturnBand,
    pub risk_metrics: RiskMetrics,
    pub suitability_score: u8,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    pub portfolio_data: Option<PortfolioData>,
}

/// Generated scenarios, in generation order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ScenarioSet {
    scenarios: Vec<Scenario>,
}

impl ScenarioSet {
    pub fn get(&self, id: &str) -> Option<&Scenario> {
        self.scenarios.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scenario> {
        self.scenarios.iter()
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn ids(&self) -> Vec<&str> {
        self.scenarios.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn as_slice(&self) -> &[Scenario] {
        &self.scenarios
    }

    pub fn into_vec(self) -> Vec<Scenario> {
        self.scenarios
    }

    /// Compare the scenarios named by `ids`, or every scenario when `ids` is empty.
    pub fn compare(&self, ids: &[&str]) -> Result<Comparison> {
        if ids.is_empty() {
            return compare(&self.scenarios);
        }
        let selected = ids
            .iter()
            .map(|id| {
                self.get(id)
                    .cloned()
                    .ok_or_else(|| EngineError::UnknownScenario(id.to_string()))
            })
            .collect::<Result<Vec<_>>>()?;
        compare(&selected)
    }
}

fn tier_pros_cons(tier: Tier) -> (Vec<String>, Vec<String>) {
    let (pros, cons) = match tier {
        Tier::Conservative => (
            ["Heavy BTC anchor limits drawdowns", "Simple to hold and rebalance"],
            ["Less upside in strong bull markets", "High single-asset concentration"],
        ),
        Tier::Balanced => (
            ["Blend of reserve assets and growth exposure", "Spread across the whole asset universe"],
            ["Meaningful drawdowns in bear markets", "Needs periodic rebalancing"],
        ),
        Tier::Aggressive => (
            ["Highest upside potential", "Concentrated in high-beta ecosystems"],
            ["Deep drawdowns are likely", "No BTC anchor"],
        ),
    };
    (
        pros.iter().map(|s| s.to_string()).collect(),
        cons.iter().map(|s| s.to_string()).collect(),
    )
}

fn regime_pros_cons(regime: Regime) -> (Vec<String>, Vec<String>) {
    match regime {
        Regime::Bear => (
            vec!["Larger BTC cushion for downturns".to_string()],
            vec!["Gives up upside if the market recovers quickly".to_string()],
        ),
        Regime::Bull => (
            vec!["More exposure to high-beta rallies".to_string()],
            vec!["Larger losses if momentum reverses".to_string()],
        ),
    }
}

fn goal_pros_cons(goal: Goal) -> (Vec<String>, Vec<String>) {
    match goal {
        Goal::Growth => (
            vec!["Tilted toward high-volatility growth assets".to_string()],
            vec!["Higher risk score and deeper drawdowns".to_string()],
        ),
        Goal::Stability => (
            vec![
                "Speculative assets removed".to_string(),
                "Reserve assets weighted up".to_string(),
            ],
            vec!["Lower expected return".to_string()],
        ),
    }
}

/// Identity of a scenario being built.
struct ScenarioHead {
    id: String,
    name: String,
    kind: ScenarioKind,
    tier: Tier,
}

struct Builder<'a> {
    answers: &'a InvestorAnswers,
    prices: Option<&'a PriceBook>,
}

impl Builder<'_> {
    fn build(
        &self,
        head: ScenarioHead,
        allocation: Allocation,
        expected_return: ReturnBand,
        suitability: u8,
        (pros, cons): (Vec<String>, Vec<String>),
        description: String,
    ) -> Scenario {
        let ScenarioHead { id, name, kind, tier } = head;
        let portfolio_data = match (self.prices, self.answers.amount.value()) {
            (Some(book), Some(amount)) => {
                let data = portfolio_data(&allocation, amount, book);
                if data.is_none() {
                    tracing::warn!(scenario = %id, "valuation incomplete, continuing without portfolio data");
                }
                data
            }
            _ => None,
        };

        Scenario {
            risk_metrics: risk_metrics(tier, &allocation),
            id,
            name,
            kind,
            tier,
            recommended: kind == ScenarioKind::Current,
            description,
            allocation,
            expected_return,
            suitability_score: suitability,
            pros,
            cons,
            portfolio_data,
        }
    }
}

/// Produce the comparison set for `tier`.
///
/// Order: current tier, the other tiers, bear and bull (only with a positive
/// amount), then growth and stability optimizations.
pub fn generate(tier: Tier, answers: &InvestorAnswers, prices: Option<&PriceBook>) -> ScenarioSet {
    let horizon = classify(&answers.objective, &answers.risk).horizon;
    let builder = Builder { answers, prices };
    let mut scenarios = Vec::new();

    let current_allocation = tier_allocation(tier, horizon);
    let base_returns = expected_returns(tier);
    let base_suitability = suitability_score(tier, answers);

    scenarios.push(builder.build(
        ScenarioHead {
            id: format!("current-{tier}"),
            name: format!("Your {} Portfolio", tier.label()),
            kind: ScenarioKind::Current,
            tier,
        },
        current_allocation.clone(),
        base_returns,
        base_suitability,
        tier_pros_cons(tier),
        format!("Recommended {tier} allocation for a {horizon} horizon."),
    ));

    for alt in Tier::ALL.into_iter().filter(|t| *t != tier) {
        scenarios.push(builder.build(
            ScenarioHead {
                id: format!("alt-{alt}"),
                name: format!("{} Alternative", alt.label()),
                kind: ScenarioKind::Alternative,
                tier: alt,
            },
            tier_allocation(alt, horizon),
            expected_returns(alt),
            suitability_score(alt, answers),
            tier_pros_cons(alt),
            format!("What a {alt} posture would look like over the same horizon."),
        ));
    }

    if answers.amount.is_positive() {
        for (regime, id, label) in [
            (Regime::Bear, "bear-market", "Bear Market"),
            (Regime::Bull, "bull-market", "Bull Market"),
        ] {
            let allocation = normalize(&market_regime_adjust(&current_allocation, regime).without_zeros());
            scenarios.push(builder.build(
                ScenarioHead {
                    id: id.to_string(),
                    name: format!("{label} ({})", tier.label()),
                    kind: ScenarioKind::MarketRegime { regime },
                    tier,
                },
                allocation,
                adjust_for_regime(&base_returns, regime),
                penalized(base_suitability, REGIME_PENALTY),
                regime_pros_cons(regime),
                format!("Your {tier} allocation repositioned for a {} market.", label.to_lowercase()),
            ));
        }
    }

    for (goal, id, label) in [
        (Goal::Growth, "growth-optimized", "Growth Optimized"),
        (Goal::Stability, "stability-optimized", "Stability Optimized"),
    ] {
        let allocation = normalize(&optimization_adjust(&current_allocation, goal).without_zeros());
        scenarios.push(builder.build(
            ScenarioHead {
                id: id.to_string(),
                name: format!("{label} ({})", tier.label()),
                kind: ScenarioKind::Optimization { goal },
                tier,
            },
            allocation,
            adjust_for_optimization(&base_returns, goal),
            penalized(base_suitability, OPTIMIZATION_PENALTY),
            goal_pros_cons(goal),
            format!("Your {tier} allocation optimized for {}.", label.to_lowercase()),
        ));
    }

    tracing::debug!(%tier, count = scenarios.len(), "generated scenarios");
    ScenarioSet { scenarios }
}

/// Scenario generation backed by an external price source.
pub struct ScenarioEngine<P> {
    prices: P,
}

impl<P: PriceLookup> ScenarioEngine<P> {
    pub fn new(prices: P) -> Self {
        Self { prices }
    }

    /// Like [`generate`], but fetches prices first. A failed lookup is logged
    /// and every scenario is produced without valuation.
    pub fn generate(&self, tier: Tier, answers: &InvestorAnswers) -> ScenarioSet {
        let book = match self.prices.price_book() {
            Ok(book) => Some(book),
            Err(e) => {
                tracing::warn!(error = %e, "price lookup failed, generating without valuation");
                None
            }
        };
        generate(tier, answers, book.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::InvestableAmount;
    use crate::asset::Asset;

    fn answers_with_amount() -> InvestorAnswers {
        InvestorAnswers::from_tokens("medium", "medium").with_amount(InvestableAmount::Literal(10_000.0))
    }

    struct FailingLookup;

    impl PriceLookup for FailingLookup {
        fn price_book(&self) -> Result<PriceBook> {
            Err(EngineError::Valuation("market data offline".into()))
        }
    }

    #[test]
    fn test_scenario_order_with_amount() {
        let set = generate(Tier::Balanced, &answers_with_amount(), None);
        assert_eq!(
            set.ids(),
            vec![
                "current-balanced",
                "alt-conservative",
                "alt-aggressive",
                "bear-market",
                "bull-market",
                "growth-optimized",
                "stability-optimized",
            ]
        );
        assert!(set.get("current-balanced").unwrap().recommended);
        assert_eq!(set.iter().filter(|s| s.recommended).count(), 1);
    }

    #[test]
    fn test_no_regime_scenarios_without_amount() {
        let answers = InvestorAnswers::from_tokens("medium", "medium");
        let set = generate(Tier::Balanced, &answers, None);
        assert_eq!(set.len(), 5);
        assert!(set.get("bear-market").is_none());
    }

    #[test]
    fn test_every_scenario_is_normalized() {
        for tier in Tier::ALL {
            let set = generate(tier, &answers_with_amount(), None);
            for s in set.iter() {
                assert!(s.allocation.sums_to_100(), "{} sums to {}", s.id, s.allocation.total());
                assert!(s.allocation.iter().all(|(_, v)| v > 0.0), "{} kept a zero entry", s.id);
            }
        }
    }

    #[test]
    fn test_regime_and_optimization_penalties() {
        let set = generate(Tier::Balanced, &answers_with_amount(), None);
        let current = set.get("current-balanced").unwrap().suitability_score;
        assert_eq!(set.get("bear-market").unwrap().suitability_score, current - 10);
        assert_eq!(set.get("growth-optimized").unwrap().suitability_score, current - 5);
    }

    #[test]
    fn test_stability_scenario_drops_speculative() {
        let set = generate(Tier::Aggressive, &answers_with_amount(), None);
        let s = set.get("stability-optimized").unwrap();
        assert!(!s.allocation.contains(Asset::Spx6900));
        assert!(s.allocation.contains(Asset::Btc));
    }

    #[test]
    fn test_valuation_attached_when_prices_cover_allocation() {
        let mut book = PriceBook::new();
        for (i, asset) in Asset::ALL.into_iter().enumerate() {
            book = book.with_quote(asset, 10.0 * (i + 1) as f64, 1.0);
        }
        let set = generate(Tier::Balanced, &answers_with_amount(), Some(&book));
        for s in set.iter() {
            let data = s.portfolio_data.as_ref().expect("valuation present");
            assert!((data.total_value - 10_000.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_partial_prices_degrade_per_scenario() {
        // BTC only: scenarios holding anything else lose valuation but survive
        let book = PriceBook::new().with_quote(Asset::Btc, 60_000.0, 0.0);
        let set = generate(Tier::Conservative, &answers_with_amount(), Some(&book));
        assert_eq!(set.len(), 7);
        assert!(set.iter().all(|s| s.portfolio_data.is_none()));
    }

    #[test]
    fn test_engine_survives_failed_lookup() {
        let engine = ScenarioEngine::new(FailingLookup);
        let set = engine.generate(Tier::Balanced, &answers_with_amount());
        assert_eq!(set.len(), 7);
        assert!(set.iter().all(|s| s.portfolio_data.is_none()));
        assert!(set.compare(&[]).is_ok());
    }

    #[test]
    fn test_compare_by_ids() {
        let set = generate(Tier::Balanced, &answers_with_amount(), None);
        let cmp = set.compare(&["current-balanced", "alt-aggressive"]).unwrap();
        assert_eq!(cmp.metrics.len(), 2);

        assert_eq!(
            set.compare(&["current-balanced", "nope"]).unwrap_err(),
            EngineError::UnknownScenario("nope".to_string())
        );
    }
}
