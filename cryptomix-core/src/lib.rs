//! cryptomix-core: allocation and scenario analysis engine for crypto portfolios.
//!
//! Answers go in, a normalized allocation comes out, and a set of scored
//! scenarios can be ranked against each other. Everything here is synchronous
//! and deterministic; storage and price fetching belong to the caller.

pub mod allocation;
pub mod answers;
pub mod asset;
pub mod bucketer;
pub mod compare;
pub mod error;
pub mod experiment;
pub mod profile;
pub mod scenario;
pub mod scoring;
pub mod transforms;
pub mod valuation;

pub use allocation::{normalize, Allocation};
pub use answers::{AmountBucket, Experience, InvestableAmount, InvestorAnswers, Objective, RiskTolerance};
pub use asset::{Asset, AssetCategory};
pub use bucketer::{bucket, include_in_experiment, select_weighted_variant, FallbackReason, VariantSelection};
pub use compare::{compare, Comparison, Recommendation, RecommendationKind, ScenarioMetrics};
pub use error::{EngineError, Result};
pub use experiment::{apply_variant, assign, Assignment, AssignmentStore, Experiment, MemoryAssignmentStore, Variant};
pub use profile::{base_allocation, classify, classify_and_allocate, Classification, Horizon, Profile, Tier};
pub use scenario::{generate, Scenario, ScenarioEngine, ScenarioKind, ScenarioSet};
pub use scoring::{expected_returns, risk_metrics, suitability_score, ConcentrationRisk, ReturnBand, RiskMetrics};
pub use transforms::{directional_bias, market_regime_adjust, optimization_adjust, Bias, Goal, Regime};
pub use valuation::{PortfolioData, PriceBook, PriceLookup, Quote};

/// Generate the comparison set for `tier` without valuation context.
pub fn generate_scenarios(tier: Tier, answers: &InvestorAnswers) -> ScenarioSet {
    generate(tier, answers, None)
}
