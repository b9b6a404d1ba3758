//! Profile classification: (objective x risk) -> (tier, horizon), base
//! allocation tables, and horizon adjustments.

use crate::allocation::{normalize, Allocation};
use crate::answers::{Experience, InvestorAnswers, Objective, RiskTolerance};
use crate::asset::Asset;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Points shifted into the secondary reserve by a short or long horizon
const HORIZON_SHIFT: f64 = 5.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Conservative,
    Balanced,
    Aggressive,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::Conservative, Tier::Balanced, Tier::Aggressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Conservative => "conservative",
            Tier::Balanced => "balanced",
            Tier::Aggressive => "aggressive",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Conservative => "Conservative",
            Tier::Balanced => "Balanced",
            Tier::Aggressive => "Aggressive",
        }
    }

    /// The risk answer this tier is built for.
    pub fn expected_risk(&self) -> RiskTolerance {
        match self {
            Tier::Conservative => RiskTolerance::Low,
            Tier::Balanced => RiskTolerance::Medium,
            Tier::Aggressive => RiskTolerance::High,
        }
    }

    /// Minimum experience level that comfortably supports this tier.
    pub fn required_experience(&self) -> Experience {
        match self {
            Tier::Conservative => Experience::Beginner,
            Tier::Balanced => Experience::Intermediate,
            Tier::Aggressive => Experience::Advanced,
        }
    }

    pub fn suits_horizon(&self, horizon: Horizon) -> bool {
        match self {
            Tier::Conservative => matches!(horizon, Horizon::Short | Horizon::Medium),
            Tier::Balanced => matches!(horizon, Horizon::Medium | Horizon::Long),
            Tier::Aggressive => horizon == Horizon::Long,
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Horizon {
    Short,
    Medium,
    Long,
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Horizon::Short => "short",
            Horizon::Medium => "medium",
            Horizon::Long => "long",
        })
    }
}

/// Output of the decision table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub tier: Tier,
    pub horizon: Horizon,
    pub alert: Option<String>,
}

/// A classified investor with a ready-to-display allocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Profile {
    pub tier: Tier,
    pub horizon: Horizon,
    pub allocation: Allocation,
    pub alert: Option<String>,
}

/// Map objective and risk onto a tier and horizon.
///
/// Total over the 9 known combinations; unknown tokens fall back to
/// balanced/medium without an alert.
pub fn classify(objective: &Objective, risk: &RiskTolerance) -> Classification {
    use Objective as O;
    use RiskTolerance as R;

    let (tier, horizon, alert) = match (objective, risk) {
        (O::VeryShort, R::Low) => (
            Tier::Conservative,
            Horizon::Short,
            Some("A very short horizon with low risk tolerance is hard to satisfy in crypto; consider a longer holding period or lower exposure."),
        ),
        (O::VeryShort, R::Medium) => (Tier::Balanced, Horizon::Short, None),
        (O::VeryShort, R::High) => (
            Tier::Aggressive,
            Horizon::Short,
            Some("Short-term high-risk positioning is close to speculation; only commit capital you can afford to lose."),
        ),
        (O::Medium, R::Low) => (Tier::Conservative, Horizon::Medium, None),
        (O::Medium, R::Medium) => (Tier::Balanced, Horizon::Medium, None),
        (O::Medium, R::High) => (Tier::Aggressive, Horizon::Medium, None),
        (O::Long, R::Low) => (Tier::Conservative, Horizon::Long, None),
        (O::Long, R::Medium) => (Tier::Balanced, Horizon::Long, None),
        (O::Long, R::High) => (Tier::Aggressive, Horizon::Long, None),
        (o, r) => {
            tracing::warn!(objective = ?o, risk = ?r, "unrecognized answers, using balanced/medium");
            (Tier::Balanced, Horizon::Medium, None)
        }
    };

    Classification {
        tier,
        horizon,
        alert: alert.map(str::to_string),
    }
}

/// Fixed asset mix per tier. Entry order decides which asset absorbs the
/// normalizer's rounding remainder.
pub fn base_allocation(tier: Tier) -> Allocation {
    match tier {
        Tier::Conservative => Allocation::from_pairs(&[
            (Asset::Btc, 70.0),
            (Asset::Eth, 13.0),
            (Asset::Bnb, 7.0),
            (Asset::Sol, 5.0),
            (Asset::Xrp, 5.0),
        ]),
        Tier::Balanced => Allocation::from_pairs(&[
            (Asset::Btc, 40.0),
            (Asset::Eth, 25.0),
            (Asset::Sol, 12.0),
            (Asset::Bnb, 8.0),
            (Asset::Xrp, 7.0),
            (Asset::Pendle, 5.0),
            (Asset::Spx6900, 3.0),
        ]),
        // No BTC: higher-beta assets only
        Tier::Aggressive => Allocation::from_pairs(&[
            (Asset::Eth, 30.0),
            (Asset::Sol, 25.0),
            (Asset::Pendle, 15.0),
            (Asset::Spx6900, 12.0),
            (Asset::Bnb, 10.0),
            (Asset::Xrp, 8.0),
        ]),
    }
}

/// Shift weight into the secondary reserve for short and long horizons.
/// Runs before normalization; clamps at zero after subtracting.
pub fn adjust_for_horizon(allocation: &Allocation, horizon: Horizon) -> Allocation {
    let mut out = allocation.clone();
    match horizon {
        Horizon::Medium => {}
        Horizon::Short => {
            out.draw_proportionally(HORIZON_SHIFT, &[Asset::SECONDARY_RESERVE]);
            out.add(Asset::SECONDARY_RESERVE, HORIZON_SHIFT);
        }
        Horizon::Long => {
            if out.contains(Asset::PRIMARY_RESERVE) {
                out.add(Asset::PRIMARY_RESERVE, -HORIZON_SHIFT);
            } else {
                out.draw_proportionally(HORIZON_SHIFT, &[Asset::SECONDARY_RESERVE]);
            }
            out.add(Asset::SECONDARY_RESERVE, HORIZON_SHIFT);
        }
    }
    out.clamp_non_negative();
    out
}

/// Tier allocation with the horizon shift applied, zeros pruned, normalized.
pub fn tier_allocation(tier: Tier, horizon: Horizon) -> Allocation {
    normalize(&adjust_for_horizon(&base_allocation(tier), horizon).without_zeros())
}

/// Full questionnaire path: classify, look up the base mix, adjust, normalize.
pub fn classify_and_allocate(answers: &InvestorAnswers) -> Profile {
    let c = classify(&answers.objective, &answers.risk);
    tracing::debug!(tier = %c.tier, horizon = %c.horizon, alert = c.alert.is_some(), "classified answers");

    Profile {
        tier: c.tier,
        horizon: c.horizon,
        allocation: tier_allocation(c.tier, c.horizon),
        alert: c.alert,
    }
}
