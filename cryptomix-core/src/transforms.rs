//! Allocation transforms: directional bias, market regime, optimization goal.
//!
//! Every transform is `&Allocation -> Allocation`, runs before normalization,
//! reads missing assets as zero and never leaves a negative weight.

use crate::allocation::Allocation;
use crate::asset::Asset;
use serde::{Deserialize, Serialize};

const BIAS_RESERVE_DELTA: f64 = 10.0;
/// Where a more-aggressive bias sends the weight it takes from BTC
const HIGH_BETA_SPLIT: [(Asset, f64); 3] = [(Asset::Sol, 0.5), (Asset::Pendle, 0.3), (Asset::Spx6900, 0.2)];

const BEAR_RESERVE_DELTA: f64 = 15.0;
const BULL_RESERVE_DELTA: f64 = 10.0;
const BULL_GROWTH_DELTAS: [(Asset, f64); 3] = [(Asset::Sol, 4.0), (Asset::Pendle, 3.0), (Asset::Spx6900, 3.0)];

const GROWTH_ADDS: [(Asset, f64); 3] = [(Asset::Sol, 5.0), (Asset::Pendle, 5.0), (Asset::Spx6900, 5.0)];
const GROWTH_TRIMS: [(Asset, f64); 2] = [(Asset::Btc, 10.0), (Asset::Bnb, 5.0)];
const STABILITY_ADDS: [(Asset, f64); 2] = [(Asset::Btc, 10.0), (Asset::Eth, 5.0)];
const STABILITY_VOLATILE_CUT: f64 = 15.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Bias {
    MoreConservative,
    MoreAggressive,
    MoreDiversified,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Regime {
    Bull,
    Bear,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Goal {
    Growth,
    Stability,
}

/// Subtract up to `delta` from `asset`, returning how much was actually taken.
fn take(allocation: &mut Allocation, asset: Asset, delta: f64) -> f64 {
    let current = allocation.get(asset);
    let taken = delta.min(current).max(0.0);
    if taken > 0.0 {
        allocation.set(asset, current - taken);
    }
    taken
}

pub fn directional_bias(allocation: &Allocation, bias: Bias) -> Allocation {
    let mut out = allocation.clone();
    match bias {
        Bias::MoreConservative => {
            out.draw_proportionally(BIAS_RESERVE_DELTA, &[Asset::PRIMARY_RESERVE]);
            out.add(Asset::PRIMARY_RESERVE, BIAS_RESERVE_DELTA);
        }
        Bias::MoreAggressive => {
            let freed = take(&mut out, Asset::PRIMARY_RESERVE, BIAS_RESERVE_DELTA);
            for (asset, share) in HIGH_BETA_SPLIT {
                out.add(asset, freed * share);
            }
        }
        Bias::MoreDiversified => {
            let held = out.held();
            if !held.is_empty() {
                let equal = 100.0 / held.len() as f64;
                for asset in held {
                    let old = out.get(asset);
                    out.set(asset, (old + equal) / 2.0);
                }
            }
        }
    }
    out.clamp_non_negative();
    out
}

pub fn market_regime_adjust(allocation: &Allocation, regime: Regime) -> Allocation {
    let mut out = allocation.clone();
    match regime {
        Regime::Bear => {
            // Seeds a BTC position when none exists
            out.draw_proportionally(BEAR_RESERVE_DELTA, &[Asset::PRIMARY_RESERVE]);
            out.add(Asset::PRIMARY_RESERVE, BEAR_RESERVE_DELTA);
        }
        Regime::Bull => {
            take(&mut out, Asset::PRIMARY_RESERVE, BULL_RESERVE_DELTA);
            for (asset, delta) in BULL_GROWTH_DELTAS {
                out.add(asset, delta);
            }
        }
    }
    out.clamp_non_negative();
    out
}

pub fn optimization_adjust(allocation: &Allocation, goal: Goal) -> Allocation {
    let mut out = allocation.clone();
    match goal {
        Goal::Growth => {
            for (asset, delta) in GROWTH_ADDS {
                out.add(asset, delta);
            }
            for (asset, delta) in GROWTH_TRIMS {
                take(&mut out, asset, delta);
            }
        }
        Goal::Stability => {
            for (asset, delta) in STABILITY_ADDS {
                out.add(asset, delta);
            }
            for asset in Asset::ALL.iter().filter(|a| a.is_speculative()) {
                if out.get(*asset) > 0.0 {
                    out.set(*asset, 0.0);
                }
            }
            let volatile: Vec<Asset> = out.held().into_iter().filter(|a| a.is_volatile()).collect();
            if !volatile.is_empty() {
                let per_asset = STABILITY_VOLATILE_CUT / volatile.len() as f64;
                for asset in volatile {
                    out.add(asset, -per_asset);
                }
            }
        }
    }
    out.clamp_non_negative();
    out
}
