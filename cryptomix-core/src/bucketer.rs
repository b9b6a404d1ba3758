//! Deterministic bucketing for experiment inclusion and variant choice.
//!
//! Same string in, same bucket out. No clocks, no RNG.

use crate::error::{EngineError, Result};
use serde::{Deserialize, Serialize};

/// Rolling `h * 31 + unit` hash over UTF-16 code units, wrapped to i32.
pub fn hash_code(seed: &str) -> i32 {
    seed.encode_utf16()
        .fold(0i32, |h, unit| h.wrapping_mul(31).wrapping_add(unit as i32))
}

/// Map `seed` into `[0, modulus)`. A zero modulus maps everything to 0.
pub fn bucket(seed: &str, modulus: u32) -> u32 {
    if modulus == 0 {
        return 0;
    }
    // i64 so that |i32::MIN| does not overflow
    let h = (hash_code(seed) as i64).unsigned_abs();
    (h % modulus as u64) as u32
}

/// Whether `subject_id` falls inside the experiment's traffic slice.
pub fn include_in_experiment(subject_id: &str, experiment_id: &str, traffic: f64) -> bool {
    let b = bucket(&format!("{subject_id}{experiment_id}"), 100);
    (b as f64) < traffic * 100.0
}

/// Why a weighted selection fell back to the first variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FallbackReason {
    LengthMismatch,
    ZeroTotalWeight,
    /// Weights sum past `u32::MAX`
    OverflowingWeights,
}

/// Outcome of a weighted selection, tagged so callers can tell a real
/// assignment from a defaulted one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantSelection<T> {
    Selected(T),
    Fallback { variant: T, reason: FallbackReason },
}

impl<T> VariantSelection<T> {
    pub fn variant(&self) -> &T {
        match self {
            VariantSelection::Selected(v) => v,
            VariantSelection::Fallback { variant, .. } => variant,
        }
    }

    pub fn into_variant(self) -> T {
        match self {
            VariantSelection::Selected(v) => v,
            VariantSelection::Fallback { variant, .. } => variant,
        }
    }

    pub fn fallback_reason(&self) -> Option<FallbackReason> {
        match self {
            VariantSelection::Selected(_) => None,
            VariantSelection::Fallback { reason, .. } => Some(*reason),
        }
    }
}

/// Pick a variant with probability proportional to its weight.
pub fn select_weighted_variant<'a, T>(
    subject_id: &str,
    experiment_id: &str,
    variants: &'a [T],
    weights: &[u32],
) -> Result<VariantSelection<&'a T>> {
    let first = variants.first().ok_or(EngineError::NoVariants)?;

    if variants.len() != weights.len() {
        tracing::warn!(
            experiment_id,
            variants = variants.len(),
            weights = weights.len(),
            "variant/weight length mismatch, using first variant"
        );
        return Ok(VariantSelection::Fallback {
            variant: first,
            reason: FallbackReason::LengthMismatch,
        });
    }

    let total: u64 = weights.iter().map(|w| *w as u64).sum();
    let reason = if total == 0 {
        Some(FallbackReason::ZeroTotalWeight)
    } else if total > u32::MAX as u64 {
        Some(FallbackReason::OverflowingWeights)
    } else {
        None
    };
    if let Some(reason) = reason {
        tracing::warn!(experiment_id, total, ?reason, "unusable total weight, using first variant");
        return Ok(VariantSelection::Fallback { variant: first, reason });
    }

    let h = bucket(&format!("{subject_id}{experiment_id}variant"), total as u32) as u64;
    let mut cumulative = 0u64;
    for (variant, w) in variants.iter().zip(weights) {
        cumulative += *w as u64;
        if h < cumulative {
            return Ok(VariantSelection::Selected(variant));
        }
    }

    // h < total always holds, so the scan above returns
    Ok(VariantSelection::Selected(first))
}
