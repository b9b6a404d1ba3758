//! Experiment assignment on top of the bucketer.
//!
//! The engine never stores anything itself: assignments go through an
//! `AssignmentStore` handed in by the caller.

use crate::allocation::normalize;
use crate::bucketer::{include_in_experiment, select_weighted_variant, FallbackReason};
use crate::error::Result;
use crate::profile::Profile;
use crate::transforms::{directional_bias, Bias};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A named arm of an experiment and the allocation change it applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub name: String,
    /// `None` is the control arm
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifier: Option<Bias>,
}

impl Variant {
    pub fn control(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            modifier: None,
        }
    }

    pub fn with_bias(name: impl Into<String>, bias: Bias) -> Self {
        Self {
            name: name.into(),
            modifier: Some(bias),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Experiment {
    pub id: String,
    /// Share of subjects enrolled, 0.0 - 1.0
    pub traffic: f64,
    pub variants: Vec<Variant>,
    pub weights: Vec<u32>,
}

impl Experiment {
    pub fn new(id: impl Into<String>, traffic: f64) -> Self {
        Self {
            id: id.into(),
            traffic: traffic.clamp(0.0, 1.0),
            variants: Vec::new(),
            weights: Vec::new(),
        }
    }

    pub fn with_variant(mut self, variant: Variant, weight: u32) -> Self {
        self.variants.push(variant);
        self.weights.push(weight);
        self
    }

    pub fn variant(&self, name: &str) -> Option<&Variant> {
        self.variants.iter().find(|v| v.name == name)
    }
}

/// Recorded, stable assignment of a subject to a variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub experiment_id: String,
    pub subject_id: String,
    pub variant: String,
    pub assigned_at: DateTime<Utc>,
    /// Set when the variant was defaulted because of bad weights
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackReason>,
}

/// Storage for assignments, owned by the caller.
pub trait AssignmentStore {
    fn get(&self, experiment_id: &str, subject_id: &str) -> Option<Assignment>;
    fn put(&mut self, assignment: Assignment);
}

#[derive(Debug, Default, Clone)]
pub struct MemoryAssignmentStore {
    assignments: HashMap<(String, String), Assignment>,
}

impl MemoryAssignmentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }
}

impl AssignmentStore for MemoryAssignmentStore {
    fn get(&self, experiment_id: &str, subject_id: &str) -> Option<Assignment> {
        self.assignments
            .get(&(experiment_id.to_string(), subject_id.to_string()))
            .cloned()
    }

    fn put(&mut self, assignment: Assignment) {
        self.assignments.insert(
            (assignment.experiment_id.clone(), assignment.subject_id.clone()),
            assignment,
        );
    }
}

/// Assign `subject_id` to a variant, reusing any stored assignment.
///
/// Returns `Ok(None)` when the subject falls outside the experiment's traffic.
pub fn assign<S: AssignmentStore + ?Sized>(
    experiment: &Experiment,
    subject_id: &str,
    store: &mut S,
    now: DateTime<Utc>,
) -> Result<Option<Assignment>> {
    if let Some(existing) = store.get(&experiment.id, subject_id) {
        return Ok(Some(existing));
    }

    if !include_in_experiment(subject_id, &experiment.id, experiment.traffic) {
        tracing::debug!(experiment = %experiment.id, subject_id, "subject outside experiment traffic");
        return Ok(None);
    }

    let selection = select_weighted_variant(
        subject_id,
        &experiment.id,
        &experiment.variants,
        &experiment.weights,
    )?;
    let fallback = selection.fallback_reason();
    let variant = selection.into_variant();

    let assignment = Assignment {
        experiment_id: experiment.id.clone(),
        subject_id: subject_id.to_string(),
        variant: variant.name.clone(),
        assigned_at: now,
        fallback,
    };
    tracing::debug!(experiment = %experiment.id, subject_id, variant = %assignment.variant, "new assignment");
    store.put(assignment.clone());

    Ok(Some(assignment))
}

/// Apply a variant's allocation modifier to a profile.
pub fn apply_variant(profile: &Profile, variant: &Variant) -> Profile {
    match variant.modifier {
        None => profile.clone(),
        Some(bias) => Profile {
            allocation: normalize(&directional_bias(&profile.allocation, bias).without_zeros()),
            ..profile.clone()
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::InvestorAnswers;
    use crate::asset::Asset;
    use crate::profile::classify_and_allocate;
    use chrono::TimeZone;

    fn experiment() -> Experiment {
        Experiment::new("allocation-modifier", 1.0)
            .with_variant(Variant::control("control"), 2)
            .with_variant(Variant::with_bias("conservative", Bias::MoreConservative), 1)
            .with_variant(Variant::with_bias("diversified", Bias::MoreDiversified), 1)
    }

    fn t(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap()
    }

    #[test]
    fn test_assignment_is_idempotent() {
        let exp = experiment();
        let mut store = MemoryAssignmentStore::new();
        let first = assign(&exp, "anon-123", &mut store, t(9)).unwrap().unwrap();
        let second = assign(&exp, "anon-123", &mut store, t(17)).unwrap().unwrap();
        assert_eq!(first, second);
        assert_eq!(second.assigned_at, t(9));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_recomputation_matches_without_store() {
        // Fresh stores still agree: the variant is a pure function of the ids
        let exp = experiment();
        let a = assign(&exp, "anon-9", &mut MemoryAssignmentStore::new(), t(1)).unwrap().unwrap();
        let b = assign(&exp, "anon-9", &mut MemoryAssignmentStore::new(), t(2)).unwrap().unwrap();
        assert_eq!(a.variant, b.variant);
    }

    #[test]
    fn test_zero_traffic_excludes_everyone() {
        let mut exp = experiment();
        exp.traffic = 0.0;
        let mut store = MemoryAssignmentStore::new();
        assert!(assign(&exp, "anon-1", &mut store, t(0)).unwrap().is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_malformed_weights_are_tagged() {
        let mut exp = experiment();
        exp.weights.pop();
        let a = assign(&exp, "anon-5", &mut MemoryAssignmentStore::new(), t(0))
            .unwrap()
            .unwrap();
        assert_eq!(a.variant, "control");
        assert_eq!(a.fallback, Some(FallbackReason::LengthMismatch));
    }

    #[test]
    fn test_apply_variant() {
        let profile = classify_and_allocate(&InvestorAnswers::from_tokens("medium", "medium"));
        let exp = experiment();

        let control = apply_variant(&profile, exp.variant("control").unwrap());
        assert_eq!(control, profile);

        let conservative = apply_variant(&profile, exp.variant("conservative").unwrap());
        assert!(conservative.allocation.get(Asset::Btc) > profile.allocation.get(Asset::Btc));
        assert!(conservative.allocation.sums_to_100());
        assert_eq!(conservative.tier, profile.tier);
    }

    #[test]
    fn test_assignment_serde_skips_empty_fallback() {
        let a = Assignment {
            experiment_id: "e".into(),
            subject_id: "s".into(),
            variant: "control".into(),
            assigned_at: t(0),
            fallback: None,
        };
        let json = serde_json::to_string(&a).unwrap();
        assert!(!json.contains("fallback"));
        let back: Assignment = serde_json::from_str(&json).unwrap();
        assert_eq!(back, a);
    }
}
