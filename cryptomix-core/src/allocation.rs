//! Ordered allocations and the sum-to-100 normalizer.
//!
//! An allocation is an ordered sequence of (asset, percentage) pairs. Order is
//! part of the contract: `normalize` gives the rounding remainder to the last
//! entry, so callers decide which asset absorbs it by how they build the list.

use crate::asset::Asset;
use serde::ser::{Serialize, SerializeMap, Serializer};

/// Tolerance used when checking that an allocation sums to 100.
pub const SUM_TOLERANCE: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Allocation {
    entries: Vec<(Asset, f64)>,
}

impl Allocation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(Asset, f64)]) -> Self {
        let mut out = Self::new();
        for (asset, pct) in pairs {
            out.set(*asset, *pct);
        }
        out
    }

    /// Percentage for `asset`, 0 when absent.
    pub fn get(&self, asset: Asset) -> f64 {
        self.entries
            .iter()
            .find(|(a, _)| *a == asset)
            .map(|(_, v)| *v)
            .unwrap_or(0.0)
    }

    /// Update in place, or append at the end if the asset is new.
    pub fn set(&mut self, asset: Asset, pct: f64) {
        match self.entries.iter_mut().find(|(a, _)| *a == asset) {
            Some(entry) => entry.1 = pct,
            None => self.entries.push((asset, pct)),
        }
    }

    pub fn add(&mut self, asset: Asset, delta: f64) {
        let current = self.get(asset);
        self.set(asset, current + delta);
    }

    pub fn contains(&self, asset: Asset) -> bool {
        self.get(asset) > 0.0
    }

    pub fn iter(&self) -> impl Iterator<Item = (Asset, f64)> + '_ {
        self.entries.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v).sum()
    }

    /// Assets with a strictly positive weight, in sequence order.
    pub fn held(&self) -> Vec<Asset> {
        self.entries
            .iter()
            .filter(|(_, v)| *v > 0.0)
            .map(|(a, _)| *a)
            .collect()
    }

    /// The "no allocation" state: nothing has weight.
    pub fn is_zero(&self) -> bool {
        self.entries.iter().all(|(_, v)| *v <= 0.0)
    }

    /// Drop zero-valued entries, keeping order.
    pub fn without_zeros(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .copied()
                .filter(|(_, v)| *v > 0.0)
                .collect(),
        }
    }

    pub fn clamp_non_negative(&mut self) {
        for entry in &mut self.entries {
            if entry.1 < 0.0 {
                entry.1 = 0.0;
            }
        }
    }

    /// Take `amount` points away from every held asset not in `exclude`, in
    /// proportion to its current weight. Results are clamped at zero only
    /// after the whole subtraction.
    pub fn draw_proportionally(&mut self, amount: f64, exclude: &[Asset]) {
        let donors: f64 = self
            .entries
            .iter()
            .filter(|(a, v)| *v > 0.0 && !exclude.contains(a))
            .map(|(_, v)| v)
            .sum();
        if donors <= 0.0 {
            return;
        }

        for entry in &mut self.entries {
            if entry.1 > 0.0 && !exclude.contains(&entry.0) {
                entry.1 -= amount * entry.1 / donors;
            }
        }
        self.clamp_non_negative();
    }

    pub fn sums_to_100(&self) -> bool {
        (self.total() - 100.0).abs() <= SUM_TOLERANCE
    }
}

impl Serialize for Allocation {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (asset, pct) in &self.entries {
            map.serialize_entry(asset.symbol(), pct)?;
        }
        map.end()
    }
}

/// Scale an allocation so it sums to exactly 100.
///
/// Every entry but the last is rounded to one decimal; the last entry takes
/// `100 - sum(prior)`. When the prior entries round up past 100 the last
/// entry is held at 0 and the overshoot is taken back, one tenth at a time,
/// from the entries that rounded up the most. An all-zero input is returned
/// unchanged.
pub fn normalize(weights: &Allocation) -> Allocation {
    let total = weights.total();
    if total == 0.0 || weights.is_empty() {
        return weights.clone();
    }

    let scale = 100.0 / total;
    let last = weights.len() - 1;

    // Work in tenths of a percent so the remainder is exact
    let exact: Vec<f64> = weights.iter().map(|(_, w)| w * scale * 10.0).collect();
    let mut tenths: Vec<i64> = exact[..last].iter().map(|x| x.round() as i64).collect();
    let mut remainder = 1000 - tenths.iter().sum::<i64>();

    while remainder < 0 {
        let overshoot = tenths
            .iter()
            .zip(&exact)
            .enumerate()
            .filter(|(_, (t, _))| **t > 0)
            .map(|(i, (t, x))| (i, *t as f64 - x))
            .fold(None, |best: Option<(usize, f64)>, (i, d)| match best {
                Some((_, bd)) if bd > d => best,
                _ => Some((i, d)),
            });
        let Some((i, _)) = overshoot else { break };
        tenths[i] -= 1;
        remainder += 1;
    }
    tenths.push(remainder.max(0));

    let mut out = Allocation::new();
    for ((asset, _), t) in weights.iter().zip(tenths) {
        out.set(asset, t as f64 / 10.0);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_scales_to_100() {
        let a = Allocation::from_pairs(&[(Asset::Btc, 2.0), (Asset::Eth, 1.0), (Asset::Sol, 1.0)]);
        let n = normalize(&a);
        assert_eq!(n.get(Asset::Btc), 50.0);
        assert_eq!(n.get(Asset::Eth), 25.0);
        assert_eq!(n.get(Asset::Sol), 25.0);
        assert!(n.sums_to_100());
    }

    #[test]
    fn test_normalize_last_key_takes_remainder() {
        // Thirds: 33.3 + 33.3, last gets 33.4
        let a = Allocation::from_pairs(&[(Asset::Btc, 1.0), (Asset::Eth, 1.0), (Asset::Sol, 1.0)]);
        let n = normalize(&a);
        assert_eq!(n.get(Asset::Btc), 33.3);
        assert_eq!(n.get(Asset::Eth), 33.3);
        assert_eq!(n.get(Asset::Sol), 33.4);

        // Reorder: the remainder moves with the last key
        let b = Allocation::from_pairs(&[(Asset::Sol, 1.0), (Asset::Eth, 1.0), (Asset::Btc, 1.0)]);
        let m = normalize(&b);
        assert_eq!(m.get(Asset::Btc), 33.4);
        assert_eq!(m.get(Asset::Sol), 33.3);
    }

    #[test]
    fn test_normalize_never_leaves_last_entry_negative() {
        // Six entries each round 16.666.. up to 16.7, overshooting 100 by 0.2
        let a = Allocation::from_pairs(&[
            (Asset::Btc, 1.0),
            (Asset::Eth, 1.0),
            (Asset::Bnb, 1.0),
            (Asset::Sol, 1.0),
            (Asset::Xrp, 1.0),
            (Asset::Pendle, 1.0),
            (Asset::Spx6900, 0.001),
        ]);
        let n = normalize(&a);
        assert!(n.iter().all(|(_, v)| v >= 0.0), "negative entry in {n:?}");
        assert_eq!(n.get(Asset::Spx6900), 0.0);
        assert!((n.total() - 100.0).abs() < 1e-9);
        let reduced = n.iter().filter(|(_, v)| (*v - 16.6).abs() < 1e-9).count();
        assert_eq!(reduced, 2);
    }

    #[test]
    fn test_normalize_tiny_tail_sweep() {
        for n_prior in 2..=6usize {
            for tail in [0.0001, 0.001, 0.01, 0.04] {
                let mut pairs: Vec<(Asset, f64)> =
                    Asset::ALL[..n_prior].iter().map(|a| (*a, 1.0)).collect();
                pairs.push((Asset::ALL[n_prior], tail));
                let out = normalize(&Allocation::from_pairs(&pairs));
                assert!(out.iter().all(|(_, v)| v >= 0.0), "{out:?}");
                assert!((out.total() - 100.0).abs() < 1e-9, "{out:?}");
            }
        }
    }

    #[test]
    fn test_normalize_zero_total_unchanged() {
        let a = Allocation::from_pairs(&[(Asset::Btc, 0.0), (Asset::Eth, 0.0)]);
        let n = normalize(&a);
        assert_eq!(n, a);
        assert!(n.is_zero());
    }

    #[test]
    fn test_normalize_keeps_order() {
        let a = Allocation::from_pairs(&[(Asset::Xrp, 10.0), (Asset::Btc, 30.0)]);
        let keys: Vec<Asset> = normalize(&a).iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Asset::Xrp, Asset::Btc]);
    }

    #[test]
    fn test_draw_proportionally() {
        let mut a = Allocation::from_pairs(&[(Asset::Btc, 60.0), (Asset::Eth, 20.0), (Asset::Sol, 20.0)]);
        a.draw_proportionally(10.0, &[Asset::Btc]);
        assert_eq!(a.get(Asset::Btc), 60.0);
        assert!((a.get(Asset::Eth) - 15.0).abs() < 1e-9);
        assert!((a.get(Asset::Sol) - 15.0).abs() < 1e-9);
    }

    #[test]
    fn test_draw_more_than_available_clamps() {
        let mut a = Allocation::from_pairs(&[(Asset::Btc, 90.0), (Asset::Sol, 4.0)]);
        a.draw_proportionally(10.0, &[Asset::Btc]);
        assert_eq!(a.get(Asset::Sol), 0.0);
    }

    #[test]
    fn test_set_appends_new_asset() {
        let mut a = Allocation::from_pairs(&[(Asset::Eth, 50.0)]);
        a.add(Asset::Btc, 5.0);
        let keys: Vec<Asset> = a.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec![Asset::Eth, Asset::Btc]);
        assert_eq!(a.get(Asset::Btc), 5.0);
        assert_eq!(a.get(Asset::Xrp), 0.0);
    }

    #[test]
    fn test_serializes_as_ordered_object() {
        let a = Allocation::from_pairs(&[(Asset::Sol, 60.0), (Asset::Btc, 40.0)]);
        let json = serde_json::to_string(&a).unwrap();
        assert_eq!(json, r#"{"SOL":60.0,"BTC":40.0}"#);
    }
}
