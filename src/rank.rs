// 🏆 Grouping & ranking
// Sum a metric per group key, then rank groups with a stable descending sort.
// Groups keep first-seen order, so ties stay in the order their first row
// appeared in the input.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::AddAssign;

/// Label for a join that could not be resolved
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Label for revenue with no assigned sales representative
pub const UNASSIGNED_LABEL: &str = "Unassigned";

// ============================================================================
// METRIC
// ============================================================================

/// A summable, orderable aggregate value (revenue or unit count)
pub trait Metric: Copy + Default + PartialOrd + AddAssign {
    fn as_f64(self) -> f64;
}

impl Metric for f64 {
    fn as_f64(self) -> f64 {
        self
    }
}

impl Metric for i64 {
    fn as_f64(self) -> f64 {
        self as f64
    }
}

// ============================================================================
// OUTPUT TYPES
// ============================================================================

/// One (label, value) point handed to a report sink
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabeledValue {
    pub label: String,
    pub value: f64,
}

impl LabeledValue {
    pub fn new(label: impl Into<String>, value: f64) -> Self {
        LabeledValue {
            label: label.into(),
            value,
        }
    }
}

/// A ranked group: its key, display label and summed metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedBucket<K, V> {
    pub key: K,
    pub label: String,
    pub total: V,
}

impl<K, V: Metric> RankedBucket<K, V> {
    pub fn to_labeled(&self) -> LabeledValue {
        LabeledValue::new(self.label.clone(), self.total.as_f64())
    }
}

/// Convert ranked buckets into the plain series a sink consumes
pub fn labeled_series<K, V: Metric>(buckets: &[RankedBucket<K, V>]) -> Vec<LabeledValue> {
    buckets.iter().map(RankedBucket::to_labeled).collect()
}

/// Sum of all bucket totals
pub fn bucket_sum<K, V: Metric>(buckets: &[RankedBucket<K, V>]) -> V {
    let mut sum = V::default();
    for bucket in buckets {
        sum += bucket.total;
    }
    sum
}

// ============================================================================
// GROUP TOTALS
// ============================================================================

/// Accumulates per-key sums in first-seen key order
pub struct GroupTotals<K, V> {
    positions: HashMap<K, usize>,
    groups: Vec<RankedBucket<K, V>>,
}

impl<K: Eq + Hash + Clone, V: Metric> GroupTotals<K, V> {
    pub fn new() -> Self {
        GroupTotals {
            positions: HashMap::new(),
            groups: Vec::new(),
        }
    }

    /// Add `amount` to the group for `key`
    ///
    /// `label` is only evaluated the first time a key is seen.
    pub fn add(&mut self, key: K, amount: V, label: impl FnOnce() -> String) {
        match self.positions.get(&key) {
            Some(&pos) => self.groups[pos].total += amount,
            None => {
                self.positions.insert(key.clone(), self.groups.len());
                self.groups.push(RankedBucket {
                    key,
                    label: label(),
                    total: amount,
                });
            }
        }
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups sorted descending by total; equal totals keep first-seen order
    pub fn into_ranked(self) -> Vec<RankedBucket<K, V>> {
        let mut groups = self.groups;
        // slice::sort_by is stable; total_cmp keeps the order total even for NaN
        groups.sort_by(|a, b| b.total.as_f64().total_cmp(&a.total.as_f64()));
        groups
    }

    /// The first `n` ranked groups (all of them when fewer exist)
    pub fn top(self, n: usize) -> Vec<RankedBucket<K, V>> {
        let mut ranked = self.into_ranked();
        ranked.truncate(n);
        ranked
    }
}

impl<K: Eq + Hash + Clone, V: Metric> Default for GroupTotals<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
