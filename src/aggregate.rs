//! Resource-group aggregation.
//!
//! First pass over the audit snapshot: fold records into one (feature set,
//! counters) pair per resource group, then collapse resource groups with the
//! same feature-set fingerprint into feature-group aggregates. Both passes
//! preserve first-seen order so a rebuild over the same snapshot produces
//! byte-identical tables.

use crate::catalog::Catalog;
use crate::dataset::AuditRecord;
use crate::error::Result;
use crate::fingerprint::Fingerprint;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, warn};

/// Pass/fail/total verification counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Counters {
    pub totals: u64,
    pub fails: u64,
    pub success: u64,
}

impl Counters {
    /// Fold one verification outcome in. `totals == fails + success` holds
    /// after every call.
    pub fn record(&mut self, passed: bool) {
        self.totals += 1;
        if passed {
            self.success += 1;
        } else {
            self.fails += 1;
        }
    }

    /// Element-wise sum.
    pub fn merged(&self, other: &Counters) -> Counters {
        Counters {
            totals: self.totals + other.totals,
            fails: self.fails + other.fails,
            success: self.success + other.success,
        }
    }

    /// Failure rate as a fraction in `[0, 1]`.
    pub fn fail_rate(&self) -> Result<f64> {
        if self.totals == 0 {
            return Err(crate::error::RiskError::DivisionUndefined);
        }
        Ok(self.fails as f64 / self.totals as f64)
    }
}

/// One resource group's observed feature set and counters.
#[derive(Debug, Clone)]
pub struct ResourceGroup {
    pub id: String,
    pub features: BTreeSet<String>,
    pub counters: Counters,
}

/// Group audit records by resource-group id.
///
/// Each record adds its feature to the group's set and its outcome to the
/// group's counters. Output order is first appearance in the record stream.
/// O(rows).
pub fn aggregate_resource_groups(records: &[AuditRecord]) -> Vec<ResourceGroup> {
    let mut groups: Vec<ResourceGroup> = Vec::new();
    let mut index: FxHashMap<&str, usize> = FxHashMap::default();

    for record in records {
        let slot = *index.entry(&record.resource_group_id).or_insert_with(|| {
            groups.push(ResourceGroup {
                id: record.resource_group_id.clone(),
                features: BTreeSet::new(),
                counters: Counters::default(),
            });
            groups.len() - 1
        });
        groups[slot].features.insert(record.feature.clone());
        groups[slot].counters.record(record.passed());
    }

    debug!("aggregated {} records into {} resource groups", records.len(), groups.len());
    groups
}

/// A set of features observed together, collapsed across resource groups.
#[derive(Debug, Clone, Serialize)]
pub struct FeatureGroup {
    /// Member features in sorted order.
    pub features: Vec<String>,
    pub fingerprint: Fingerprint,
    /// Counters of the first resource group observed with this fingerprint.
    pub counters: Counters,
    /// How many resource groups collapsed onto this fingerprint.
    pub occurrences: u64,
}

/// Feature-group aggregates keyed by feature-set fingerprint, in first-seen
/// order.
#[derive(Debug, Default)]
pub struct FeatureGroupIndex {
    groups: Vec<FeatureGroup>,
    by_fingerprint: FxHashMap<Fingerprint, usize>,
}

impl FeatureGroupIndex {
    /// Collapse resource groups into feature-group aggregates.
    ///
    /// The first resource group seen with a fingerprint supplies the stored
    /// feature set and counters; every further group only bumps the
    /// occurrence count. A fingerprint reached by two *different* feature
    /// sets is a hash collision — logged, not rejected.
    pub fn build(resource_groups: &[ResourceGroup], catalog: &Catalog) -> Result<Self> {
        let mut index = Self::default();
        for group in resource_groups {
            let fingerprint =
                catalog.feature_fingerprint(group.features.iter().map(String::as_str))?;
            match index.by_fingerprint.get(&fingerprint) {
                Some(&slot) => {
                    let existing = &mut index.groups[slot];
                    if !existing.features.iter().eq(group.features.iter()) {
                        warn!(
                            "fingerprint collision: {:?} and {:?} both hash to {}",
                            existing.features, group.features, fingerprint
                        );
                    }
                    existing.occurrences += 1;
                }
                None => {
                    index.by_fingerprint.insert(fingerprint, index.groups.len());
                    index.groups.push(FeatureGroup {
                        features: group.features.iter().cloned().collect(),
                        fingerprint,
                        counters: group.counters,
                        occurrences: 1,
                    });
                }
            }
        }
        Ok(index)
    }

    pub fn get(&self, fingerprint: Fingerprint) -> Option<&FeatureGroup> {
        self.by_fingerprint
            .get(&fingerprint)
            .map(|&slot| &self.groups[slot])
    }

    /// Feature groups in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = &FeatureGroup> {
        self.groups.iter()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}
