//! The category combination hashing and aggregation engine.
//!
//! A build is a single synchronous batch pass: aggregate the audit records
//! into resource groups, collapse those into feature-group aggregates, then
//! expand every feature group into its category combinations and fold the
//! results into the category aggregation table and the recommendation index.
//! The finished engine is an immutable snapshot; queries never mutate it, so
//! it can be shared read-only across concurrent callers. There is no
//! incremental update path — a fresh dataset means a fresh build.

use crate::aggregate::{aggregate_resource_groups, Counters, FeatureGroup, FeatureGroupIndex};
use crate::catalog::Catalog;
use crate::dataset::AuditRecord;
use crate::error::{Result, RiskError};
use crate::expand::Expander;
use crate::fingerprint::Fingerprint;
use crate::report::{
    EngineStats, Recommendation, RecommendedGroup, ScoreReport, RANKING_PLACEHOLDER,
};
use rustc_hash::FxHashMap;
use std::path::Path;
use tracing::{debug, info};

/// Default bound on the category combinations one feature set may expand
/// into. Parent lists in the shipped catalog are at most 4 long, so real
/// resource groups stay far below this.
pub const DEFAULT_MAX_COMBINATIONS: u64 = 65_536;

/// Build-time tuning knobs.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// Upper bound on `∏ |parents(f)|` per feature set.
    pub max_combinations: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self { max_combinations: DEFAULT_MAX_COMBINATIONS }
    }
}

impl EngineOptions {
    pub fn validate(&self) -> Result<()> {
        if self.max_combinations == 0 {
            return Err(RiskError::catalog("max_combinations must be greater than 0"));
        }
        Ok(())
    }
}

/// A feature group observed under some category combination, as stored in
/// the recommendation index. One entry is appended per expansion leaf, so a
/// feature set whose expansion reaches the same combination through several
/// leaves appears that many times.
#[derive(Debug, Clone)]
pub struct RecommendationEntry {
    pub features: Vec<String>,
    pub counters: Counters,
}

/// Builder for [`RiskEngine`] instances.
#[derive(Debug, Default)]
pub struct RiskEngineBuilder {
    catalog: Catalog,
    options: EngineOptions,
}

impl RiskEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn catalog(mut self, catalog: Catalog) -> Self {
        self.catalog = catalog;
        self
    }

    #[must_use]
    pub fn max_combinations(mut self, max_combinations: u64) -> Self {
        self.options.max_combinations = max_combinations;
        self
    }

    /// Set custom options (validates them).
    pub fn options(mut self, options: EngineOptions) -> Result<Self> {
        options.validate()?;
        self.options = options;
        Ok(self)
    }

    /// Run the full batch build over an audit snapshot.
    pub fn build(self, records: &[AuditRecord]) -> Result<RiskEngine> {
        self.options.validate()?;
        RiskEngine::build(self.catalog, self.options, records)
    }
}

/// Immutable risk-scoring snapshot over one audit dataset.
#[derive(Debug)]
pub struct RiskEngine {
    catalog: Catalog,
    options: EngineOptions,
    resource_group_count: usize,
    feature_groups: FeatureGroupIndex,
    category_table: FxHashMap<Fingerprint, Counters>,
    recommendation_index: FxHashMap<Fingerprint, Vec<RecommendationEntry>>,
}

impl RiskEngine {
    #[must_use]
    pub fn builder() -> RiskEngineBuilder {
        RiskEngineBuilder::new()
    }

    /// Build with the built-in catalog and default options.
    pub fn from_records(records: &[AuditRecord]) -> Result<Self> {
        Self::builder().build(records)
    }

    /// Load a CSV snapshot and build.
    pub fn from_csv<P: AsRef<Path>>(catalog: Catalog, path: P) -> Result<Self> {
        let records = crate::dataset::read_audit_csv(path)?;
        Self::builder().catalog(catalog).build(&records)
    }

    fn build(catalog: Catalog, options: EngineOptions, records: &[AuditRecord]) -> Result<Self> {
        let resource_groups = aggregate_resource_groups(records);
        let feature_groups = FeatureGroupIndex::build(&resource_groups, &catalog)?;

        let mut category_table: FxHashMap<Fingerprint, Counters> = FxHashMap::default();
        let mut recommendation_index: FxHashMap<Fingerprint, Vec<RecommendationEntry>> =
            FxHashMap::default();

        let expander = Expander::new(&catalog, options.max_combinations);
        for group in feature_groups.iter() {
            let leaves = expander.expand(&group.features)?;

            // Merge gate, scoped to this feature group's expansion: only the
            // first leaf may sum with a previously recorded combination. The
            // gate is set after that leaf whether or not a merge happened,
            // so every later leaf overwrites.
            let mut merged_once = false;
            for leaf in leaves {
                debug!("category combination: {}", leaf.categories.join(" -> "));

                let counters = match category_table.get(&leaf.fingerprint) {
                    Some(previous) if !merged_once => previous.merged(&group.counters),
                    _ => group.counters,
                };
                category_table.insert(leaf.fingerprint, counters);
                merged_once = true;

                let combo_fingerprint = catalog
                    .category_fingerprint(leaf.categories.iter().map(String::as_str))?;
                recommendation_index
                    .entry(combo_fingerprint)
                    .or_default()
                    .push(RecommendationEntry {
                        features: group.features.clone(),
                        counters: group.counters,
                    });
            }
        }

        info!(
            "engine built: {} resource groups, {} feature groups, {} category combinations",
            resource_groups.len(),
            feature_groups.len(),
            category_table.len()
        );

        Ok(Self {
            catalog,
            options,
            resource_group_count: resource_groups.len(),
            feature_groups,
            category_table,
            recommendation_index,
        })
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn options(&self) -> &EngineOptions {
        &self.options
    }

    /// Sort, dedup, and own a caller-supplied feature list.
    fn canonicalize(features: &[String]) -> Result<Vec<String>> {
        if features.is_empty() {
            return Err(RiskError::EmptyFeatureSet);
        }
        let mut canonical = features.to_vec();
        canonical.sort();
        canonical.dedup();
        Ok(canonical)
    }

    fn feature_group(&self, features: &[String]) -> Result<&FeatureGroup> {
        let fingerprint = self
            .catalog
            .feature_fingerprint(features.iter().map(String::as_str))?;
        self.feature_groups
            .get(fingerprint)
            .ok_or(RiskError::UnknownFeatureSet { fingerprint })
    }

    /// Percentage failure rate for the exact feature set.
    pub fn score(&self, features: &[String]) -> Result<f64> {
        Ok(self.score_report(features)?.failure_percent)
    }

    /// Score with the underlying aggregate attached.
    pub fn score_report(&self, features: &[String]) -> Result<ScoreReport> {
        let features = Self::canonicalize(features)?;
        let group = self.feature_group(&features)?;
        Ok(ScoreReport {
            features,
            fingerprint: group.fingerprint,
            counters: group.counters,
            failure_percent: group.counters.fail_rate()? * 100.0,
        })
    }

    /// Cumulative counters for a category-combination fingerprint.
    pub fn category_counters(&self, fingerprint: Fingerprint) -> Result<Counters> {
        self.category_table
            .get(&fingerprint)
            .copied()
            .ok_or(RiskError::UnknownCombination { fingerprint })
    }

    /// Feature groups observed under a category combination, ascending by
    /// failure rate. Stable: equal rates keep registration order. An entry
    /// with zero totals has no defined rate and is dropped from the ranking.
    pub fn rank(&self, fingerprint: Fingerprint) -> Result<Vec<&RecommendationEntry>> {
        let entries = self
            .recommendation_index
            .get(&fingerprint)
            .ok_or(RiskError::UnknownCombination { fingerprint })?;

        let mut ranked: Vec<&RecommendationEntry> = entries
            .iter()
            .filter(|entry| entry.counters.totals > 0)
            .collect();
        ranked.sort_by(|a, b| {
            let rate_a = a.counters.fails as f64 / a.counters.totals as f64;
            let rate_b = b.counters.fails as f64 / b.counters.totals as f64;
            rate_a.total_cmp(&rate_b)
        });
        Ok(ranked)
    }

    /// Rank sibling feature groups sharing the query's category profile.
    ///
    /// The category profile defaults to each feature's first-listed parent;
    /// `categories` overrides it when the caller supplies one.
    pub fn recommend(
        &self,
        features: &[String],
        categories: Option<&[String]>,
    ) -> Result<Recommendation> {
        let features = Self::canonicalize(features)?;
        let group = self.feature_group(&features)?;

        let category_group: Vec<String> = match categories {
            Some(explicit) if !explicit.is_empty() => {
                for category in explicit {
                    self.catalog.category_weight(category)?;
                }
                explicit.to_vec()
            }
            _ => features
                .iter()
                .map(|feature| self.catalog.primary_parent(feature).map(str::to_string))
                .collect::<Result<_>>()?,
        };

        let combo_fingerprint = self
            .catalog
            .category_fingerprint(category_group.iter().map(String::as_str))?;
        let ranked = self.rank(combo_fingerprint)?;

        Ok(Recommendation {
            recommended_feature_groups: ranked
                .into_iter()
                .map(|entry| RecommendedGroup {
                    features: entry.features.clone(),
                    totals: entry.counters.totals,
                    fails: entry.counters.fails,
                    success: entry.counters.success,
                    failure_percent: entry.counters.fails as f64 / entry.counters.totals as f64
                        * 100.0,
                })
                .collect(),
            current_feature_group: features,
            ranking: RANKING_PLACEHOLDER,
            total_success_count: group.counters.success,
            total_fail_count: group.counters.fails,
            security_rating: group.counters.fail_rate()? * 100.0,
            total_occurrences: group.occurrences,
            current_category_group: category_group,
        })
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            resource_groups: self.resource_group_count,
            feature_groups: self.feature_groups.len(),
            category_combinations: self.category_table.len(),
            recommendation_buckets: self.recommendation_index.len(),
        }
    }
}
