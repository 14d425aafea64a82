//! Feature, category, and parent-resolution catalogs.
//!
//! Catalogs are immutable after load. Every lookup the engine performs at
//! build or query time resolves against tables validated up front, so a bad
//! catalog fails loudly at load instead of deep inside an expansion.

use crate::error::{Result, RiskError};
use crate::fingerprint::{fingerprint_set, Fingerprint};
use rustc_hash::FxHashMap;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// YAML catalog file structure.
///
/// ```yaml
/// features:
///   KeyVault: 3125831
/// categories:
///   Security Infra: 1000099
/// parents:
///   KeyVault: [Security Infra]
/// ```
#[derive(Debug, Deserialize)]
struct CatalogFile {
    features: BTreeMap<String, u64>,
    categories: BTreeMap<String, u64>,
    parents: BTreeMap<String, Vec<String>>,
}

/// Immutable weight and parent-resolution tables.
///
/// Holds the three catalogs the engine consults: feature-name → weight,
/// category-name → weight, and feature-name → ordered candidate parent
/// categories. The parent list order matters only for primary-parent
/// selection in scoring; combination expansion treats it as a plain set of
/// choices.
#[derive(Debug, Clone)]
pub struct Catalog {
    feature_weights: FxHashMap<String, u64>,
    category_weights: FxHashMap<String, u64>,
    parent_map: FxHashMap<String, Vec<String>>,
}

impl Catalog {
    /// Built-in catalog covering the audited resource estate.
    pub fn builtin() -> Self {
        let feature_weights: FxHashMap<String, u64> = [
            ("SQLDatabase", 3_940_427),
            ("AppService", 3_940_763),
            ("StreamAnalytics", 1_414_297),
            ("KeyVault", 3_125_831),
            ("Storage", 5_392_313),
            ("Automation", 6_305_339),
            ("EventHub", 7_368_719),
            ("LogicApps", 7_368_629),
            ("TrafficManager", 7_368_787),
            ("VirtualNetwork", 2_523_893),
            ("DataLakeStore", 4_284_113),
            ("CosmosDB", 5_602_973),
            ("RedisCache", 5_603_713),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();

        let category_weights: FxHashMap<String, u64> = [
            ("Storage", 1_000_003),
            ("DataProcessing", 1_000_033),
            ("Reporting", 1_000_037),
            ("Web Front End", 1_000_039),
            ("APIs", 1_000_081),
            ("Security Infra", 1_000_099),
            ("SubscriptionCore", 1_000_117),
            ("Commuincation Hub", 1_000_121),
            ("Hybrid", 1_000_133),
            ("Network Isolation", 1_000_151),
            ("Cache", 1_000_159),
            ("Backend Processing", 123_123_593),
        ]
        .into_iter()
        .map(|(name, weight)| (name.to_string(), weight))
        .collect();

        let parent_map: FxHashMap<String, Vec<String>> = [
            ("AppService", vec!["Web Front End", "APIs"]),
            ("SQLDatabase", vec!["Storage", "DataProcessing", "Reporting"]),
            ("Storage", vec!["Storage", "Reporting", "DataProcessing"]),
            ("LogicApps", vec!["DataProcessing"]),
            ("DataFactory", vec!["DataProcessing"]),
            ("DataLakeAnalytics", vec!["DataProcessing", "Reporting"]),
            ("DataLakeStore", vec!["Storage", "Reporting", "DataProcessing"]),
            ("NotificationHub", vec!["Commuincation Hub"]),
            ("ServiceFabric", vec!["Web Front End", "APIs", "Backend Processing"]),
            ("Search", vec!["APIs", "Backend Processing"]),
            (
                "VirtualMachine",
                vec!["Web Front End", "APIs", "Backend Processing", "DataProcessing"],
            ),
            ("VirtualNetwork", vec!["Network Isolation", "Hybrid"]),
            ("AnalysisServices", vec!["DataProcessing", "Reporting"]),
            ("Batch", vec!["Backend Processing"]),
            ("RedisCache", vec!["Cache"]),
            ("EventHub", vec!["Commuincation Hub", "Hybrid"]),
            ("ODG", vec!["Hybrid"]),
            ("TrafficManager", vec!["Network Isolation"]),
            ("ERvNet", vec!["Hybrid", "Network Isolation"]),
            ("Automation", vec!["Backend Processing"]),
            ("CosmosDB", vec!["Storage", "DataProcessing", "Reporting"]),
            ("StreamAnalytics", vec!["DataProcessing", "Reporting"]),
            ("CloudService", vec!["Web Front End", "APIs", "Backend Processing"]),
            ("LoadBalancer", vec!["Network Isolation"]),
            ("APIConnection", vec!["DataProcessing"]),
            ("BotService", vec!["APIs", "Commuincation Hub", "Web Front End"]),
            (
                "ContainerInstances",
                vec!["Web Front End", "APIs", "DataProcessing", "Backend Processing"],
            ),
            ("DataFactoryV2", vec!["DataProcessing", "Backend Processing"]),
            ("KeyVault", vec!["Security Infra"]),
        ]
        .into_iter()
        .map(|(name, parents)| {
            (
                name.to_string(),
                parents.into_iter().map(str::to_string).collect(),
            )
        })
        .collect();

        let catalog = Self { feature_weights, category_weights, parent_map };
        catalog
            .validate()
            .expect("built-in catalog is internally consistent");
        catalog
    }

    /// Load and validate a catalog from a YAML file.
    pub fn from_yaml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        let file: CatalogFile = serde_yaml::from_str(&content)
            .map_err(|e| RiskError::catalog(format!("failed to parse catalog YAML: {e}")))?;

        let catalog = Self {
            feature_weights: file.features.into_iter().collect(),
            category_weights: file.categories.into_iter().collect(),
            parent_map: file.parents.into_iter().collect(),
        };
        catalog.validate()?;
        info!(
            "loaded catalog: {} features, {} categories, {} parent entries",
            catalog.feature_weights.len(),
            catalog.category_weights.len(),
            catalog.parent_map.len()
        );
        Ok(catalog)
    }

    /// Cross-check the three tables.
    ///
    /// Rules: weights are positive; parent lists are non-empty; every parent
    /// category carries a weight; every weighted feature has a parent list.
    /// The parent map may list features without weights — those only fail if
    /// input data actually references them.
    fn validate(&self) -> Result<()> {
        for (name, weight) in &self.feature_weights {
            if *weight == 0 {
                return Err(RiskError::catalog(format!("feature '{name}' has zero weight")));
            }
            if !self.parent_map.contains_key(name) {
                return Err(RiskError::catalog(format!("feature '{name}' has no parent categories")));
            }
        }
        for (name, weight) in &self.category_weights {
            if *weight == 0 {
                return Err(RiskError::catalog(format!("category '{name}' has zero weight")));
            }
        }
        for (feature, parents) in &self.parent_map {
            if parents.is_empty() {
                return Err(RiskError::catalog(format!(
                    "feature '{feature}' has an empty parent list"
                )));
            }
            for parent in parents {
                if !self.category_weights.contains_key(parent) {
                    return Err(RiskError::catalog(format!(
                        "parent category '{parent}' of feature '{feature}' has no weight"
                    )));
                }
            }
        }
        Ok(())
    }

    pub fn feature_weight(&self, name: &str) -> Result<u64> {
        self.feature_weights
            .get(name)
            .copied()
            .ok_or_else(|| RiskError::unknown_feature(name))
    }

    pub fn category_weight(&self, name: &str) -> Result<u64> {
        self.category_weights
            .get(name)
            .copied()
            .ok_or_else(|| RiskError::unknown_category(name))
    }

    /// Ordered candidate parent categories for a feature.
    pub fn parents(&self, feature: &str) -> Result<&[String]> {
        self.parent_map
            .get(feature)
            .map(Vec::as_slice)
            .ok_or_else(|| RiskError::unknown_feature(feature))
    }

    /// First-listed parent category, used as the default for scoring.
    pub fn primary_parent(&self, feature: &str) -> Result<&str> {
        // Validation guarantees parent lists are non-empty.
        Ok(&self.parents(feature)?[0])
    }

    /// Fingerprint of a feature-name set. The empty set is rejected: a
    /// resource group always carries at least one feature.
    pub fn feature_fingerprint<'a, I>(&self, features: I) -> Result<Fingerprint>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut iter = features.into_iter().peekable();
        if iter.peek().is_none() {
            return Err(RiskError::EmptyFeatureSet);
        }
        fingerprint_set(iter, |name| self.feature_weight(name))
    }

    /// Fingerprint of a category-name set.
    pub fn category_fingerprint<'a, I>(&self, categories: I) -> Result<Fingerprint>
    where
        I: IntoIterator<Item = &'a str>,
    {
        fingerprint_set(categories, |name| self.category_weight(name))
    }

    pub fn feature_count(&self) -> usize {
        self.feature_weights.len()
    }

    pub fn category_count(&self) -> usize {
        self.category_weights.len()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
