//! veristat - Risk scoring for resource-group feature combinations.
//!
//! This library ingests per-resource-group audit records (which features a
//! resource group uses and whether each verification check passed) and
//! answers two questions about a feature combination: how often it fails
//! verification, and which other feature combinations with the same category
//! profile fail less.
//!
//! The core is a category-combination hashing and aggregation engine: sets
//! of features and categories canonicalize to multiplicative fingerprints
//! modulo a fixed prime, each feature set expands into every choice of one
//! parent category per feature, and pass/fail counters accumulate per
//! category-combination fingerprint across the dataset.
//!
//! # Example
//!
//! ```no_run
//! use veristat::{Catalog, RiskEngine};
//!
//! let engine = RiskEngine::from_csv(Catalog::builtin(), "data.csv").unwrap();
//!
//! let score = engine.score(&["KeyVault".to_string()]).unwrap();
//! println!("failure rate: {score:.2}%");
//!
//! let recommendation = engine.recommend(&["KeyVault".to_string()], None).unwrap();
//! for group in &recommendation.recommended_feature_groups {
//!     println!("{}: {:.2}%", group.features.join(", "), group.failure_percent);
//! }
//! ```

mod aggregate;
mod catalog;
mod dataset;
mod engine;
mod error;
mod expand;
mod fingerprint;
mod output;
mod report;

pub mod cli;

// Re-export commonly used types at crate root.
pub use aggregate::{
    aggregate_resource_groups, Counters, FeatureGroup, FeatureGroupIndex, ResourceGroup,
};
pub use catalog::Catalog;
pub use dataset::{read_audit_csv, read_audit_records, AuditRecord};
pub use engine::{
    EngineOptions, RecommendationEntry, RiskEngine, RiskEngineBuilder, DEFAULT_MAX_COMBINATIONS,
};
pub use error::{Result, RiskError};
pub use expand::{CategoryChoice, Expander};
pub use fingerprint::{combine, Fingerprint, EMPTY_FINGERPRINT, FINGERPRINT_MODULUS};
pub use output::{
    format_json, format_recommendation_terminal, format_score_terminal, format_stats_terminal,
};
pub use report::{
    EngineStats, Recommendation, RecommendedGroup, ScoreReport, RANKING_PLACEHOLDER,
};
