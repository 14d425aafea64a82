//! Query result types.
//!
//! The JSON member names are the wire contract consumed by external callers
//! and must stay exactly as written; the Rust field names follow crate
//! convention.

use crate::aggregate::Counters;
use crate::fingerprint::Fingerprint;
use serde::Serialize;

/// Reserved member of the recommendation surface. Always this value until
/// the ranking contract is assigned a meaning.
pub const RANKING_PLACEHOLDER: u32 = 0;

/// Failure-rate score for one exact feature set.
#[derive(Debug, Clone, Serialize)]
pub struct ScoreReport {
    pub features: Vec<String>,
    pub fingerprint: Fingerprint,
    pub counters: Counters,
    /// Percentage failure rate, `fails / totals * 100`.
    pub failure_percent: f64,
}

/// One ranked sibling feature group within a category combination.
#[derive(Debug, Clone, Serialize)]
pub struct RecommendedGroup {
    #[serde(rename = "Features")]
    pub features: Vec<String>,

    #[serde(rename = "TotalCount")]
    pub totals: u64,

    #[serde(rename = "FailCount")]
    pub fails: u64,

    #[serde(rename = "SuccessCount")]
    pub success: u64,

    /// Percentage failure rate used as the ranking key.
    #[serde(rename = "FailureRate")]
    pub failure_percent: f64,
}

/// Structured recommendation for a query feature set.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// Sibling feature groups under the query's category combination,
    /// ascending by failure rate.
    #[serde(rename = "RecommendedFeatureGroups")]
    pub recommended_feature_groups: Vec<RecommendedGroup>,

    #[serde(rename = "CurrentFeatureGroup")]
    pub current_feature_group: Vec<String>,

    /// Reserved; see [`RANKING_PLACEHOLDER`].
    #[serde(rename = "Ranking")]
    pub ranking: u32,

    #[serde(rename = "TotalSuccessCount")]
    pub total_success_count: u64,

    #[serde(rename = "TotalFailCount")]
    pub total_fail_count: u64,

    /// Percentage failure rate of the query's own feature group.
    #[serde(rename = "SecurityRating")]
    pub security_rating: f64,

    /// How many resource groups collapsed onto the query's feature set.
    #[serde(rename = "TotalOccurrences")]
    pub total_occurrences: u64,

    #[serde(rename = "CurrentCategoryGroup")]
    pub current_category_group: Vec<String>,
}

/// Table sizes of a built engine snapshot.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EngineStats {
    pub resource_groups: usize,
    pub feature_groups: usize,
    pub category_combinations: usize,
    pub recommendation_buckets: usize,
}
