use thiserror::Error;

/// Typed failures for engine builds and queries.
///
/// Every variant is a deterministic function of the input data; there is no
/// retry path. Build-time variants abort the build before any table is
/// published, query-time variants are reported to the caller and leave the
/// engine untouched.
#[derive(Debug, Error)]
pub enum RiskError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown feature: {name}")]
    UnknownFeature { name: String },

    #[error("unknown category: {name}")]
    UnknownCategory { name: String },

    #[error("feature set never observed in dataset (fingerprint {fingerprint})")]
    UnknownFeatureSet { fingerprint: u64 },

    #[error("category combination never observed in dataset (fingerprint {fingerprint})")]
    UnknownCombination { fingerprint: u64 },

    #[error("failure rate undefined: counters have zero totals")]
    DivisionUndefined,

    #[error("feature set is empty")]
    EmptyFeatureSet,

    #[error("malformed input at record {record}: {message}")]
    MalformedInput { record: u64, message: String },

    #[error("combination limit exceeded: feature set expands to {size} category combinations (limit {limit})")]
    CombinationLimitExceeded { size: u128, limit: u64 },

    #[error("catalog error: {message}")]
    Catalog { message: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RiskError>;

impl RiskError {
    pub fn unknown_feature<S: Into<String>>(name: S) -> Self {
        Self::UnknownFeature { name: name.into() }
    }

    pub fn unknown_category<S: Into<String>>(name: S) -> Self {
        Self::UnknownCategory { name: name.into() }
    }

    pub fn malformed_input<S: Into<String>>(record: u64, message: S) -> Self {
        Self::MalformedInput { record, message: message.into() }
    }

    pub fn catalog<S: Into<String>>(message: S) -> Self {
        Self::Catalog { message: message.into() }
    }

    /// Returns true if the error concerns a single query rather than the
    /// engine build; the snapshot stays valid and other queries may proceed.
    pub fn is_query_error(&self) -> bool {
        matches!(
            self,
            Self::UnknownFeature { .. }
                | Self::UnknownCategory { .. }
                | Self::UnknownFeatureSet { .. }
                | Self::UnknownCombination { .. }
                | Self::DivisionUndefined
                | Self::EmptyFeatureSet
        )
    }
}
