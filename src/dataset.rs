//! Audit dataset loading.
//!
//! The dataset is a tabular snapshot with columns `ResourceGroupId, Feature,
//! CategoryName, VerificationResult, ControlStringId`. The engine consumes
//! the first, second, and fourth; the rest are carried so a malformed export
//! is caught at load instead of surfacing as a half-built table. A row that
//! fails to deserialize aborts the build — no stale tables are published.

use crate::error::{Result, RiskError};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::info;

/// One audit check outcome for one feature of one resource group.
#[derive(Debug, Clone, Deserialize)]
pub struct AuditRecord {
    #[serde(rename = "ResourceGroupId")]
    pub resource_group_id: String,

    #[serde(rename = "Feature")]
    pub feature: String,

    #[serde(rename = "CategoryName")]
    pub category_name: String,

    #[serde(rename = "VerificationResult")]
    pub verification_result: String,

    #[serde(rename = "ControlStringId")]
    pub control_string_id: String,
}

impl AuditRecord {
    /// `"Passed"` is a pass; any other value counts as a failure.
    pub fn passed(&self) -> bool {
        self.verification_result == "Passed"
    }
}

/// Read the full audit snapshot from a CSV file.
pub fn read_audit_csv<P: AsRef<Path>>(path: P) -> Result<Vec<AuditRecord>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let records = read_audit_records(file)?;
    info!("loaded {} audit records from {}", records.len(), path.display());
    Ok(records)
}

/// Read audit records from any CSV source.
///
/// Rows missing required columns, short rows, and non-UTF-8 content are
/// `MalformedInput` carrying the 1-based record number. So are rows with an
/// empty `ResourceGroupId` or `Feature`, which could not be attributed to
/// any resource group.
pub fn read_audit_records<R: Read>(reader: R) -> Result<Vec<AuditRecord>> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut records = Vec::new();
    for (index, row) in csv_reader.deserialize::<AuditRecord>().enumerate() {
        let record_number = index as u64 + 1;
        let record =
            row.map_err(|e| RiskError::malformed_input(record_number, e.to_string()))?;
        if record.resource_group_id.is_empty() {
            return Err(RiskError::malformed_input(record_number, "empty ResourceGroupId"));
        }
        if record.feature.is_empty() {
            return Err(RiskError::malformed_input(record_number, "empty Feature"));
        }
        records.push(record);
    }
    Ok(records)
}
