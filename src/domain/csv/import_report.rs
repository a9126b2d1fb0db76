// ============================================================
// IMPORT REPORT TYPES
// ============================================================

use serde::{Deserialize, Serialize};

use super::FieldMapping;

/// What happened to one data row during commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowOutcome {
    Inserted,
    Updated,
    Skipped,
}

/// A per-row validation failure. Row numbers are 1-based and count
/// the header, matching what the user sees in a spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RowError {
    pub row_number: usize,
    pub message: String,
}

/// Outcome of an import run (or of a dry-run analysis).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportReport {
    pub mapping: FieldMapping,
    pub total_rows: usize,
    pub inserted: usize,
    pub updated: usize,
    pub skipped: usize,
    pub errors: Vec<RowError>,
    /// Structural concerns that did not block the import.
    pub warnings: Vec<String>,
}

impl ImportReport {
    pub fn new(mapping: FieldMapping, total_rows: usize) -> Self {
        Self {
            mapping,
            total_rows,
            inserted: 0,
            updated: 0,
            skipped: 0,
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn record(&mut self, outcome: RowOutcome) {
        match outcome {
            RowOutcome::Inserted => self.inserted += 1,
            RowOutcome::Updated => self.updated += 1,
            RowOutcome::Skipped => self.skipped += 1,
        }
    }
}
