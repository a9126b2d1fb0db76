// ============================================================
// CSV IMPORT DOMAIN LAYER
// ============================================================
// Core types and value objects for the contact import pipeline
// No I/O, no async, no external dependencies

mod csv_row;
mod field_mapping;
mod import_report;

pub use csv_row::{normalize_header, CsvField, CsvRow};
pub use field_mapping::{FieldMapping, MappedColumn, MatchKind, TargetField, MAPPING_THRESHOLD};
pub use import_report::{ImportReport, RowError, RowOutcome};
