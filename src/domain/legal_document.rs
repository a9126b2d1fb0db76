use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// A legal document (contract, permit, insurance certificate) with a
/// pointer to its current version. Versions are append-only; the
/// pointer always references a version belonging to this document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LegalDocument {
    pub id: i64,
    pub account_id: i64,
    pub property_id: Option<i64>,
    pub title: String,
    pub category: String,
    pub current_version_id: Option<i64>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentVersion {
    pub id: i64,
    pub document_id: i64,
    pub version_no: i64,
    pub file_name: String,
    pub storage_key: String,
    pub checksum: String,
    pub size_bytes: i64,
    pub uploaded_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LegalDocumentInput {
    pub property_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 80))]
    pub category: String,
}

/// Version upload payload; file bytes arrive base64-encoded.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct VersionUpload {
    #[validate(length(min = 1, max = 200))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub content_base64: String,
}
