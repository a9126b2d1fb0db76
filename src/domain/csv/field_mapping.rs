// ============================================================
// FIELD MAPPING TYPES
// ============================================================
// Target schema and synonym table for contact import auto-mapping

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Similarity floor below which a header is left unmapped.
pub const MAPPING_THRESHOLD: f64 = 0.6;

/// Contact columns an import file can populate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetField {
    Name,
    Email,
    Phone,
    Kind,
    Notes,
}

impl TargetField {
    pub const ALL: [TargetField; 5] = [
        TargetField::Name,
        TargetField::Email,
        TargetField::Phone,
        TargetField::Kind,
        TargetField::Notes,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TargetField::Name => "name",
            TargetField::Email => "email",
            TargetField::Phone => "phone",
            TargetField::Kind => "kind",
            TargetField::Notes => "notes",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "name" => Some(TargetField::Name),
            "email" => Some(TargetField::Email),
            "phone" => Some(TargetField::Phone),
            "kind" => Some(TargetField::Kind),
            "notes" => Some(TargetField::Notes),
            _ => None,
        }
    }

    pub fn is_required(&self) -> bool {
        matches!(self, TargetField::Name)
    }

    /// Known header spellings, already normalized. Checked before any
    /// similarity scoring.
    pub fn synonyms(&self) -> &'static [&'static str] {
        match self {
            TargetField::Name => &[
                "name",
                "full_name",
                "contact_name",
                "contact",
                "first_name",
                "nombre",
                "nom",
            ],
            TargetField::Email => &[
                "email",
                "e_mail",
                "email_address",
                "e_mail_address",
                "mail",
                "correo",
                "courriel",
            ],
            TargetField::Phone => &[
                "phone",
                "phone_number",
                "telephone",
                "tel",
                "mobile",
                "cell",
                "telefono",
            ],
            TargetField::Kind => &["kind", "type", "category", "role", "contact_type"],
            TargetField::Notes => &["notes", "note", "comments", "comment", "remarks"],
        }
    }
}

/// How each target field was matched (for the import preview).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    Synonym,
    Similarity,
    Manual,
}

/// One resolved column assignment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MappedColumn {
    /// Original header as it appears in the file.
    pub source_header: String,
    pub match_kind: MatchKind,
    /// Similarity score; 1.0 for synonym and manual matches.
    pub score: f64,
}

/// Resolved mapping from target fields to source columns.
///
/// A source column is assigned to at most one target field and vice
/// versa.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FieldMapping {
    pub columns: HashMap<TargetField, MappedColumn>,
    /// Headers present in the file that no target field claimed.
    pub unmapped_headers: Vec<String>,
}

impl FieldMapping {
    pub fn source_for(&self, field: TargetField) -> Option<&str> {
        self.columns.get(&field).map(|c| c.source_header.as_str())
    }

    pub fn is_mapped(&self, field: TargetField) -> bool {
        self.columns.contains_key(&field)
    }
}
