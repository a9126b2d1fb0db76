use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit entry as produced by a mutating action, before persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub account_id: i64,
    pub actor_id: i64,
    pub actor_email: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub details_json: Option<String>,
}

/// Audit entry as stored, with id and timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditRecord {
    pub id: i64,
    pub account_id: i64,
    pub actor_id: i64,
    pub actor_email: String,
    pub entity_type: String,
    pub entity_id: i64,
    pub action: String,
    pub details_json: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AuditFilter {
    pub entity_type: Option<String>,
    pub actor_id: Option<i64>,
}
