//! Audit trail for back-office actions.
//!
//! Every mutating action records who changed what entity and when,
//! with a redacted JSON detail blob. Audit writes are append-only and
//! best-effort: a failed write is logged but never fails the action
//! that triggered it.

use serde_json::Value;
use std::sync::Arc;
use tracing::{error, warn};

use crate::domain::audit::{AuditEntry, AuditFilter, AuditRecord};
use crate::domain::auth::AuthContext;
use crate::domain::error::Result;
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::repositories::AuditLogRepository;

use super::permissions::{self, ops};

pub struct AuditService {
    repository: Arc<AuditLogRepository>,
}

impl AuditService {
    pub fn new(repository: Arc<AuditLogRepository>) -> Self {
        Self { repository }
    }

    /// Record an action against an entity. Details are redacted
    /// before they hit the database.
    pub async fn record(
        &self,
        ctx: &AuthContext,
        entity_type: &str,
        entity_id: i64,
        action: &str,
        details: Option<&Value>,
    ) {
        let entry = AuditEntry {
            account_id: ctx.account_id,
            actor_id: ctx.user_id,
            actor_email: ctx.email.clone(),
            entity_type: entity_type.to_string(),
            entity_id,
            action: action.to_string(),
            details_json: details.map(|d| redact_details(d).to_string()),
        };

        if let Err(e) = self.repository.insert(&entry).await {
            error!(
                entity_type,
                entity_id,
                action,
                error = %e,
                "Failed to write audit log entry"
            );
        }
    }

    /// Tenant-scoped audit listing, newest first.
    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> Result<Page<AuditRecord>> {
        permissions::require(ctx, ops::AUDIT_VIEW)?;
        self.repository.list(ctx.account_id, filter, page).await
    }

    /// Maintenance: drop entries older than `days_old` days.
    pub async fn clear_old_logs(&self, ctx: &AuthContext, days_old: i32) -> Result<u64> {
        permissions::require(ctx, ops::USERS_MANAGE)?;
        let deleted = self
            .repository
            .clear_old_logs(ctx.account_id, days_old)
            .await?;
        warn!(deleted, days_old, "Cleared old audit logs");
        Ok(deleted)
    }
}

/// Walk a JSON detail blob and mask anything that looks secret.
fn redact_details(value: &Value) -> Value {
    match value {
        Value::String(s) => {
            if sensitive_value(s) {
                Value::String("[REDACTED]".to_string())
            } else {
                Value::String(s.clone())
            }
        }
        Value::Array(arr) => Value::Array(arr.iter().map(redact_details).collect()),
        Value::Object(obj) => {
            let mut redacted = serde_json::Map::new();
            for (key, val) in obj {
                if sensitive_key(key) {
                    redacted.insert(key.clone(), Value::String("[REDACTED]".to_string()));
                } else {
                    redacted.insert(key.clone(), redact_details(val));
                }
            }
            Value::Object(redacted)
        }
        _ => value.clone(),
    }
}

fn sensitive_key(key: &str) -> bool {
    const PATTERNS: &[&str] = &[
        "password", "passwd", "pwd", "token", "secret", "api_key",
        "private_key", "credential", "iban", "bank_account", "credit_card",
    ];
    let key = key.to_lowercase();
    PATTERNS.iter().any(|p| key.contains(p))
}

fn sensitive_value(s: &str) -> bool {
    // Card and account numbers come as long digit runs.
    (13..=24).contains(&s.len()) && s.chars().all(|c| c.is_numeric() || c == ' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::infrastructure::db::connection::init_test_db;

    fn ctx(account_id: i64, role: Role) -> AuthContext {
        AuthContext {
            user_id: 1,
            account_id,
            email: "ana@acme.test".to_string(),
            role,
        }
    }

    #[test]
    fn test_redact_sensitive_key() {
        let value = serde_json::json!({
            "name": "Villa Azul",
            "api_token": "secret123",
            "owner_iban": "PT50000201231234567890154"
        });

        let redacted = redact_details(&value);

        assert_eq!(redacted["name"], "Villa Azul");
        assert_eq!(redacted["api_token"], "[REDACTED]");
        assert_eq!(redacted["owner_iban"], "[REDACTED]");
    }

    #[test]
    fn test_redact_sensitive_value_pattern() {
        let value = serde_json::json!(["Villa Azul", "4111 1111 1111 1111"]);

        let redacted = redact_details(&value);

        assert_eq!(redacted[0], "Villa Azul");
        assert_eq!(redacted[1], "[REDACTED]");
    }

    #[tokio::test]
    async fn test_record_and_list() {
        let pool = init_test_db().await.unwrap();
        let account_id = sqlx::query("INSERT INTO accounts (name) VALUES ('Acme')")
            .execute(&pool)
            .await
            .unwrap()
            .last_insert_rowid();
        let service = AuditService::new(Arc::new(AuditLogRepository::new(pool)));

        let manager = ctx(account_id, Role::Manager);
        service
            .record(
                &manager,
                "property",
                42,
                "update",
                Some(&serde_json::json!({"status": "published"})),
            )
            .await;

        let page = service
            .list(&manager, &AuditFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].entity_type, "property");
        assert_eq!(page.items[0].action, "update");

        // Viewers may not read the trail.
        let err = service
            .list(
                &ctx(account_id, Role::Viewer),
                &AuditFilter::default(),
                &PageRequest::default(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, crate::domain::error::AppError::Unauthorized(_)));
    }
}
