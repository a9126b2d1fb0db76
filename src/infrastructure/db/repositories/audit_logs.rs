use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::audit::{AuditEntry, AuditFilter, AuditRecord};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};

#[derive(Clone)]
pub struct AuditLogRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct AuditEntity {
    id: i64,
    account_id: i64,
    actor_id: i64,
    actor_email: String,
    entity_type: String,
    entity_id: i64,
    action: String,
    details_json: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<AuditEntity> for AuditRecord {
    fn from(e: AuditEntity) -> Self {
        Self {
            id: e.id,
            account_id: e.account_id,
            actor_id: e.actor_id,
            actor_email: e.actor_email,
            entity_type: e.entity_type,
            entity_id: e.entity_id,
            action: e.action,
            details_json: e.details_json,
            created_at: e.created_at,
        }
    }
}

impl AuditLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn insert(&self, entry: &AuditEntry) -> Result<()> {
        sqlx::query(
            "INSERT INTO audit_logs
                (account_id, actor_id, actor_email, entity_type, entity_id, action, details_json)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(entry.account_id)
        .bind(entry.actor_id)
        .bind(&entry.actor_email)
        .bind(&entry.entity_type)
        .bind(entry.entity_id)
        .bind(&entry.action)
        .bind(&entry.details_json)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert audit log: {}", e)))?;
        Ok(())
    }

    pub async fn list(
        &self,
        account_id: i64,
        filter: &AuditFilter,
        page: &PageRequest,
    ) -> Result<Page<AuditRecord>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM audit_logs
             WHERE account_id = ?1 AND (?2 IS NULL OR entity_type = ?2)
               AND (?3 IS NULL OR actor_id = ?3)",
        )
        .bind(account_id)
        .bind(&filter.entity_type)
        .bind(filter.actor_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to count audit logs: {}", e)))?;

        let entities = sqlx::query_as::<_, AuditEntity>(
            "SELECT * FROM audit_logs
             WHERE account_id = ?1 AND (?2 IS NULL OR entity_type = ?2)
               AND (?3 IS NULL OR actor_id = ?3)
             ORDER BY created_at DESC, id DESC LIMIT ?4 OFFSET ?5",
        )
        .bind(account_id)
        .bind(&filter.entity_type)
        .bind(filter.actor_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list audit logs: {}", e)))?;

        Ok(Page::new(
            entities.into_iter().map(|e| e.into()).collect(),
            page,
            total,
        ))
    }

    /// Maintenance: drop entries older than `days_old` days.
    pub async fn clear_old_logs(&self, account_id: i64, days_old: i32) -> Result<u64> {
        let result = sqlx::query(
            "DELETE FROM audit_logs
             WHERE account_id = ? AND created_at < datetime('now', '-' || ? || ' days')",
        )
        .bind(account_id)
        .bind(days_old)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to clear old logs: {}", e)))?;

        Ok(result.rows_affected())
    }
}
