use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::equipment::{
    EquipmentRequest, EquipmentRequestInput, EquipmentStatus, Urgency,
};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};

#[derive(Clone)]
pub struct EquipmentRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct EquipmentEntity {
    id: i64,
    account_id: i64,
    property_id: i64,
    item: String,
    quantity: i64,
    urgency: String,
    status: String,
    requested_by: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl EquipmentEntity {
    fn into_domain(self) -> Result<EquipmentRequest> {
        let urgency = Urgency::parse(&self.urgency).ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Unknown urgency '{}' for equipment request {}",
                self.urgency, self.id
            ))
        })?;
        let status = EquipmentStatus::parse(&self.status).ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Unknown status '{}' for equipment request {}",
                self.status, self.id
            ))
        })?;
        Ok(EquipmentRequest {
            id: self.id,
            account_id: self.account_id,
            property_id: self.property_id,
            item: self.item,
            quantity: self.quantity,
            urgency,
            status,
            requested_by: self.requested_by,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl EquipmentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        account_id: i64,
        requested_by: i64,
        input: &EquipmentRequestInput,
    ) -> Result<EquipmentRequest> {
        let entity = sqlx::query_as::<_, EquipmentEntity>(
            "INSERT INTO equipment_requests
                (account_id, property_id, item, quantity, urgency, status, requested_by)
             VALUES (?, ?, ?, ?, ?, 'open', ?) RETURNING *",
        )
        .bind(account_id)
        .bind(input.property_id)
        .bind(&input.item)
        .bind(input.quantity)
        .bind(input.urgency.as_str())
        .bind(requested_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to create equipment request: {}", e))
        })?;

        entity.into_domain()
    }

    pub async fn get(&self, account_id: i64, id: i64) -> Result<EquipmentRequest> {
        let entity = sqlx::query_as::<_, EquipmentEntity>(
            "SELECT * FROM equipment_requests WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to fetch equipment request: {}", e))
        })?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!(
                "Equipment request not found: {}",
                id
            ))),
        }
    }

    pub async fn list(
        &self,
        account_id: i64,
        property_id: Option<i64>,
        status: Option<EquipmentStatus>,
        page: &PageRequest,
    ) -> Result<Page<EquipmentRequest>> {
        let status = status.map(|s| s.as_str().to_string());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM equipment_requests
             WHERE account_id = ?1 AND (?2 IS NULL OR property_id = ?2)
               AND (?3 IS NULL OR status = ?3)",
        )
        .bind(account_id)
        .bind(property_id)
        .bind(&status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to count equipment requests: {}", e))
        })?;

        let entities = sqlx::query_as::<_, EquipmentEntity>(
            "SELECT * FROM equipment_requests
             WHERE account_id = ?1 AND (?2 IS NULL OR property_id = ?2)
               AND (?3 IS NULL OR status = ?3)
             ORDER BY created_at DESC LIMIT ?4 OFFSET ?5",
        )
        .bind(account_id)
        .bind(property_id)
        .bind(&status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to list equipment requests: {}", e))
        })?;

        let items = entities
            .into_iter()
            .map(|e| e.into_domain())
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }

    pub async fn update(
        &self,
        account_id: i64,
        id: i64,
        input: &EquipmentRequestInput,
    ) -> Result<EquipmentRequest> {
        let entity = sqlx::query_as::<_, EquipmentEntity>(
            "UPDATE equipment_requests
             SET property_id = ?, item = ?, quantity = ?, urgency = ?,
                 updated_at = CURRENT_TIMESTAMP
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(input.property_id)
        .bind(&input.item)
        .bind(input.quantity)
        .bind(input.urgency.as_str())
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to update equipment request: {}", e))
        })?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!(
                "Equipment request not found: {}",
                id
            ))),
        }
    }

    pub async fn set_status(
        &self,
        account_id: i64,
        id: i64,
        status: EquipmentStatus,
    ) -> Result<EquipmentRequest> {
        let entity = sqlx::query_as::<_, EquipmentEntity>(
            "UPDATE equipment_requests SET status = ?, updated_at = CURRENT_TIMESTAMP
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to update equipment request: {}", e))
        })?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!(
                "Equipment request not found: {}",
                id
            ))),
        }
    }

    pub async fn delete(&self, account_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM equipment_requests WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete equipment request: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Equipment request not found: {}",
                id
            )));
        }
        Ok(())
    }
}
