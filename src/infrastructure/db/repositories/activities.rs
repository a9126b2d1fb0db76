use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::activity::{ActivityProvider, ActivityProviderInput};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};

#[derive(Clone)]
pub struct ActivityRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ActivityEntity {
    id: i64,
    account_id: i64,
    destination_id: i64,
    name: String,
    category: String,
    email: Option<String>,
    phone: Option<String>,
    website: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<ActivityEntity> for ActivityProvider {
    fn from(e: ActivityEntity) -> Self {
        Self {
            id: e.id,
            account_id: e.account_id,
            destination_id: e.destination_id,
            name: e.name,
            category: e.category,
            email: e.email,
            phone: e.phone,
            website: e.website,
            created_at: e.created_at,
        }
    }
}

impl ActivityRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        account_id: i64,
        input: &ActivityProviderInput,
    ) -> Result<ActivityProvider> {
        let entity = sqlx::query_as::<_, ActivityEntity>(
            "INSERT INTO activity_providers
                (account_id, destination_id, name, category, email, phone, website)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(account_id)
        .bind(input.destination_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.website)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to create activity provider: {}", e))
        })?;

        Ok(entity.into())
    }

    pub async fn get(&self, account_id: i64, id: i64) -> Result<ActivityProvider> {
        let entity = sqlx::query_as::<_, ActivityEntity>(
            "SELECT * FROM activity_providers WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to fetch activity provider: {}", e))
        })?;

        match entity {
            Some(entity) => Ok(entity.into()),
            None => Err(AppError::NotFound(format!(
                "Activity provider not found: {}",
                id
            ))),
        }
    }

    pub async fn list(
        &self,
        account_id: i64,
        destination_id: Option<i64>,
        page: &PageRequest,
    ) -> Result<Page<ActivityProvider>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM activity_providers
             WHERE account_id = ?1 AND (?2 IS NULL OR destination_id = ?2)",
        )
        .bind(account_id)
        .bind(destination_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to count activity providers: {}", e))
        })?;

        let entities = sqlx::query_as::<_, ActivityEntity>(
            "SELECT * FROM activity_providers
             WHERE account_id = ?1 AND (?2 IS NULL OR destination_id = ?2)
             ORDER BY name LIMIT ?3 OFFSET ?4",
        )
        .bind(account_id)
        .bind(destination_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to list activity providers: {}", e))
        })?;

        Ok(Page::new(
            entities.into_iter().map(|e| e.into()).collect(),
            page,
            total,
        ))
    }

    pub async fn update(
        &self,
        account_id: i64,
        id: i64,
        input: &ActivityProviderInput,
    ) -> Result<ActivityProvider> {
        let entity = sqlx::query_as::<_, ActivityEntity>(
            "UPDATE activity_providers SET
                destination_id = ?, name = ?, category = ?, email = ?, phone = ?, website = ?
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(input.destination_id)
        .bind(&input.name)
        .bind(&input.category)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(&input.website)
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to update activity provider: {}", e))
        })?;

        match entity {
            Some(entity) => Ok(entity.into()),
            None => Err(AppError::NotFound(format!(
                "Activity provider not found: {}",
                id
            ))),
        }
    }

    pub async fn delete(&self, account_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM activity_providers WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to delete activity provider: {}", e))
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Activity provider not found: {}",
                id
            )));
        }
        Ok(())
    }
}
