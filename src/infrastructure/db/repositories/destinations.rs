use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::destination::{Destination, DestinationInput};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::property::slugify;

#[derive(Clone)]
pub struct DestinationRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct DestinationEntity {
    id: i64,
    account_id: i64,
    name: String,
    slug: String,
    country: String,
    region: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<DestinationEntity> for Destination {
    fn from(e: DestinationEntity) -> Self {
        Self {
            id: e.id,
            account_id: e.account_id,
            name: e.name,
            slug: e.slug,
            country: e.country,
            region: e.region,
            created_at: e.created_at,
        }
    }
}

impl DestinationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, account_id: i64, input: &DestinationInput) -> Result<Destination> {
        let entity = sqlx::query_as::<_, DestinationEntity>(
            "INSERT INTO destinations (account_id, name, slug, country, region)
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(account_id)
        .bind(&input.name)
        .bind(slugify(&input.name))
        .bind(&input.country)
        .bind(&input.region)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Destination '{}' already exists", input.name))
            }
            e => AppError::DatabaseError(format!("Failed to create destination: {}", e)),
        })?;

        Ok(entity.into())
    }

    pub async fn get(&self, account_id: i64, id: i64) -> Result<Destination> {
        let entity = sqlx::query_as::<_, DestinationEntity>(
            "SELECT * FROM destinations WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch destination: {}", e)))?;

        match entity {
            Some(entity) => Ok(entity.into()),
            None => Err(AppError::NotFound(format!("Destination not found: {}", id))),
        }
    }

    pub async fn list(&self, account_id: i64, page: &PageRequest) -> Result<Page<Destination>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM destinations WHERE account_id = ?")
                .bind(account_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to count destinations: {}", e))
                })?;

        let entities = sqlx::query_as::<_, DestinationEntity>(
            "SELECT * FROM destinations WHERE account_id = ?
             ORDER BY name LIMIT ? OFFSET ?",
        )
        .bind(account_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list destinations: {}", e)))?;

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
        input: &DestinationInput,
    ) -> Result<Destination> {
        let entity = sqlx::query_as::<_, DestinationEntity>(
            "UPDATE destinations SET name = ?, slug = ?, country = ?, region = ?
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(&input.name)
        .bind(slugify(&input.name))
        .bind(&input.country)
        .bind(&input.region)
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update destination: {}", e)))?;

        match entity {
            Some(entity) => Ok(entity.into()),
            None => Err(AppError::NotFound(format!("Destination not found: {}", id))),
        }
    }

    pub async fn delete(&self, account_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM destinations WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db) if db.is_foreign_key_violation() => {
                    AppError::Conflict("Destination still has properties attached".to_string())
                }
                e => AppError::DatabaseError(format!("Failed to delete destination: {}", e)),
            })?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Destination not found: {}", id)));
        }
        Ok(())
    }
}
