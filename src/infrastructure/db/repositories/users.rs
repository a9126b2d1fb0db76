use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;

use crate::domain::auth::{Role, User};
use crate::domain::error::{AppError, Result};

#[derive(Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct UserEntity {
    id: i64,
    account_id: i64,
    email: String,
    display_name: String,
    role: String,
    active: bool,
    created_at: DateTime<Utc>,
}

impl UserEntity {
    fn into_domain(self) -> Result<User> {
        let role = Role::parse(&self.role).ok_or_else(|| {
            AppError::DatabaseError(format!("Unknown role '{}' for user {}", self.role, self.id))
        })?;
        Ok(User {
            id: self.id,
            account_id: self.account_id,
            email: self.email,
            display_name: self.display_name,
            role,
            active: self.active,
            created_at: self.created_at,
        })
    }
}

impl UserRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create_account(&self, name: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO accounts (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to create account: {}", e)))?;
        Ok(result.last_insert_rowid())
    }

    pub async fn create_user(
        &self,
        account_id: i64,
        email: &str,
        display_name: &str,
        role: Role,
    ) -> Result<User> {
        let entity = sqlx::query_as::<_, UserEntity>(
            "INSERT INTO users (account_id, email, display_name, role)
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(account_id)
        .bind(email)
        .bind(display_name)
        .bind(role.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create user: {}", e)))?;

        entity.into_domain()
    }

    pub async fn list_users(&self, account_id: i64) -> Result<Vec<User>> {
        let entities = sqlx::query_as::<_, UserEntity>(
            "SELECT * FROM users WHERE account_id = ? ORDER BY email",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list users: {}", e)))?;

        entities.into_iter().map(|e| e.into_domain()).collect()
    }

    pub async fn set_role(&self, account_id: i64, id: i64, role: Role) -> Result<User> {
        let entity = sqlx::query_as::<_, UserEntity>(
            "UPDATE users SET role = ? WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(role.as_str())
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update role: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("User not found: {}", id))),
        }
    }

    pub async fn set_active(&self, account_id: i64, id: i64, active: bool) -> Result<()> {
        let result = sqlx::query("UPDATE users SET active = ? WHERE account_id = ? AND id = ?")
            .bind(active)
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to update user: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("User not found: {}", id)));
        }
        Ok(())
    }

    /// Store a new API token hash for a user.
    pub async fn insert_token(
        &self,
        user_id: i64,
        token_hash: &str,
        ttl_hours: i64,
    ) -> Result<()> {
        let expires_at = Utc::now() + Duration::hours(ttl_hours);
        sqlx::query("INSERT INTO api_tokens (user_id, token_hash, expires_at) VALUES (?, ?, ?)")
            .bind(user_id)
            .bind(token_hash)
            .bind(expires_at)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to store token: {}", e)))?;
        Ok(())
    }

    /// Resolve an unexpired token hash to its active user.
    pub async fn find_user_by_token_hash(&self, token_hash: &str) -> Result<Option<User>> {
        let entity = sqlx::query_as::<_, UserEntity>(
            "SELECT u.id, u.account_id, u.email, u.display_name, u.role, u.active, u.created_at
             FROM api_tokens t
             JOIN users u ON u.id = t.user_id
             WHERE t.token_hash = ? AND t.expires_at > ? AND u.active = 1",
        )
        .bind(token_hash)
        .bind(Utc::now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to resolve token: {}", e)))?;

        entity.map(|e| e.into_domain()).transpose()
    }

    pub async fn revoke_tokens(&self, user_id: i64) -> Result<u64> {
        let result = sqlx::query("DELETE FROM api_tokens WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to revoke tokens: {}", e)))?;
        Ok(result.rows_affected())
    }
}
