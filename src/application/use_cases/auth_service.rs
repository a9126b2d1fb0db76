//! Token authentication and user administration.

use std::sync::Arc;
use tracing::info;

use crate::domain::auth::{AuthContext, Role, User};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::security::tokens::{generate_token, hash_token};
use crate::infrastructure::db::repositories::UserRepository;

use super::permissions::{self, ops};

pub struct AuthService {
    users: Arc<UserRepository>,
    token_ttl_hours: i64,
}

/// A freshly issued token. The plaintext is returned exactly once.
#[derive(Debug, serde::Serialize)]
pub struct IssuedToken {
    pub token: String,
    pub user: User,
}

impl AuthService {
    pub fn new(users: Arc<UserRepository>, token_ttl_hours: i64) -> Self {
        Self {
            users,
            token_ttl_hours,
        }
    }

    /// Resolve a bearer token to a caller identity. Unknown, expired
    /// or deactivated tokens all resolve to the same Unauthorized
    /// error so callers cannot distinguish them.
    pub async fn authenticate(&self, bearer_token: &str) -> Result<AuthContext> {
        let user = self
            .users
            .find_user_by_token_hash(&hash_token(bearer_token))
            .await?
            .ok_or_else(|| AppError::Unauthorized("Invalid or expired token".to_string()))?;

        Ok(AuthContext::for_user(&user))
    }

    /// Bootstrap a new account with its first admin user and token.
    /// Not permission-gated: it is how the very first caller gets in.
    pub async fn bootstrap_account(
        &self,
        account_name: &str,
        admin_email: &str,
        admin_name: &str,
    ) -> Result<IssuedToken> {
        let account_id = self.users.create_account(account_name).await?;
        let user = self
            .users
            .create_user(account_id, admin_email, admin_name, Role::Admin)
            .await?;
        let token = self.issue_token(user.id).await?;

        info!(account_id, email = admin_email, "Bootstrapped new account");
        Ok(IssuedToken { token, user })
    }

    /// Create a user in the caller's account and issue their token.
    pub async fn create_user(
        &self,
        ctx: &AuthContext,
        email: &str,
        display_name: &str,
        role: Role,
    ) -> Result<IssuedToken> {
        permissions::require(ctx, ops::USERS_MANAGE)?;

        let user = self
            .users
            .create_user(ctx.account_id, email, display_name, role)
            .await?;
        let token = self.issue_token(user.id).await?;
        Ok(IssuedToken { token, user })
    }

    pub async fn list_users(&self, ctx: &AuthContext) -> Result<Vec<User>> {
        permissions::require(ctx, ops::USERS_MANAGE)?;
        self.users.list_users(ctx.account_id).await
    }

    pub async fn set_role(&self, ctx: &AuthContext, user_id: i64, role: Role) -> Result<User> {
        permissions::require(ctx, ops::USERS_MANAGE)?;
        self.users.set_role(ctx.account_id, user_id, role).await
    }

    /// Deactivate a user and revoke all their tokens.
    pub async fn deactivate_user(&self, ctx: &AuthContext, user_id: i64) -> Result<()> {
        permissions::require(ctx, ops::USERS_MANAGE)?;
        if user_id == ctx.user_id {
            return Err(AppError::ValidationError(
                "Cannot deactivate your own user".to_string(),
            ));
        }
        self.users.set_active(ctx.account_id, user_id, false).await?;
        self.users.revoke_tokens(user_id).await?;
        Ok(())
    }

    /// Rotate the caller's own token: revoke everything, issue fresh.
    pub async fn rotate_token(&self, ctx: &AuthContext) -> Result<String> {
        self.users.revoke_tokens(ctx.user_id).await?;
        self.issue_token(ctx.user_id).await
    }

    async fn issue_token(&self, user_id: i64) -> Result<String> {
        let token = generate_token();
        self.users
            .insert_token(user_id, &hash_token(&token), self.token_ttl_hours)
            .await?;
        Ok(token)
    }
}
