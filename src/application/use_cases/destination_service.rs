//! Destination management actions.

use std::sync::Arc;
use validator::Validate;

use crate::domain::destination::{Destination, DestinationInput};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::repositories::DestinationRepository;

use super::audit_service::AuditService;
use super::permissions::{self, ops};
use crate::domain::auth::AuthContext;

pub struct DestinationService {
    destinations: Arc<DestinationRepository>,
    audit: Arc<AuditService>,
}

impl DestinationService {
    pub fn new(destinations: Arc<DestinationRepository>, audit: Arc<AuditService>) -> Self {
        Self {
            destinations,
            audit,
        }
    }

    pub async fn create(&self, ctx: &AuthContext, input: DestinationInput) -> Result<Destination> {
        permissions::require(ctx, ops::DESTINATIONS_MANAGE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let destination = self.destinations.create(ctx.account_id, &input).await?;
        self.audit
            .record(
                ctx,
                "destination",
                destination.id,
                "create",
                Some(&serde_json::json!({ "name": destination.name })),
            )
            .await;
        Ok(destination)
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> Result<Destination> {
        permissions::require(ctx, ops::DESTINATIONS_VIEW)?;
        self.destinations.get(ctx.account_id, id).await
    }

    pub async fn list(&self, ctx: &AuthContext, page: &PageRequest) -> Result<Page<Destination>> {
        permissions::require(ctx, ops::DESTINATIONS_VIEW)?;
        self.destinations.list(ctx.account_id, page).await
    }

    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: i64,
        input: DestinationInput,
    ) -> Result<Destination> {
        permissions::require(ctx, ops::DESTINATIONS_MANAGE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let destination = self.destinations.update(ctx.account_id, id, &input).await?;
        self.audit
            .record(
                ctx,
                "destination",
                id,
                "update",
                Some(&serde_json::json!({ "name": destination.name })),
            )
            .await;
        Ok(destination)
    }

    /// Deleting a destination with properties still attached fails
    /// with a conflict; reassign them first.
    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        permissions::require(ctx, ops::DESTINATIONS_MANAGE)?;
        self.destinations.delete(ctx.account_id, id).await?;
        self.audit.record(ctx, "destination", id, "delete", None).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{AuditLogRepository, UserRepository};

    async fn setup() -> (DestinationService, AuthContext, AuthContext) {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let manager = users
            .create_user(account_id, "ana@acme.test", "Ana", Role::Manager)
            .await
            .unwrap();
        let viewer = users
            .create_user(account_id, "eva@acme.test", "Eva", Role::Viewer)
            .await
            .unwrap();

        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let service = DestinationService::new(Arc::new(DestinationRepository::new(pool)), audit);
        (
            service,
            AuthContext::for_user(&manager),
            AuthContext::for_user(&viewer),
        )
    }

    fn input(name: &str) -> DestinationInput {
        DestinationInput {
            name: name.to_string(),
            country: "Portugal".to_string(),
            region: Some("Algarve".to_string()),
        }
    }

    #[tokio::test]
    async fn test_create_requires_manage_permission() {
        let (service, manager, viewer) = setup().await;

        let created = service.create(&manager, input("Lagos")).await.unwrap();
        assert_eq!(created.slug, "lagos");

        let err = service.create(&viewer, input("Faro")).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        // Viewers can still read.
        let page = service.list(&viewer, &PageRequest::default()).await.unwrap();
        assert_eq!(page.total, 1);
    }

    #[tokio::test]
    async fn test_validation_rejects_empty_name() {
        let (service, manager, _) = setup().await;
        let err = service.create(&manager, input("")).await.unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
