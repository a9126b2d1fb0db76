//! Activity provider directory actions.

use std::sync::Arc;
use validator::Validate;

use crate::domain::activity::{ActivityProvider, ActivityProviderInput};
use crate::domain::auth::AuthContext;
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::repositories::{ActivityRepository, DestinationRepository};

use super::audit_service::AuditService;
use super::permissions::{self, ops};

pub struct ActivityService {
    activities: Arc<ActivityRepository>,
    destinations: Arc<DestinationRepository>,
    audit: Arc<AuditService>,
}

impl ActivityService {
    pub fn new(
        activities: Arc<ActivityRepository>,
        destinations: Arc<DestinationRepository>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            activities,
            destinations,
            audit,
        }
    }

    pub async fn create(
        &self,
        ctx: &AuthContext,
        input: ActivityProviderInput,
    ) -> Result<ActivityProvider> {
        permissions::require(ctx, ops::ACTIVITIES_MANAGE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        self.destinations.get(ctx.account_id, input.destination_id).await?;

        let provider = self.activities.create(ctx.account_id, &input).await?;
        self.audit
            .record(
                ctx,
                "activity_provider",
                provider.id,
                "create",
                Some(&serde_json::json!({ "name": provider.name })),
            )
            .await;
        Ok(provider)
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> Result<ActivityProvider> {
        permissions::require(ctx, ops::ACTIVITIES_VIEW)?;
        self.activities.get(ctx.account_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        destination_id: Option<i64>,
        page: &PageRequest,
    ) -> Result<Page<ActivityProvider>> {
        permissions::require(ctx, ops::ACTIVITIES_VIEW)?;
        self.activities.list(ctx.account_id, destination_id, page).await
    }

    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: i64,
        input: ActivityProviderInput,
    ) -> Result<ActivityProvider> {
        permissions::require(ctx, ops::ACTIVITIES_MANAGE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        self.destinations.get(ctx.account_id, input.destination_id).await?;

        let provider = self.activities.update(ctx.account_id, id, &input).await?;
        self.audit
            .record(ctx, "activity_provider", id, "update", None)
            .await;
        Ok(provider)
    }

    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        permissions::require(ctx, ops::ACTIVITIES_MANAGE)?;
        self.activities.delete(ctx.account_id, id).await?;
        self.audit
            .record(ctx, "activity_provider", id, "delete", None)
            .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::destination::DestinationInput;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{AuditLogRepository, UserRepository};

    #[tokio::test]
    async fn test_provider_must_reference_own_destination() {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let acme = users.create_account("Acme Rentals").await.unwrap();
        let rival = users.create_account("Rival Stays").await.unwrap();
        let manager = users
            .create_user(acme, "ana@acme.test", "Ana", Role::Manager)
            .await
            .unwrap();

        let destinations = Arc::new(DestinationRepository::new(pool.clone()));
        let foreign = destinations
            .create(
                rival,
                &DestinationInput {
                    name: "Porto".to_string(),
                    country: "Portugal".to_string(),
                    region: None,
                },
            )
            .await
            .unwrap();

        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let service = ActivityService::new(
            Arc::new(ActivityRepository::new(pool)),
            destinations,
            audit,
        );

        let err = service
            .create(
                &AuthContext::for_user(&manager),
                ActivityProviderInput {
                    destination_id: foreign.id,
                    name: "Surf School".to_string(),
                    category: "sports".to_string(),
                    email: None,
                    phone: None,
                    website: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
