//! Equipment request actions.

use std::sync::Arc;
use validator::Validate;

use crate::domain::auth::AuthContext;
use crate::domain::equipment::{EquipmentRequest, EquipmentRequestInput, EquipmentStatus};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::repositories::{EquipmentRepository, PropertyRepository};

use super::audit_service::AuditService;
use super::permissions::{self, ops};

pub struct EquipmentService {
    equipment: Arc<EquipmentRepository>,
    properties: Arc<PropertyRepository>,
    audit: Arc<AuditService>,
}

impl EquipmentService {
    pub fn new(
        equipment: Arc<EquipmentRepository>,
        properties: Arc<PropertyRepository>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            equipment,
            properties,
            audit,
        }
    }

    pub async fn create(
        &self,
        ctx: &AuthContext,
        input: EquipmentRequestInput,
    ) -> Result<EquipmentRequest> {
        permissions::require(ctx, ops::EQUIPMENT_CREATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        self.properties.get(ctx.account_id, input.property_id).await?;

        let request = self
            .equipment
            .create(ctx.account_id, ctx.user_id, &input)
            .await?;
        self.audit
            .record(
                ctx,
                "equipment_request",
                request.id,
                "create",
                Some(&serde_json::json!({ "item": request.item, "urgency": request.urgency })),
            )
            .await;
        Ok(request)
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> Result<EquipmentRequest> {
        permissions::require(ctx, ops::EQUIPMENT_VIEW)?;
        self.equipment.get(ctx.account_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        property_id: Option<i64>,
        status: Option<EquipmentStatus>,
        page: &PageRequest,
    ) -> Result<Page<EquipmentRequest>> {
        permissions::require(ctx, ops::EQUIPMENT_VIEW)?;
        self.equipment
            .list(ctx.account_id, property_id, status, page)
            .await
    }

    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: i64,
        input: EquipmentRequestInput,
    ) -> Result<EquipmentRequest> {
        permissions::require(ctx, ops::EQUIPMENT_UPDATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        self.properties.get(ctx.account_id, input.property_id).await?;

        let request = self.equipment.update(ctx.account_id, id, &input).await?;
        self.audit
            .record(
                ctx,
                "equipment_request",
                id,
                "update",
                Some(&serde_json::json!({ "item": request.item, "urgency": request.urgency })),
            )
            .await;
        Ok(request)
    }

    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        permissions::require(ctx, ops::EQUIPMENT_DELETE)?;
        self.equipment.delete(ctx.account_id, id).await?;
        self.audit
            .record(ctx, "equipment_request", id, "delete", None)
            .await;
        Ok(())
    }

    /// Move a request along its lifecycle. Illegal transitions are
    /// rejected before anything is written.
    pub async fn set_status(
        &self,
        ctx: &AuthContext,
        id: i64,
        next: EquipmentStatus,
    ) -> Result<EquipmentRequest> {
        permissions::require(ctx, ops::EQUIPMENT_UPDATE)?;

        let current = self.equipment.get(ctx.account_id, id).await?;
        if !current.status.can_transition_to(next) {
            return Err(AppError::ValidationError(format!(
                "Cannot move equipment request from '{}' to '{}'",
                current.status.as_str(),
                next.as_str()
            )));
        }

        let request = self.equipment.set_status(ctx.account_id, id, next).await?;
        self.audit
            .record(
                ctx,
                "equipment_request",
                id,
                "set_status",
                Some(&serde_json::json!({ "from": current.status, "to": next })),
            )
            .await;
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::destination::DestinationInput;
    use crate::domain::equipment::Urgency;
    use crate::domain::property::PropertyInput;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{
        AuditLogRepository, DestinationRepository, UserRepository,
    };

    async fn setup() -> (EquipmentService, AuthContext, i64) {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let agent = users
            .create_user(account_id, "rui@acme.test", "Rui", Role::Agent)
            .await
            .unwrap();

        let destination = DestinationRepository::new(pool.clone())
            .create(
                account_id,
                &DestinationInput {
                    name: "Lagos".to_string(),
                    country: "Portugal".to_string(),
                    region: None,
                },
            )
            .await
            .unwrap();
        let properties = Arc::new(PropertyRepository::new(pool.clone()));
        let property = properties
            .create(
                account_id,
                &PropertyInput {
                    destination_id: destination.id,
                    name: "Villa Azul".to_string(),
                    address: "Rua do Mar 1".to_string(),
                    city: "Lagos".to_string(),
                    capacity: 6,
                    bedrooms: 3,
                    bathrooms: 2,
                    description: None,
                },
            )
            .await
            .unwrap();

        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let service = EquipmentService::new(
            Arc::new(EquipmentRepository::new(pool)),
            properties,
            audit,
        );
        (service, AuthContext::for_user(&agent), property.id)
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let (service, ctx, property_id) = setup().await;
        let request = service
            .create(
                &ctx,
                EquipmentRequestInput {
                    property_id,
                    item: "Washing machine".to_string(),
                    quantity: 1,
                    urgency: Urgency::Low,
                },
            )
            .await
            .unwrap();

        let updated = service
            .update(
                &ctx,
                request.id,
                EquipmentRequestInput {
                    property_id,
                    item: "Washing machine".to_string(),
                    quantity: 2,
                    urgency: Urgency::Urgent,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.quantity, 2);
        assert_eq!(updated.urgency, Urgency::Urgent);
        assert_eq!(updated.status, EquipmentStatus::Open);

        // Agents can file and amend requests but not remove them.
        let err = service.delete(&ctx, request.id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        let manager = AuthContext {
            role: Role::Manager,
            ..ctx.clone()
        };
        service.delete(&manager, request.id).await.unwrap();
        let err = service.get(&ctx, request.id).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_lifecycle_enforced() {
        let (service, ctx, property_id) = setup().await;
        let request = service
            .create(
                &ctx,
                EquipmentRequestInput {
                    property_id,
                    item: "Washing machine".to_string(),
                    quantity: 1,
                    urgency: Urgency::Urgent,
                },
            )
            .await
            .unwrap();
        assert_eq!(request.status, EquipmentStatus::Open);
        assert_eq!(request.requested_by, ctx.user_id);

        // Open cannot jump straight to delivered.
        let err = service
            .set_status(&ctx, request.id, EquipmentStatus::Delivered)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));

        service
            .set_status(&ctx, request.id, EquipmentStatus::Ordered)
            .await
            .unwrap();
        let delivered = service
            .set_status(&ctx, request.id, EquipmentStatus::Delivered)
            .await
            .unwrap();
        assert_eq!(delivered.status, EquipmentStatus::Delivered);
    }
}
