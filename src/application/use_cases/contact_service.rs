//! Contact directory actions.

use std::sync::Arc;
use validator::Validate;

use crate::domain::auth::AuthContext;
use crate::domain::contact::{Contact, ContactInput, ContactKind};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::repositories::ContactRepository;

use super::audit_service::AuditService;
use super::permissions::{self, ops};

pub struct ContactService {
    contacts: Arc<ContactRepository>,
    audit: Arc<AuditService>,
}

impl ContactService {
    pub fn new(contacts: Arc<ContactRepository>, audit: Arc<AuditService>) -> Self {
        Self { contacts, audit }
    }

    pub async fn create(&self, ctx: &AuthContext, input: ContactInput) -> Result<Contact> {
        permissions::require(ctx, ops::CONTACTS_CREATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let contact = self.contacts.create(ctx.account_id, &input).await?;
        self.audit
            .record(
                ctx,
                "contact",
                contact.id,
                "create",
                Some(&serde_json::json!({ "name": contact.name, "kind": contact.kind })),
            )
            .await;
        Ok(contact)
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> Result<Contact> {
        permissions::require(ctx, ops::CONTACTS_VIEW)?;
        self.contacts.get(ctx.account_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        kind: Option<ContactKind>,
        page: &PageRequest,
    ) -> Result<Page<Contact>> {
        permissions::require(ctx, ops::CONTACTS_VIEW)?;
        self.contacts.list(ctx.account_id, kind, page).await
    }

    pub async fn update(&self, ctx: &AuthContext, id: i64, input: ContactInput) -> Result<Contact> {
        permissions::require(ctx, ops::CONTACTS_UPDATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let contact = self.contacts.update(ctx.account_id, id, &input).await?;
        self.audit.record(ctx, "contact", id, "update", None).await;
        Ok(contact)
    }

    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        permissions::require(ctx, ops::CONTACTS_DELETE)?;
        self.contacts.delete(ctx.account_id, id).await?;
        self.audit.record(ctx, "contact", id, "delete", None).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{AuditLogRepository, UserRepository};

    async fn setup() -> (ContactService, AuthContext, AuthContext) {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let agent = users
            .create_user(account_id, "rui@acme.test", "Rui", Role::Agent)
            .await
            .unwrap();
        let manager = users
            .create_user(account_id, "ana@acme.test", "Ana", Role::Manager)
            .await
            .unwrap();

        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let service = ContactService::new(Arc::new(ContactRepository::new(pool)), audit);
        (
            service,
            AuthContext::for_user(&agent),
            AuthContext::for_user(&manager),
        )
    }

    fn input(name: &str, kind: ContactKind) -> ContactInput {
        ContactInput {
            name: name.to_string(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            phone: None,
            kind,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_delete_needs_manager() {
        let (service, agent, manager) = setup().await;
        let contact = service
            .create(&agent, input("Maria", ContactKind::Cleaner))
            .await
            .unwrap();

        // Agents may create and update but not delete.
        let err = service.delete(&agent, contact.id).await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));

        service.delete(&manager, contact.id).await.unwrap();
        assert!(service.get(&agent, contact.id).await.is_err());
    }

    #[tokio::test]
    async fn test_list_by_kind() {
        let (service, agent, _) = setup().await;
        service
            .create(&agent, input("Maria", ContactKind::Cleaner))
            .await
            .unwrap();
        service
            .create(&agent, input("Paulo", ContactKind::Owner))
            .await
            .unwrap();

        let page = service
            .list(&agent, Some(ContactKind::Owner), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 1);
        assert_eq!(page.items[0].name, "Paulo");
    }
}
