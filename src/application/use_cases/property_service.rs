//! Property management actions: the listing itself plus its rooms,
//! photos and attached contacts.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::Arc;
use validator::Validate;

use crate::domain::auth::AuthContext;
use crate::domain::contact::Contact;
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::property::{
    Photo, PhotoUpload, Property, PropertyFilter, PropertyInput, PropertyUpdate, Room, RoomInput,
};
use crate::infrastructure::db::repositories::{ContactRepository, PropertyRepository};
use crate::infrastructure::storage::{build_key, ObjectStorage};

use super::audit_service::AuditService;
use super::permissions::{self, ops};

pub struct PropertyService {
    properties: Arc<PropertyRepository>,
    contacts: Arc<ContactRepository>,
    storage: Arc<dyn ObjectStorage>,
    audit: Arc<AuditService>,
}

impl PropertyService {
    pub fn new(
        properties: Arc<PropertyRepository>,
        contacts: Arc<ContactRepository>,
        storage: Arc<dyn ObjectStorage>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            properties,
            contacts,
            storage,
            audit,
        }
    }

    pub async fn create(&self, ctx: &AuthContext, input: PropertyInput) -> Result<Property> {
        permissions::require(ctx, ops::PROPERTIES_CREATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let property = self.properties.create(ctx.account_id, &input).await?;
        self.audit
            .record(
                ctx,
                "property",
                property.id,
                "create",
                Some(&serde_json::json!({ "name": property.name, "slug": property.slug })),
            )
            .await;
        Ok(property)
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> Result<Property> {
        permissions::require(ctx, ops::PROPERTIES_VIEW)?;
        self.properties.get(ctx.account_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: &PropertyFilter,
        page: &PageRequest,
    ) -> Result<Page<Property>> {
        permissions::require(ctx, ops::PROPERTIES_VIEW)?;
        self.properties.list(ctx.account_id, filter, page).await
    }

    pub async fn update(
        &self,
        ctx: &AuthContext,
        id: i64,
        update: PropertyUpdate,
    ) -> Result<Property> {
        permissions::require(ctx, ops::PROPERTIES_UPDATE)?;
        update
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let property = self.properties.update(ctx.account_id, id, &update).await?;
        self.audit
            .record(
                ctx,
                "property",
                id,
                "update",
                Some(&serde_json::json!({ "status": property.status })),
            )
            .await;
        Ok(property)
    }

    /// Soft delete: the property moves to archived and its rooms,
    /// photos and bookings stay readable.
    pub async fn archive(&self, ctx: &AuthContext, id: i64) -> Result<Property> {
        permissions::require(ctx, ops::PROPERTIES_DELETE)?;
        let property = self.properties.archive(ctx.account_id, id).await?;
        self.audit.record(ctx, "property", id, "archive", None).await;
        Ok(property)
    }

    // ---- rooms ----

    pub async fn add_room(&self, ctx: &AuthContext, property_id: i64, input: RoomInput) -> Result<Room> {
        permissions::require(ctx, ops::PROPERTIES_UPDATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        // Tenant check before touching child rows.
        self.properties.get(ctx.account_id, property_id).await?;
        let room = self.properties.add_room(property_id, &input).await?;
        self.audit
            .record(
                ctx,
                "property",
                property_id,
                "add_room",
                Some(&serde_json::json!({ "room": room.name })),
            )
            .await;
        Ok(room)
    }

    pub async fn list_rooms(&self, ctx: &AuthContext, property_id: i64) -> Result<Vec<Room>> {
        permissions::require(ctx, ops::PROPERTIES_VIEW)?;
        self.properties.get(ctx.account_id, property_id).await?;
        self.properties.list_rooms(property_id).await
    }

    pub async fn update_room(
        &self,
        ctx: &AuthContext,
        property_id: i64,
        room_id: i64,
        input: RoomInput,
    ) -> Result<Room> {
        permissions::require(ctx, ops::PROPERTIES_UPDATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        self.properties.get(ctx.account_id, property_id).await?;
        self.properties.update_room(property_id, room_id, &input).await
    }

    pub async fn delete_room(
        &self,
        ctx: &AuthContext,
        property_id: i64,
        room_id: i64,
    ) -> Result<()> {
        permissions::require(ctx, ops::PROPERTIES_UPDATE)?;
        self.properties.get(ctx.account_id, property_id).await?;
        self.properties.delete_room(property_id, room_id).await
    }

    // ---- photos ----

    /// Store the image bytes, then insert the photo row. If the row
    /// insert fails the blob is deleted again so no orphan remains.
    pub async fn add_photo(
        &self,
        ctx: &AuthContext,
        property_id: i64,
        upload: PhotoUpload,
    ) -> Result<Photo> {
        permissions::require(ctx, ops::PROPERTIES_UPDATE)?;
        upload
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        self.properties.get(ctx.account_id, property_id).await?;

        let bytes = BASE64
            .decode(&upload.content_base64)
            .map_err(|e| AppError::ValidationError(format!("Invalid base64 content: {}", e)))?;

        let key = build_key(ctx.account_id, "photos", &upload.file_name);
        self.storage.put(&key, &bytes).await?;

        let photo = match self
            .properties
            .add_photo(property_id, &key, upload.caption.as_deref(), upload.is_cover)
            .await
        {
            Ok(photo) => photo,
            Err(e) => {
                let _ = self.storage.delete(&key).await;
                return Err(e);
            }
        };

        self.audit
            .record(
                ctx,
                "property",
                property_id,
                "add_photo",
                Some(&serde_json::json!({ "file_name": upload.file_name, "cover": upload.is_cover })),
            )
            .await;
        Ok(photo)
    }

    pub async fn list_photos(&self, ctx: &AuthContext, property_id: i64) -> Result<Vec<Photo>> {
        permissions::require(ctx, ops::PROPERTIES_VIEW)?;
        self.properties.get(ctx.account_id, property_id).await?;
        self.properties.list_photos(property_id).await
    }

    pub async fn get_photo_content(
        &self,
        ctx: &AuthContext,
        property_id: i64,
        photo_id: i64,
    ) -> Result<Vec<u8>> {
        permissions::require(ctx, ops::PROPERTIES_VIEW)?;
        self.properties.get(ctx.account_id, property_id).await?;
        let photos = self.properties.list_photos(property_id).await?;
        let photo = photos
            .into_iter()
            .find(|p| p.id == photo_id)
            .ok_or_else(|| AppError::NotFound(format!("Photo not found: {}", photo_id)))?;
        self.storage.get(&photo.storage_key).await
    }

    /// Remove the row first, then the blob best-effort.
    pub async fn delete_photo(
        &self,
        ctx: &AuthContext,
        property_id: i64,
        photo_id: i64,
    ) -> Result<()> {
        permissions::require(ctx, ops::PROPERTIES_UPDATE)?;
        self.properties.get(ctx.account_id, property_id).await?;

        let storage_key = self.properties.delete_photo(property_id, photo_id).await?;
        if let Err(e) = self.storage.delete(&storage_key).await {
            tracing::warn!(key = %storage_key, error = %e, "Failed to delete photo blob");
        }
        self.audit
            .record(ctx, "property", property_id, "delete_photo", None)
            .await;
        Ok(())
    }

    // ---- attached contacts ----

    pub async fn set_contacts(
        &self,
        ctx: &AuthContext,
        property_id: i64,
        contact_ids: Vec<i64>,
    ) -> Result<Vec<Contact>> {
        permissions::require(ctx, ops::PROPERTIES_UPDATE)?;
        self.properties.get(ctx.account_id, property_id).await?;

        // Every referenced contact must belong to the caller's account.
        for contact_id in &contact_ids {
            self.contacts.get(ctx.account_id, *contact_id).await?;
        }

        self.contacts
            .replace_property_contacts(property_id, &contact_ids)
            .await?;
        self.audit
            .record(
                ctx,
                "property",
                property_id,
                "set_contacts",
                Some(&serde_json::json!({ "count": contact_ids.len() })),
            )
            .await;
        self.contacts.list_property_contacts(property_id).await
    }

    pub async fn list_contacts(
        &self,
        ctx: &AuthContext,
        property_id: i64,
    ) -> Result<Vec<Contact>> {
        permissions::require(ctx, ops::PROPERTIES_VIEW)?;
        self.properties.get(ctx.account_id, property_id).await?;
        self.contacts.list_property_contacts(property_id).await
    }
}
