use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};
use crate::domain::property::{
    slugify, Photo, Property, PropertyFilter, PropertyInput, PropertyStatus, PropertyUpdate, Room,
    RoomInput,
};

#[derive(Clone)]
pub struct PropertyRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct PropertyEntity {
    id: i64,
    account_id: i64,
    destination_id: i64,
    name: String,
    slug: String,
    address: String,
    city: String,
    capacity: i64,
    bedrooms: i64,
    bathrooms: i64,
    description: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl PropertyEntity {
    fn into_domain(self) -> Result<Property> {
        let status = PropertyStatus::parse(&self.status).ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Unknown property status '{}' for property {}",
                self.status, self.id
            ))
        })?;
        Ok(Property {
            id: self.id,
            account_id: self.account_id,
            destination_id: self.destination_id,
            name: self.name,
            slug: self.slug,
            address: self.address,
            city: self.city,
            capacity: self.capacity,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            description: self.description,
            status,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct RoomEntity {
    id: i64,
    property_id: i64,
    name: String,
    room_type: String,
    beds: i64,
    notes: Option<String>,
}

impl From<RoomEntity> for Room {
    fn from(e: RoomEntity) -> Self {
        Self {
            id: e.id,
            property_id: e.property_id,
            name: e.name,
            room_type: e.room_type,
            beds: e.beds,
            notes: e.notes,
        }
    }
}

#[derive(sqlx::FromRow)]
struct PhotoEntity {
    id: i64,
    property_id: i64,
    storage_key: String,
    caption: Option<String>,
    position: i64,
    is_cover: bool,
    created_at: DateTime<Utc>,
}

impl From<PhotoEntity> for Photo {
    fn from(e: PhotoEntity) -> Self {
        Self {
            id: e.id,
            property_id: e.property_id,
            storage_key: e.storage_key,
            caption: e.caption,
            position: e.position,
            is_cover: e.is_cover,
            created_at: e.created_at,
        }
    }
}

const FILTER_WHERE: &str = "account_id = ?1
    AND (?2 IS NULL OR status = ?2)
    AND (?3 IS NULL OR destination_id = ?3)
    AND (?4 IS NULL OR city = ?4 COLLATE NOCASE)
    AND (?5 IS NULL OR name LIKE '%' || ?5 || '%' OR address LIKE '%' || ?5 || '%')";

impl PropertyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, account_id: i64, input: &PropertyInput) -> Result<Property> {
        let entity = sqlx::query_as::<_, PropertyEntity>(
            "INSERT INTO properties
                (account_id, destination_id, name, slug, address, city,
                 capacity, bedrooms, bathrooms, description, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 'draft') RETURNING *",
        )
        .bind(account_id)
        .bind(input.destination_id)
        .bind(&input.name)
        .bind(slugify(&input.name))
        .bind(&input.address)
        .bind(&input.city)
        .bind(input.capacity)
        .bind(input.bedrooms)
        .bind(input.bathrooms)
        .bind(&input.description)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                AppError::Conflict(format!("Property '{}' already exists", input.name))
            }
            e => AppError::DatabaseError(format!("Failed to create property: {}", e)),
        })?;

        entity.into_domain()
    }

    pub async fn get(&self, account_id: i64, id: i64) -> Result<Property> {
        let entity = sqlx::query_as::<_, PropertyEntity>(
            "SELECT * FROM properties WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch property: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Property not found: {}", id))),
        }
    }

    pub async fn list(
        &self,
        account_id: i64,
        filter: &PropertyFilter,
        page: &PageRequest,
    ) -> Result<Page<Property>> {
        let status = filter.status.map(|s| s.as_str().to_string());

        let count_sql = format!("SELECT COUNT(*) FROM properties WHERE {}", FILTER_WHERE);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(account_id)
            .bind(&status)
            .bind(filter.destination_id)
            .bind(&filter.city)
            .bind(&filter.query)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count properties: {}", e)))?;

        let list_sql = format!(
            "SELECT * FROM properties WHERE {} ORDER BY name LIMIT ?6 OFFSET ?7",
            FILTER_WHERE
        );
        let entities = sqlx::query_as::<_, PropertyEntity>(&list_sql)
            .bind(account_id)
            .bind(&status)
            .bind(filter.destination_id)
            .bind(&filter.city)
            .bind(&filter.query)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list properties: {}", e)))?;

        let items = entities
            .into_iter()
            .map(|e| e.into_domain())
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }

    /// Names and ids for the whole tenant, used by the fuzzy search.
    pub async fn list_names(&self, account_id: i64) -> Result<Vec<(i64, String)>> {
        sqlx::query_as::<_, (i64, String)>(
            "SELECT id, name FROM properties WHERE account_id = ?",
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list property names: {}", e)))
    }

    pub async fn update(
        &self,
        account_id: i64,
        id: i64,
        update: &PropertyUpdate,
    ) -> Result<Property> {
        let entity = sqlx::query_as::<_, PropertyEntity>(
            "UPDATE properties SET
                destination_id = COALESCE(?1, destination_id),
                name = COALESCE(?2, name),
                slug = COALESCE(?3, slug),
                address = COALESCE(?4, address),
                city = COALESCE(?5, city),
                capacity = COALESCE(?6, capacity),
                bedrooms = COALESCE(?7, bedrooms),
                bathrooms = COALESCE(?8, bathrooms),
                description = COALESCE(?9, description),
                status = COALESCE(?10, status),
                updated_at = CURRENT_TIMESTAMP
             WHERE account_id = ?11 AND id = ?12 RETURNING *",
        )
        .bind(update.destination_id)
        .bind(&update.name)
        .bind(update.name.as_deref().map(slugify))
        .bind(&update.address)
        .bind(&update.city)
        .bind(update.capacity)
        .bind(update.bedrooms)
        .bind(update.bathrooms)
        .bind(&update.description)
        .bind(update.status.map(|s| s.as_str()))
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update property: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Property not found: {}", id))),
        }
    }

    /// Soft delete: archive the property, keeping children intact.
    pub async fn archive(&self, account_id: i64, id: i64) -> Result<Property> {
        let entity = sqlx::query_as::<_, PropertyEntity>(
            "UPDATE properties SET status = 'archived', updated_at = CURRENT_TIMESTAMP
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to archive property: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Property not found: {}", id))),
        }
    }

    // ---- rooms ----

    pub async fn add_room(&self, property_id: i64, input: &RoomInput) -> Result<Room> {
        let entity = sqlx::query_as::<_, RoomEntity>(
            "INSERT INTO rooms (property_id, name, room_type, beds, notes)
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(property_id)
        .bind(&input.name)
        .bind(&input.room_type)
        .bind(input.beds)
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to add room: {}", e)))?;

        Ok(entity.into())
    }

    pub async fn list_rooms(&self, property_id: i64) -> Result<Vec<Room>> {
        let entities = sqlx::query_as::<_, RoomEntity>(
            "SELECT * FROM rooms WHERE property_id = ? ORDER BY name",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list rooms: {}", e)))?;

        Ok(entities.into_iter().map(|e| e.into()).collect())
    }

    pub async fn update_room(
        &self,
        property_id: i64,
        room_id: i64,
        input: &RoomInput,
    ) -> Result<Room> {
        let entity = sqlx::query_as::<_, RoomEntity>(
            "UPDATE rooms SET name = ?, room_type = ?, beds = ?, notes = ?
             WHERE property_id = ? AND id = ? RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.room_type)
        .bind(input.beds)
        .bind(&input.notes)
        .bind(property_id)
        .bind(room_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update room: {}", e)))?;

        match entity {
            Some(entity) => Ok(entity.into()),
            None => Err(AppError::NotFound(format!("Room not found: {}", room_id))),
        }
    }

    pub async fn delete_room(&self, property_id: i64, room_id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM rooms WHERE property_id = ? AND id = ?")
            .bind(property_id)
            .bind(room_id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete room: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Room not found: {}", room_id)));
        }
        Ok(())
    }

    // ---- photos ----

    /// Insert a photo row. When `is_cover` is set, the previous cover
    /// is cleared in the same transaction.
    pub async fn add_photo(
        &self,
        property_id: i64,
        storage_key: &str,
        caption: Option<&str>,
        is_cover: bool,
    ) -> Result<Photo> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        if is_cover {
            sqlx::query("UPDATE photos SET is_cover = 0 WHERE property_id = ?")
                .bind(property_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to clear cover photo: {}", e))
                })?;
        }

        let position: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM photos WHERE property_id = ?",
        )
        .bind(property_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to compute photo position: {}", e)))?;

        let entity = sqlx::query_as::<_, PhotoEntity>(
            "INSERT INTO photos (property_id, storage_key, caption, position, is_cover)
             VALUES (?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(property_id)
        .bind(storage_key)
        .bind(caption)
        .bind(position)
        .bind(is_cover)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to add photo: {}", e)))?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit photo: {}", e)))?;

        Ok(entity.into())
    }

    pub async fn list_photos(&self, property_id: i64) -> Result<Vec<Photo>> {
        let entities = sqlx::query_as::<_, PhotoEntity>(
            "SELECT * FROM photos WHERE property_id = ? ORDER BY position",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list photos: {}", e)))?;

        Ok(entities.into_iter().map(|e| e.into()).collect())
    }

    /// Delete a photo row and return its storage key for blob cleanup.
    pub async fn delete_photo(&self, property_id: i64, photo_id: i64) -> Result<String> {
        let storage_key: Option<String> = sqlx::query_scalar(
            "DELETE FROM photos WHERE property_id = ? AND id = ? RETURNING storage_key",
        )
        .bind(property_id)
        .bind(photo_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to delete photo: {}", e)))?;

        storage_key.ok_or_else(|| AppError::NotFound(format!("Photo not found: {}", photo_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{DestinationRepository, UserRepository};
    use crate::domain::destination::DestinationInput;

    async fn seed() -> (SqlitePool, i64, i64) {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let destinations = DestinationRepository::new(pool.clone());
        let destination = destinations
            .create(
                account_id,
                &DestinationInput {
                    name: "Algarve".to_string(),
                    country: "Portugal".to_string(),
                    region: Some("Faro".to_string()),
                },
            )
            .await
            .unwrap();
        (pool, account_id, destination.id)
    }

    fn input(destination_id: i64, name: &str, city: &str) -> PropertyInput {
        PropertyInput {
            destination_id,
            name: name.to_string(),
            address: "Rua do Sol 1".to_string(),
            city: city.to_string(),
            capacity: 6,
            bedrooms: 3,
            bathrooms: 2,
            description: None,
        }
    }

    #[tokio::test]
    async fn test_create_list_filter() {
        let (pool, account_id, destination_id) = seed().await;
        let repo = PropertyRepository::new(pool);

        repo.create(account_id, &input(destination_id, "Villa Azul", "Lagos"))
            .await
            .unwrap();
        repo.create(account_id, &input(destination_id, "Casa do Mar", "Faro"))
            .await
            .unwrap();

        let page = repo
            .list(account_id, &PropertyFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 2);

        let filtered = repo
            .list(
                account_id,
                &PropertyFilter {
                    city: Some("lagos".to_string()),
                    ..Default::default()
                },
                &PageRequest::default(),
            )
            .await
            .unwrap();
        assert_eq!(filtered.total, 1);
        assert_eq!(filtered.items[0].name, "Villa Azul");

        // Tenant isolation: another account sees nothing.
        let empty = repo
            .list(account_id + 1, &PropertyFilter::default(), &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(empty.total, 0);
    }

    #[tokio::test]
    async fn test_archive_keeps_children() {
        let (pool, account_id, destination_id) = seed().await;
        let repo = PropertyRepository::new(pool);

        let property = repo
            .create(account_id, &input(destination_id, "Villa Azul", "Lagos"))
            .await
            .unwrap();
        repo.add_room(
            property.id,
            &RoomInput {
                name: "Master".to_string(),
                room_type: "bedroom".to_string(),
                beds: 1,
                notes: None,
            },
        )
        .await
        .unwrap();

        let archived = repo.archive(account_id, property.id).await.unwrap();
        assert_eq!(archived.status, PropertyStatus::Archived);

        // Still readable, rooms intact.
        assert!(repo.get(account_id, property.id).await.is_ok());
        assert_eq!(repo.list_rooms(property.id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_cover_photo_is_exclusive() {
        let (pool, account_id, destination_id) = seed().await;
        let repo = PropertyRepository::new(pool);
        let property = repo
            .create(account_id, &input(destination_id, "Villa Azul", "Lagos"))
            .await
            .unwrap();

        repo.add_photo(property.id, "a/1.jpg", None, true).await.unwrap();
        repo.add_photo(property.id, "a/2.jpg", Some("Pool"), true)
            .await
            .unwrap();

        let photos = repo.list_photos(property.id).await.unwrap();
        let covers: Vec<_> = photos.iter().filter(|p| p.is_cover).collect();
        assert_eq!(covers.len(), 1);
        assert_eq!(covers[0].storage_key, "a/2.jpg");
        assert_eq!(photos[0].position, 0);
        assert_eq!(photos[1].position, 1);
    }
}
