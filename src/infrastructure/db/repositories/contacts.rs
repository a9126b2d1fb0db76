use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::contact::{Contact, ContactInput, ContactKind};
use crate::domain::csv::RowOutcome;
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};

#[derive(Clone)]
pub struct ContactRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct ContactEntity {
    id: i64,
    account_id: i64,
    name: String,
    email: Option<String>,
    phone: Option<String>,
    kind: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl ContactEntity {
    fn into_domain(self) -> Result<Contact> {
        let kind = ContactKind::parse(&self.kind).ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Unknown contact kind '{}' for contact {}",
                self.kind, self.id
            ))
        })?;
        Ok(Contact {
            id: self.id,
            account_id: self.account_id,
            name: self.name,
            email: self.email,
            phone: self.phone,
            kind,
            notes: self.notes,
            created_at: self.created_at,
        })
    }
}

impl ContactRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, account_id: i64, input: &ContactInput) -> Result<Contact> {
        let entity = sqlx::query_as::<_, ContactEntity>(
            "INSERT INTO contacts (account_id, name, email, phone, kind, notes)
             VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(account_id)
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.kind.as_str())
        .bind(&input.notes)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create contact: {}", e)))?;

        entity.into_domain()
    }

    pub async fn get(&self, account_id: i64, id: i64) -> Result<Contact> {
        let entity = sqlx::query_as::<_, ContactEntity>(
            "SELECT * FROM contacts WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch contact: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Contact not found: {}", id))),
        }
    }

    pub async fn list(
        &self,
        account_id: i64,
        kind: Option<ContactKind>,
        page: &PageRequest,
    ) -> Result<Page<Contact>> {
        let kind = kind.map(|k| k.as_str().to_string());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM contacts WHERE account_id = ?1 AND (?2 IS NULL OR kind = ?2)",
        )
        .bind(account_id)
        .bind(&kind)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to count contacts: {}", e)))?;

        let entities = sqlx::query_as::<_, ContactEntity>(
            "SELECT * FROM contacts WHERE account_id = ?1 AND (?2 IS NULL OR kind = ?2)
             ORDER BY name LIMIT ?3 OFFSET ?4",
        )
        .bind(account_id)
        .bind(&kind)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list contacts: {}", e)))?;

        let items = entities
            .into_iter()
            .map(|e| e.into_domain())
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }

    /// Names and ids for the whole tenant, used by the fuzzy search.
    pub async fn list_names(&self, account_id: i64) -> Result<Vec<(i64, String)>> {
        sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM contacts WHERE account_id = ?")
            .bind(account_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list contact names: {}", e)))
    }

    pub async fn update(&self, account_id: i64, id: i64, input: &ContactInput) -> Result<Contact> {
        let entity = sqlx::query_as::<_, ContactEntity>(
            "UPDATE contacts SET name = ?, email = ?, phone = ?, kind = ?, notes = ?
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(&input.name)
        .bind(&input.email)
        .bind(&input.phone)
        .bind(input.kind.as_str())
        .bind(&input.notes)
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update contact: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Contact not found: {}", id))),
        }
    }

    pub async fn delete(&self, account_id: i64, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM contacts WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete contact: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Contact not found: {}", id)));
        }
        Ok(())
    }

    /// Replace the contact list attached to a property: delete and
    /// reinsert in one transaction so a reader never sees a partial
    /// list.
    pub async fn replace_property_contacts(
        &self,
        property_id: i64,
        contact_ids: &[i64],
    ) -> Result<()> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("DELETE FROM property_contacts WHERE property_id = ?")
            .bind(property_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to clear property contacts: {}", e))
            })?;

        for contact_id in contact_ids {
            sqlx::query("INSERT INTO property_contacts (property_id, contact_id) VALUES (?, ?)")
                .bind(property_id)
                .bind(contact_id)
                .execute(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to attach contact: {}", e))
                })?;
        }

        tx.commit().await.map_err(|e| {
            AppError::DatabaseError(format!("Failed to commit contact list: {}", e))
        })?;
        Ok(())
    }

    pub async fn list_property_contacts(&self, property_id: i64) -> Result<Vec<Contact>> {
        let entities = sqlx::query_as::<_, ContactEntity>(
            "SELECT c.* FROM contacts c
             JOIN property_contacts pc ON pc.contact_id = c.id
             WHERE pc.property_id = ? ORDER BY c.name",
        )
        .bind(property_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to list property contacts: {}", e))
        })?;

        entities.into_iter().map(|e| e.into_domain()).collect()
    }

    /// Insert or update a batch of imported contacts in one
    /// transaction. A row whose email matches an existing contact
    /// updates it; everything else is inserted.
    pub async fn bulk_upsert(
        &self,
        account_id: i64,
        rows: &[ContactInput],
    ) -> Result<Vec<RowOutcome>> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        let mut outcomes = Vec::with_capacity(rows.len());
        for row in rows {
            let existing_id: Option<i64> = match &row.email {
                Some(email) => sqlx::query_scalar(
                    "SELECT id FROM contacts WHERE account_id = ? AND email = ? LIMIT 1",
                )
                .bind(account_id)
                .bind(email)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| {
                    AppError::DatabaseError(format!("Failed to look up contact: {}", e))
                })?,
                None => None,
            };

            match existing_id {
                Some(id) => {
                    sqlx::query(
                        "UPDATE contacts SET name = ?, phone = COALESCE(?, phone),
                                kind = ?, notes = COALESCE(?, notes)
                         WHERE account_id = ? AND id = ?",
                    )
                    .bind(&row.name)
                    .bind(&row.phone)
                    .bind(row.kind.as_str())
                    .bind(&row.notes)
                    .bind(account_id)
                    .bind(id)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to update contact: {}", e))
                    })?;
                    outcomes.push(RowOutcome::Updated);
                }
                None => {
                    sqlx::query(
                        "INSERT INTO contacts (account_id, name, email, phone, kind, notes)
                         VALUES (?, ?, ?, ?, ?, ?)",
                    )
                    .bind(account_id)
                    .bind(&row.name)
                    .bind(&row.email)
                    .bind(&row.phone)
                    .bind(row.kind.as_str())
                    .bind(&row.notes)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| {
                        AppError::DatabaseError(format!("Failed to insert contact: {}", e))
                    })?;
                    outcomes.push(RowOutcome::Inserted);
                }
            }
        }

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit import: {}", e)))?;
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db::connection::init_test_db;

    fn input(name: &str, email: Option<&str>) -> ContactInput {
        ContactInput {
            name: name.to_string(),
            email: email.map(|e| e.to_string()),
            phone: None,
            kind: ContactKind::Owner,
            notes: None,
        }
    }

    async fn account(pool: &SqlitePool) -> i64 {
        sqlx::query("INSERT INTO accounts (name) VALUES ('Acme')")
            .execute(pool)
            .await
            .unwrap()
            .last_insert_rowid()
    }

    #[tokio::test]
    async fn test_bulk_upsert_matches_by_email() {
        let pool = init_test_db().await.unwrap();
        let account_id = account(&pool).await;
        let repo = ContactRepository::new(pool);

        repo.create(account_id, &input("Old Name", Some("ana@example.com")))
            .await
            .unwrap();

        let outcomes = repo
            .bulk_upsert(
                account_id,
                &[
                    input("Ana Sousa", Some("ana@example.com")),
                    input("Bruno Costa", Some("bruno@example.com")),
                    input("No Email", None),
                ],
            )
            .await
            .unwrap();

        assert_eq!(
            outcomes,
            vec![RowOutcome::Updated, RowOutcome::Inserted, RowOutcome::Inserted]
        );

        let page = repo
            .list(account_id, None, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        assert!(page.items.iter().any(|c| c.name == "Ana Sousa"));
        assert!(!page.items.iter().any(|c| c.name == "Old Name"));
    }

    #[tokio::test]
    async fn test_replace_property_contacts_is_atomic() {
        let pool = init_test_db().await.unwrap();
        let account_id = account(&pool).await;

        let destination_id = sqlx::query(
            "INSERT INTO destinations (account_id, name, slug, country) VALUES (?, 'Algarve', 'algarve', 'PT')",
        )
        .bind(account_id)
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();
        let property_id = sqlx::query(
            "INSERT INTO properties (account_id, destination_id, name, slug, address, city, capacity, bedrooms, bathrooms)
             VALUES (?, ?, 'Villa', 'villa', 'Rua 1', 'Lagos', 4, 2, 1)",
        )
        .bind(account_id)
        .bind(destination_id)
        .execute(&pool)
        .await
        .unwrap()
        .last_insert_rowid();

        let repo = ContactRepository::new(pool);
        let a = repo.create(account_id, &input("Ana", None)).await.unwrap();
        let b = repo.create(account_id, &input("Bruno", None)).await.unwrap();
        let c = repo.create(account_id, &input("Carla", None)).await.unwrap();

        repo.replace_property_contacts(property_id, &[a.id, b.id])
            .await
            .unwrap();
        repo.replace_property_contacts(property_id, &[c.id])
            .await
            .unwrap();

        let attached = repo.list_property_contacts(property_id).await.unwrap();
        assert_eq!(attached.len(), 1);
        assert_eq!(attached[0].name, "Carla");
    }
}
