use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::domain::error::{AppError, Result};
use crate::domain::legal_document::{DocumentVersion, LegalDocument, LegalDocumentInput};
use crate::domain::pagination::{Page, PageRequest};

#[derive(Clone)]
pub struct DocumentRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct DocumentEntity {
    id: i64,
    account_id: i64,
    property_id: Option<i64>,
    title: String,
    category: String,
    current_version_id: Option<i64>,
    created_at: DateTime<Utc>,
}

impl From<DocumentEntity> for LegalDocument {
    fn from(e: DocumentEntity) -> Self {
        Self {
            id: e.id,
            account_id: e.account_id,
            property_id: e.property_id,
            title: e.title,
            category: e.category,
            current_version_id: e.current_version_id,
            created_at: e.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct VersionEntity {
    id: i64,
    document_id: i64,
    version_no: i64,
    file_name: String,
    storage_key: String,
    checksum: String,
    size_bytes: i64,
    uploaded_by: i64,
    created_at: DateTime<Utc>,
}

impl From<VersionEntity> for DocumentVersion {
    fn from(e: VersionEntity) -> Self {
        Self {
            id: e.id,
            document_id: e.document_id,
            version_no: e.version_no,
            file_name: e.file_name,
            storage_key: e.storage_key,
            checksum: e.checksum,
            size_bytes: e.size_bytes,
            uploaded_by: e.uploaded_by,
            created_at: e.created_at,
        }
    }
}

impl DocumentRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        account_id: i64,
        input: &LegalDocumentInput,
    ) -> Result<LegalDocument> {
        let entity = sqlx::query_as::<_, DocumentEntity>(
            "INSERT INTO legal_documents (account_id, property_id, title, category)
             VALUES (?, ?, ?, ?) RETURNING *",
        )
        .bind(account_id)
        .bind(input.property_id)
        .bind(&input.title)
        .bind(&input.category)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create document: {}", e)))?;

        Ok(entity.into())
    }

    pub async fn get(&self, account_id: i64, id: i64) -> Result<LegalDocument> {
        let entity = sqlx::query_as::<_, DocumentEntity>(
            "SELECT * FROM legal_documents WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch document: {}", e)))?;

        match entity {
            Some(entity) => Ok(entity.into()),
            None => Err(AppError::NotFound(format!("Document not found: {}", id))),
        }
    }

    pub async fn list(
        &self,
        account_id: i64,
        property_id: Option<i64>,
        page: &PageRequest,
    ) -> Result<Page<LegalDocument>> {
        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM legal_documents
             WHERE account_id = ?1 AND (?2 IS NULL OR property_id = ?2)",
        )
        .bind(account_id)
        .bind(property_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to count documents: {}", e)))?;

        let entities = sqlx::query_as::<_, DocumentEntity>(
            "SELECT * FROM legal_documents
             WHERE account_id = ?1 AND (?2 IS NULL OR property_id = ?2)
             ORDER BY title LIMIT ?3 OFFSET ?4",
        )
        .bind(account_id)
        .bind(property_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list documents: {}", e)))?;

        Ok(Page::new(
            entities.into_iter().map(|e| e.into()).collect(),
            page,
            total,
        ))
    }

    /// Append a version and advance the document's current-version
    /// pointer in one transaction. Version numbers are dense,
    /// starting at 1.
    #[allow(clippy::too_many_arguments)]
    pub async fn add_version(
        &self,
        account_id: i64,
        document_id: i64,
        file_name: &str,
        storage_key: &str,
        checksum: &str,
        size_bytes: i64,
        uploaded_by: i64,
    ) -> Result<DocumentVersion> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to begin transaction: {}", e)))?;

        // Lock in the parent row and tenant check before writing.
        let exists: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM legal_documents WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(document_id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch document: {}", e)))?;
        if exists.is_none() {
            return Err(AppError::NotFound(format!(
                "Document not found: {}",
                document_id
            )));
        }

        let next_version: i64 = sqlx::query_scalar(
            "SELECT COALESCE(MAX(version_no) + 1, 1) FROM document_versions WHERE document_id = ?",
        )
        .bind(document_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to compute version number: {}", e)))?;

        let entity = sqlx::query_as::<_, VersionEntity>(
            "INSERT INTO document_versions
                (document_id, version_no, file_name, storage_key, checksum, size_bytes, uploaded_by)
             VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING *",
        )
        .bind(document_id)
        .bind(next_version)
        .bind(file_name)
        .bind(storage_key)
        .bind(checksum)
        .bind(size_bytes)
        .bind(uploaded_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to insert version: {}", e)))?;

        sqlx::query("UPDATE legal_documents SET current_version_id = ? WHERE id = ?")
            .bind(entity.id)
            .bind(document_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                AppError::DatabaseError(format!("Failed to advance version pointer: {}", e))
            })?;

        tx.commit()
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to commit version: {}", e)))?;

        Ok(entity.into())
    }

    pub async fn list_versions(
        &self,
        account_id: i64,
        document_id: i64,
    ) -> Result<Vec<DocumentVersion>> {
        let entities = sqlx::query_as::<_, VersionEntity>(
            "SELECT v.* FROM document_versions v
             JOIN legal_documents d ON d.id = v.document_id
             WHERE d.account_id = ? AND v.document_id = ?
             ORDER BY v.version_no",
        )
        .bind(account_id)
        .bind(document_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to list versions: {}", e)))?;

        Ok(entities.into_iter().map(|e| e.into()).collect())
    }

    /// Delete a document and return the storage keys of its versions
    /// for blob cleanup. Version rows go with the FK cascade.
    pub async fn delete(&self, account_id: i64, id: i64) -> Result<Vec<String>> {
        let keys: Vec<String> = sqlx::query_scalar(
            "SELECT storage_key FROM document_versions WHERE document_id = ?",
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to collect storage keys: {}", e)))?;

        let result = sqlx::query("DELETE FROM legal_documents WHERE account_id = ? AND id = ?")
            .bind(account_id)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to delete document: {}", e)))?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Document not found: {}", id)));
        }
        Ok(keys)
    }
}
