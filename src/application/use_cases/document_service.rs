//! Legal document actions: documents, append-only versions and their
//! stored files.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use std::sync::Arc;
use validator::Validate;

use crate::domain::auth::AuthContext;
use crate::domain::error::{AppError, Result};
use crate::domain::legal_document::{
    DocumentVersion, LegalDocument, LegalDocumentInput, VersionUpload,
};
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::repositories::{DocumentRepository, PropertyRepository};
use crate::infrastructure::storage::{build_key, checksum, ObjectStorage};

use super::audit_service::AuditService;
use super::permissions::{self, ops};

pub struct DocumentService {
    documents: Arc<DocumentRepository>,
    properties: Arc<PropertyRepository>,
    storage: Arc<dyn ObjectStorage>,
    audit: Arc<AuditService>,
}

impl DocumentService {
    pub fn new(
        documents: Arc<DocumentRepository>,
        properties: Arc<PropertyRepository>,
        storage: Arc<dyn ObjectStorage>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            documents,
            properties,
            storage,
            audit,
        }
    }

    pub async fn create(
        &self,
        ctx: &AuthContext,
        input: LegalDocumentInput,
    ) -> Result<LegalDocument> {
        permissions::require(ctx, ops::DOCUMENTS_MANAGE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        if let Some(property_id) = input.property_id {
            self.properties.get(ctx.account_id, property_id).await?;
        }

        let document = self.documents.create(ctx.account_id, &input).await?;
        self.audit
            .record(
                ctx,
                "legal_document",
                document.id,
                "create",
                Some(&serde_json::json!({ "title": document.title })),
            )
            .await;
        Ok(document)
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> Result<LegalDocument> {
        permissions::require(ctx, ops::DOCUMENTS_VIEW)?;
        self.documents.get(ctx.account_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        property_id: Option<i64>,
        page: &PageRequest,
    ) -> Result<Page<LegalDocument>> {
        permissions::require(ctx, ops::DOCUMENTS_VIEW)?;
        self.documents.list(ctx.account_id, property_id, page).await
    }

    /// Upload a new version: store the file, then append the version
    /// row and advance the current-version pointer. If the row write
    /// fails the blob is removed again.
    pub async fn upload_version(
        &self,
        ctx: &AuthContext,
        document_id: i64,
        upload: VersionUpload,
    ) -> Result<DocumentVersion> {
        permissions::require(ctx, ops::DOCUMENTS_MANAGE)?;
        upload
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;

        let bytes = BASE64
            .decode(&upload.content_base64)
            .map_err(|e| AppError::ValidationError(format!("Invalid base64 content: {}", e)))?;
        if bytes.is_empty() {
            return Err(AppError::ValidationError(
                "Uploaded file is empty".to_string(),
            ));
        }

        let key = build_key(ctx.account_id, "documents", &upload.file_name);
        self.storage.put(&key, &bytes).await?;

        let version = match self
            .documents
            .add_version(
                ctx.account_id,
                document_id,
                &upload.file_name,
                &key,
                &checksum(&bytes),
                bytes.len() as i64,
                ctx.user_id,
            )
            .await
        {
            Ok(version) => version,
            Err(e) => {
                let _ = self.storage.delete(&key).await;
                return Err(e);
            }
        };

        self.audit
            .record(
                ctx,
                "legal_document",
                document_id,
                "upload_version",
                Some(&serde_json::json!({
                    "version_no": version.version_no,
                    "file_name": version.file_name,
                })),
            )
            .await;
        Ok(version)
    }

    pub async fn list_versions(
        &self,
        ctx: &AuthContext,
        document_id: i64,
    ) -> Result<Vec<DocumentVersion>> {
        permissions::require(ctx, ops::DOCUMENTS_VIEW)?;
        self.documents.list_versions(ctx.account_id, document_id).await
    }

    /// Fetch the stored bytes of one version.
    pub async fn download_version(
        &self,
        ctx: &AuthContext,
        document_id: i64,
        version_id: i64,
    ) -> Result<(DocumentVersion, Vec<u8>)> {
        permissions::require(ctx, ops::DOCUMENTS_VIEW)?;
        let versions = self.documents.list_versions(ctx.account_id, document_id).await?;
        let version = versions
            .into_iter()
            .find(|v| v.id == version_id)
            .ok_or_else(|| AppError::NotFound(format!("Version not found: {}", version_id)))?;
        let bytes = self.storage.get(&version.storage_key).await?;
        Ok((version, bytes))
    }

    /// Delete the document with its versions, then the blobs
    /// best-effort.
    pub async fn delete(&self, ctx: &AuthContext, id: i64) -> Result<()> {
        permissions::require(ctx, ops::DOCUMENTS_MANAGE)?;

        let keys = self.documents.delete(ctx.account_id, id).await?;
        for key in keys {
            if let Err(e) = self.storage.delete(&key).await {
                tracing::warn!(key = %key, error = %e, "Failed to delete document blob");
            }
        }
        self.audit.record(ctx, "legal_document", id, "delete", None).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::auth::Role;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{AuditLogRepository, UserRepository};
    use crate::infrastructure::storage::FsObjectStorage;
    use tempfile::TempDir;

    async fn setup() -> (DocumentService, AuthContext, TempDir) {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let manager = users
            .create_user(account_id, "ana@acme.test", "Ana", Role::Manager)
            .await
            .unwrap();

        let dir = TempDir::new().unwrap();
        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let service = DocumentService::new(
            Arc::new(DocumentRepository::new(pool.clone())),
            Arc::new(PropertyRepository::new(pool)),
            Arc::new(FsObjectStorage::new(dir.path())),
            audit,
        );
        (service, AuthContext::for_user(&manager), dir)
    }

    fn upload(name: &str, content: &[u8]) -> VersionUpload {
        VersionUpload {
            file_name: name.to_string(),
            content_base64: BASE64.encode(content),
        }
    }

    #[tokio::test]
    async fn test_version_upload_and_download() {
        let (service, ctx, _dir) = setup().await;
        let document = service
            .create(
                &ctx,
                LegalDocumentInput {
                    property_id: None,
                    title: "Rental contract".to_string(),
                    category: "contract".to_string(),
                },
            )
            .await
            .unwrap();

        let v1 = service
            .upload_version(&ctx, document.id, upload("contract-v1.pdf", b"first"))
            .await
            .unwrap();
        let v2 = service
            .upload_version(&ctx, document.id, upload("contract-v2.pdf", b"second"))
            .await
            .unwrap();
        assert_eq!(v1.version_no, 1);
        assert_eq!(v2.version_no, 2);

        let refreshed = service.get(&ctx, document.id).await.unwrap();
        assert_eq!(refreshed.current_version_id, Some(v2.id));

        let (version, bytes) = service
            .download_version(&ctx, document.id, v1.id)
            .await
            .unwrap();
        assert_eq!(bytes, b"first");
        assert_eq!(version.checksum, checksum(b"first"));

        // Deleting removes versions and blobs.
        service.delete(&ctx, document.id).await.unwrap();
        assert!(service.get(&ctx, document.id).await.is_err());
    }

    #[tokio::test]
    async fn test_empty_upload_rejected() {
        let (service, ctx, _dir) = setup().await;
        let document = service
            .create(
                &ctx,
                LegalDocumentInput {
                    property_id: None,
                    title: "Permit".to_string(),
                    category: "permit".to_string(),
                },
            )
            .await
            .unwrap();

        let err = service
            .upload_version(&ctx, document.id, upload("empty.pdf", b""))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError(_)));
    }
}
