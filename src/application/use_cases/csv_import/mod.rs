//! Contact import pipeline: parse, map, validate, transform, upsert.
//!
//! `analyze` runs the whole pipeline short of writing and returns the
//! mapping preview; `commit` runs it again and applies the valid rows
//! in one transaction.

pub mod field_mapper;
pub mod row_validator;

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::auth::AuthContext;
use crate::domain::contact::ContactInput;
use crate::domain::csv::{ImportReport, RowOutcome, TargetField};
use crate::domain::error::Result;
use crate::infrastructure::csv::CsvParser;
use crate::infrastructure::db::repositories::ContactRepository;

use super::audit_service::AuditService;
use super::permissions::{self, ops};

pub struct CsvImportService {
    contacts: Arc<ContactRepository>,
    audit: Arc<AuditService>,
}

struct Prepared {
    valid: Vec<ContactInput>,
    report_base: ImportReport,
}

impl CsvImportService {
    pub fn new(contacts: Arc<ContactRepository>, audit: Arc<AuditService>) -> Self {
        Self { contacts, audit }
    }

    /// Dry run: parse and validate without touching the database.
    /// Every valid row is reported as skipped.
    pub async fn analyze(
        &self,
        ctx: &AuthContext,
        bytes: &[u8],
        overrides: &HashMap<TargetField, String>,
    ) -> Result<ImportReport> {
        permissions::require(ctx, ops::IMPORTS_RUN)?;

        let prepared = self.prepare(bytes, overrides)?;
        let mut report = prepared.report_base;
        for _ in &prepared.valid {
            report.record(RowOutcome::Skipped);
        }
        Ok(report)
    }

    /// Apply the import: valid rows are upserted by email in one
    /// transaction, invalid rows are reported and skipped.
    pub async fn commit(
        &self,
        ctx: &AuthContext,
        bytes: &[u8],
        overrides: &HashMap<TargetField, String>,
    ) -> Result<ImportReport> {
        permissions::require(ctx, ops::IMPORTS_RUN)?;

        let prepared = self.prepare(bytes, overrides)?;
        let mut report = prepared.report_base;

        let outcomes = self.contacts.bulk_upsert(ctx.account_id, &prepared.valid).await?;
        for outcome in outcomes {
            report.record(outcome);
        }

        self.audit
            .record(
                ctx,
                "contact",
                0,
                "import",
                Some(&serde_json::json!({
                    "total_rows": report.total_rows,
                    "inserted": report.inserted,
                    "updated": report.updated,
                    "failed": report.errors.len(),
                })),
            )
            .await;
        Ok(report)
    }

    fn prepare(
        &self,
        bytes: &[u8],
        overrides: &HashMap<TargetField, String>,
    ) -> Result<Prepared> {
        let parsed = CsvParser::new().parse_bytes(bytes)?;
        let mapping = field_mapper::map_headers(&parsed.headers, overrides)?;

        let mut report = ImportReport::new(mapping.clone(), parsed.rows.len());
        report.warnings =
            row_validator::structural_warnings(&parsed.headers, &mapping, &parsed.rows);

        let mut valid = Vec::new();
        for row in &parsed.rows {
            // Fully blank rows are dropped silently.
            if row.non_empty_fields().is_empty() {
                report.record(RowOutcome::Skipped);
                continue;
            }
            match row_validator::validate_row(row, &mapping) {
                Ok(contact) => valid.push(contact),
                Err(error) => report.errors.push(error),
            }
        }

        Ok(Prepared {
            valid,
            report_base: report,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::contact_service::ContactService;
    use super::*;
    use crate::domain::auth::Role;
    use crate::domain::contact::ContactKind;
    use crate::domain::pagination::PageRequest;
    use crate::infrastructure::db::connection::init_test_db;
    use crate::infrastructure::db::repositories::{AuditLogRepository, UserRepository};

    async fn setup() -> (CsvImportService, ContactService, AuthContext) {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let manager = users
            .create_user(account_id, "ana@acme.test", "Ana", Role::Manager)
            .await
            .unwrap();

        let contacts = Arc::new(ContactRepository::new(pool.clone()));
        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let import = CsvImportService::new(contacts.clone(), audit.clone());
        let contact_service = ContactService::new(contacts, audit);
        (import, contact_service, AuthContext::for_user(&manager))
    }

    #[tokio::test]
    async fn test_commit_inserts_and_updates_by_email() {
        let (import, contacts, ctx) = setup().await;

        let first = b"Full Name,E-Mail,Type\nMaria Silva,maria@example.com,cleaner\nPaulo Costa,paulo@example.com,owner";
        let report = import.commit(&ctx, first, &HashMap::new()).await.unwrap();
        assert_eq!(report.inserted, 2);
        assert_eq!(report.updated, 0);
        assert!(report.errors.is_empty());

        // Second file updates Maria by email and adds a new row.
        let second = b"Full Name,E-Mail,Type\nMaria S.,maria@example.com,cleaner\nRita Lopes,rita@example.com,agency";
        let report = import.commit(&ctx, second, &HashMap::new()).await.unwrap();
        assert_eq!(report.inserted, 1);
        assert_eq!(report.updated, 1);

        let page = contacts
            .list(&ctx, None, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 3);
        let maria = page
            .items
            .iter()
            .find(|c| c.email.as_deref() == Some("maria@example.com"))
            .unwrap();
        assert_eq!(maria.name, "Maria S.");
        assert_eq!(maria.kind, ContactKind::Cleaner);
    }

    #[tokio::test]
    async fn test_analyze_writes_nothing() {
        let (import, contacts, ctx) = setup().await;

        let file = b"Name,Email\nMaria,maria@example.com\nBroken,not-an-email";
        let report = import.analyze(&ctx, file, &HashMap::new()).await.unwrap();
        assert_eq!(report.total_rows, 2);
        assert_eq!(report.skipped, 1);
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].row_number, 3);

        let page = contacts
            .list(&ctx, None, &PageRequest::default())
            .await
            .unwrap();
        assert_eq!(page.total, 0);
    }

    #[tokio::test]
    async fn test_import_requires_manager() {
        let pool = init_test_db().await.unwrap();
        let users = UserRepository::new(pool.clone());
        let account_id = users.create_account("Acme Rentals").await.unwrap();
        let agent = users
            .create_user(account_id, "rui@acme.test", "Rui", Role::Agent)
            .await
            .unwrap();

        let audit = Arc::new(AuditService::new(Arc::new(AuditLogRepository::new(
            pool.clone(),
        ))));
        let import = CsvImportService::new(Arc::new(ContactRepository::new(pool)), audit);

        let err = import
            .commit(&AuthContext::for_user(&agent), b"Name\nMaria", &HashMap::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            crate::domain::error::AppError::Unauthorized(_)
        ));
    }

    #[tokio::test]
    async fn test_semicolon_file_with_typo_header() {
        let (import, _, ctx) = setup().await;

        let file = b"Names;Emial\nMaria;maria@example.com";
        let report = import.commit(&ctx, file, &HashMap::new()).await.unwrap();
        assert_eq!(report.inserted, 1);
    }
}
