pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;

use std::path::Path;
use std::sync::Arc;

use crate::application::{
    ActivityService, AuditService, AuthService, BookingService, ContactService, CsvImportService,
    DestinationService, DocumentService, EquipmentService, PricingService, PropertyService,
    SearchService,
};
use crate::domain::error::Result;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::db::connection::init_db;
use crate::infrastructure::db::repositories::{
    ActivityRepository, AuditLogRepository, BookingRepository, ContactRepository,
    DestinationRepository, DocumentRepository, EquipmentRepository, PricingRepository,
    PropertyRepository, UserRepository,
};
use crate::infrastructure::storage::FsObjectStorage;
use crate::interfaces::http::AppState;

/// Wire repositories, services and storage onto one pool.
pub async fn build_state(config: &AppConfig) -> Result<AppState> {
    let pool = init_db(Path::new(&config.database_path)).await?;
    let storage: Arc<dyn infrastructure::storage::ObjectStorage> =
        Arc::new(FsObjectStorage::new(&config.storage_root));

    let users = Arc::new(UserRepository::new(pool.clone()));
    let destinations = Arc::new(DestinationRepository::new(pool.clone()));
    let properties = Arc::new(PropertyRepository::new(pool.clone()));
    let bookings = Arc::new(BookingRepository::new(pool.clone()));
    let contacts = Arc::new(ContactRepository::new(pool.clone()));
    let documents = Arc::new(DocumentRepository::new(pool.clone()));
    let equipment = Arc::new(EquipmentRepository::new(pool.clone()));
    let pricing = Arc::new(PricingRepository::new(pool.clone()));
    let activities = Arc::new(ActivityRepository::new(pool.clone()));
    let audit_logs = Arc::new(AuditLogRepository::new(pool));

    let audit = Arc::new(AuditService::new(audit_logs));

    Ok(AppState {
        auth: AuthService::new(users, config.token_ttl_hours),
        destinations: DestinationService::new(destinations.clone(), audit.clone()),
        properties: PropertyService::new(
            properties.clone(),
            contacts.clone(),
            storage.clone(),
            audit.clone(),
        ),
        bookings: BookingService::new(bookings, properties.clone(), audit.clone()),
        contacts: ContactService::new(contacts.clone(), audit.clone()),
        documents: DocumentService::new(documents, properties.clone(), storage, audit.clone()),
        equipment: EquipmentService::new(equipment, properties.clone(), audit.clone()),
        pricing: PricingService::new(pricing, properties.clone(), audit.clone()),
        activities: ActivityService::new(activities, destinations, audit.clone()),
        search: SearchService::new(properties, contacts.clone()),
        imports: CsvImportService::new(contacts, audit.clone()),
        audit,
    })
}
