pub mod use_cases;

pub use use_cases::activity_service::ActivityService;
pub use use_cases::audit_service::AuditService;
pub use use_cases::auth_service::AuthService;
pub use use_cases::booking_service::BookingService;
pub use use_cases::contact_service::ContactService;
pub use use_cases::csv_import::CsvImportService;
pub use use_cases::destination_service::DestinationService;
pub use use_cases::document_service::DocumentService;
pub use use_cases::equipment_service::EquipmentService;
pub use use_cases::pricing_service::PricingService;
pub use use_cases::property_service::PropertyService;
pub use use_cases::search_service::SearchService;
