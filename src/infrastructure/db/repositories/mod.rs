pub mod activities;
pub mod audit_logs;
pub mod bookings;
pub mod contacts;
pub mod destinations;
pub mod documents;
pub mod equipment;
pub mod pricing;
pub mod properties;
pub mod users;

pub use activities::ActivityRepository;
pub use audit_logs::AuditLogRepository;
pub use bookings::BookingRepository;
pub use contacts::ContactRepository;
pub use destinations::DestinationRepository;
pub use documents::DocumentRepository;
pub use equipment::EquipmentRepository;
pub use pricing::PricingRepository;
pub use properties::PropertyRepository;
pub use users::UserRepository;
