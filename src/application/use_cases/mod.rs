pub mod activity_service;
pub mod audit_service;
pub mod auth_service;
pub mod booking_service;
pub mod contact_service;
pub mod csv_import;
pub mod destination_service;
pub mod document_service;
pub mod equipment_service;
pub mod permissions;
pub mod pricing_service;
pub mod property_service;
pub mod search_service;
