pub mod activity;
pub mod audit;
pub mod auth;
pub mod booking;
pub mod contact;
pub mod destination;
pub mod equipment;
pub mod error;
pub mod legal_document;
pub mod pagination;
pub mod pricing;
pub mod property;

// CSV import module
pub mod csv;
