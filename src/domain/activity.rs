use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Local experience provider (tours, rentals, chefs) surfaced to
/// guests of a destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityProvider {
    pub id: i64,
    pub account_id: i64,
    pub destination_id: i64,
    pub name: String,
    pub category: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ActivityProviderInput {
    pub destination_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 80))]
    pub category: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    #[validate(url)]
    pub website: Option<String>,
}
