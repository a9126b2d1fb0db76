use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactKind {
    Owner,
    Agency,
    Cleaner,
    Maintenance,
    Other,
}

impl ContactKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactKind::Owner => "owner",
            ContactKind::Agency => "agency",
            ContactKind::Cleaner => "cleaner",
            ContactKind::Maintenance => "maintenance",
            ContactKind::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "owner" => Some(ContactKind::Owner),
            "agency" => Some(ContactKind::Agency),
            "cleaner" => Some(ContactKind::Cleaner),
            "maintenance" => Some(ContactKind::Maintenance),
            "other" => Some(ContactKind::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    pub id: i64,
    pub account_id: i64,
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub kind: ContactKind,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ContactInput {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(email)]
    pub email: Option<String>,
    #[validate(length(max = 40))]
    pub phone: Option<String>,
    pub kind: ContactKind,
    pub notes: Option<String>,
}
