use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Lifecycle status of a property listing.
///
/// Deleting a property is a soft transition to `Archived`; rooms,
/// photos and bookings attached to it remain readable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    Draft,
    Published,
    Archived,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::Draft => "draft",
            PropertyStatus::Published => "published",
            PropertyStatus::Archived => "archived",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "draft" => Some(PropertyStatus::Draft),
            "published" => Some(PropertyStatus::Published),
            "archived" => Some(PropertyStatus::Archived),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Property {
    pub id: i64,
    pub account_id: i64,
    pub destination_id: i64,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub city: String,
    pub capacity: i64,
    pub bedrooms: i64,
    pub bathrooms: i64,
    pub description: Option<String>,
    pub status: PropertyStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PropertyInput {
    pub destination_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 300))]
    pub address: String,
    #[validate(length(min = 1, max = 120))]
    pub city: String,
    #[validate(range(min = 1, max = 100))]
    pub capacity: i64,
    #[validate(range(min = 0, max = 50))]
    pub bedrooms: i64,
    #[validate(range(min = 0, max = 50))]
    pub bathrooms: i64,
    pub description: Option<String>,
}

/// Partial update payload; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct PropertyUpdate {
    pub destination_id: Option<i64>,
    #[validate(length(min = 1, max = 200))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 300))]
    pub address: Option<String>,
    #[validate(length(min = 1, max = 120))]
    pub city: Option<String>,
    #[validate(range(min = 1, max = 100))]
    pub capacity: Option<i64>,
    #[validate(range(min = 0, max = 50))]
    pub bedrooms: Option<i64>,
    #[validate(range(min = 0, max = 50))]
    pub bathrooms: Option<i64>,
    pub description: Option<String>,
    pub status: Option<PropertyStatus>,
}

/// Filters accepted by the property list endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PropertyFilter {
    pub status: Option<PropertyStatus>,
    pub destination_id: Option<i64>,
    pub city: Option<String>,
    /// Free-text match against name and address.
    pub query: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: i64,
    pub property_id: i64,
    pub name: String,
    pub room_type: String,
    pub beds: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RoomInput {
    #[validate(length(min = 1, max = 120))]
    pub name: String,
    #[validate(length(min = 1, max = 60))]
    pub room_type: String,
    #[validate(range(min = 0, max = 20))]
    pub beds: i64,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Photo {
    pub id: i64,
    pub property_id: i64,
    pub storage_key: String,
    pub caption: Option<String>,
    pub position: i64,
    pub is_cover: bool,
    pub created_at: DateTime<Utc>,
}

/// Photo upload payload; image bytes arrive base64-encoded.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PhotoUpload {
    #[validate(length(min = 1, max = 200))]
    pub file_name: String,
    #[validate(length(min = 1))]
    pub content_base64: String,
    pub caption: Option<String>,
    #[serde(default)]
    pub is_cover: bool,
}

/// Derive a URL-safe slug from a display name.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_dash = true;

    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            slug.push(ch.to_ascii_lowercase());
            last_dash = false;
        } else if !last_dash {
            slug.push('-');
            last_dash = true;
        }
    }

    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Villa Azul — Beachfront"), "villa-azul-beachfront");
        assert_eq!(slugify("  Casa  del Mar  "), "casa-del-mar");
        assert_eq!(slugify("Loft #12"), "loft-12");
    }

    #[test]
    fn test_status_round_trip() {
        for status in [
            PropertyStatus::Draft,
            PropertyStatus::Published,
            PropertyStatus::Archived,
        ] {
            assert_eq!(PropertyStatus::parse(status.as_str()), Some(status));
        }
    }
}
