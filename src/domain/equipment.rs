use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Low,
    Normal,
    Urgent,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Low => "low",
            Urgency::Normal => "normal",
            Urgency::Urgent => "urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "low" => Some(Urgency::Low),
            "normal" => Some(Urgency::Normal),
            "urgent" => Some(Urgency::Urgent),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquipmentStatus {
    Open,
    Ordered,
    Delivered,
    Rejected,
}

impl EquipmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EquipmentStatus::Open => "open",
            EquipmentStatus::Ordered => "ordered",
            EquipmentStatus::Delivered => "delivered",
            EquipmentStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "open" => Some(EquipmentStatus::Open),
            "ordered" => Some(EquipmentStatus::Ordered),
            "delivered" => Some(EquipmentStatus::Delivered),
            "rejected" => Some(EquipmentStatus::Rejected),
            _ => None,
        }
    }

    /// Open requests may be ordered or rejected; ordered requests may
    /// be delivered. Delivered and rejected are terminal.
    pub fn can_transition_to(&self, next: EquipmentStatus) -> bool {
        match self {
            EquipmentStatus::Open => matches!(
                next,
                EquipmentStatus::Ordered | EquipmentStatus::Rejected
            ),
            EquipmentStatus::Ordered => matches!(next, EquipmentStatus::Delivered),
            EquipmentStatus::Delivered | EquipmentStatus::Rejected => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EquipmentRequest {
    pub id: i64,
    pub account_id: i64,
    pub property_id: i64,
    pub item: String,
    pub quantity: i64,
    pub urgency: Urgency,
    pub status: EquipmentStatus,
    pub requested_by: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct EquipmentRequestInput {
    pub property_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub item: String,
    #[validate(range(min = 1, max = 1000))]
    pub quantity: i64,
    pub urgency: Urgency,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equipment_transitions() {
        assert!(EquipmentStatus::Open.can_transition_to(EquipmentStatus::Ordered));
        assert!(EquipmentStatus::Open.can_transition_to(EquipmentStatus::Rejected));
        assert!(!EquipmentStatus::Open.can_transition_to(EquipmentStatus::Delivered));
        assert!(EquipmentStatus::Ordered.can_transition_to(EquipmentStatus::Delivered));
        assert!(!EquipmentStatus::Delivered.can_transition_to(EquipmentStatus::Open));
        assert!(!EquipmentStatus::Rejected.can_transition_to(EquipmentStatus::Open));
    }
}
