use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
            BookingStatus::Completed => "completed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(BookingStatus::Pending),
            "confirmed" => Some(BookingStatus::Confirmed),
            "cancelled" => Some(BookingStatus::Cancelled),
            "completed" => Some(BookingStatus::Completed),
            _ => None,
        }
    }

    /// Whether a booking may move from `self` to `next`.
    ///
    /// Cancelled and completed bookings are terminal.
    pub fn can_transition_to(&self, next: BookingStatus) -> bool {
        match self {
            BookingStatus::Pending => matches!(
                next,
                BookingStatus::Confirmed | BookingStatus::Cancelled
            ),
            BookingStatus::Confirmed => matches!(
                next,
                BookingStatus::Cancelled | BookingStatus::Completed
            ),
            BookingStatus::Cancelled | BookingStatus::Completed => false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub account_id: i64,
    pub property_id: i64,
    pub guest_name: String,
    pub guest_email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: i64,
    pub status: BookingStatus,
    pub total_amount: Option<BigDecimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Booking {
    pub fn nights(&self) -> i64 {
        (self.check_out - self.check_in).num_days()
    }
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct BookingInput {
    pub property_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub guest_name: String,
    #[validate(email)]
    pub guest_email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, max = 100))]
    pub guests: i64,
    pub total_amount: Option<BigDecimal>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilter {
    pub property_id: Option<i64>,
    pub status: Option<BookingStatus>,
    /// Only bookings with a check-in on or after this date.
    pub from: Option<NaiveDate>,
    /// Only bookings with a check-in on or before this date.
    pub until: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AvailabilityStatus {
    New,
    Answered,
    Closed,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::New => "new",
            AvailabilityStatus::Answered => "answered",
            AvailabilityStatus::Closed => "closed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "new" => Some(AvailabilityStatus::New),
            "answered" => Some(AvailabilityStatus::Answered),
            "closed" => Some(AvailabilityStatus::Closed),
            _ => None,
        }
    }
}

/// Inbound inquiry about a stay window, before any booking exists.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvailabilityRequest {
    pub id: i64,
    pub account_id: i64,
    pub property_id: i64,
    pub requester_name: String,
    pub requester_email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub party_size: i64,
    pub message: Option<String>,
    pub status: AvailabilityStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AvailabilityRequestInput {
    pub property_id: i64,
    #[validate(length(min = 1, max = 200))]
    pub requester_name: String,
    #[validate(email)]
    pub requester_email: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    #[validate(range(min = 1, max = 100))]
    pub party_size: i64,
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states_cannot_revive() {
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Pending));
        assert!(!BookingStatus::Cancelled.can_transition_to(BookingStatus::Confirmed));
        assert!(!BookingStatus::Completed.can_transition_to(BookingStatus::Pending));
    }

    #[test]
    fn test_pending_transitions() {
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Confirmed));
        assert!(BookingStatus::Pending.can_transition_to(BookingStatus::Cancelled));
        assert!(!BookingStatus::Pending.can_transition_to(BookingStatus::Completed));
    }
}
