use bigdecimal::BigDecimal;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use std::str::FromStr;

use crate::domain::booking::{
    AvailabilityRequest, AvailabilityRequestInput, AvailabilityStatus, Booking, BookingFilter,
    BookingInput, BookingStatus,
};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};

#[derive(Clone)]
pub struct BookingRepository {
    pool: SqlitePool,
}

#[derive(sqlx::FromRow)]
struct BookingEntity {
    id: i64,
    account_id: i64,
    property_id: i64,
    guest_name: String,
    guest_email: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    guests: i64,
    status: String,
    total_amount: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl BookingEntity {
    fn into_domain(self) -> Result<Booking> {
        let status = BookingStatus::parse(&self.status).ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Unknown booking status '{}' for booking {}",
                self.status, self.id
            ))
        })?;
        let total_amount = self
            .total_amount
            .as_deref()
            .map(BigDecimal::from_str)
            .transpose()
            .map_err(|e| {
                AppError::DatabaseError(format!(
                    "Invalid total_amount on booking {}: {}",
                    self.id, e
                ))
            })?;
        Ok(Booking {
            id: self.id,
            account_id: self.account_id,
            property_id: self.property_id,
            guest_name: self.guest_name,
            guest_email: self.guest_email,
            check_in: self.check_in,
            check_out: self.check_out,
            guests: self.guests,
            status,
            total_amount,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AvailabilityEntity {
    id: i64,
    account_id: i64,
    property_id: i64,
    requester_name: String,
    requester_email: String,
    check_in: NaiveDate,
    check_out: NaiveDate,
    party_size: i64,
    message: Option<String>,
    status: String,
    created_at: DateTime<Utc>,
}

impl AvailabilityEntity {
    fn into_domain(self) -> Result<AvailabilityRequest> {
        let status = AvailabilityStatus::parse(&self.status).ok_or_else(|| {
            AppError::DatabaseError(format!(
                "Unknown availability status '{}' for request {}",
                self.status, self.id
            ))
        })?;
        Ok(AvailabilityRequest {
            id: self.id,
            account_id: self.account_id,
            property_id: self.property_id,
            requester_name: self.requester_name,
            requester_email: self.requester_email,
            check_in: self.check_in,
            check_out: self.check_out,
            party_size: self.party_size,
            message: self.message,
            status,
            created_at: self.created_at,
        })
    }
}

const FILTER_WHERE: &str = "account_id = ?1
    AND (?2 IS NULL OR property_id = ?2)
    AND (?3 IS NULL OR status = ?3)
    AND (?4 IS NULL OR check_in >= ?4)
    AND (?5 IS NULL OR check_in <= ?5)";

impl BookingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn create(&self, account_id: i64, input: &BookingInput) -> Result<Booking> {
        let entity = sqlx::query_as::<_, BookingEntity>(
            "INSERT INTO bookings
                (account_id, property_id, guest_name, guest_email,
                 check_in, check_out, guests, status, total_amount)
             VALUES (?, ?, ?, ?, ?, ?, ?, 'pending', ?) RETURNING *",
        )
        .bind(account_id)
        .bind(input.property_id)
        .bind(&input.guest_name)
        .bind(&input.guest_email)
        .bind(input.check_in)
        .bind(input.check_out)
        .bind(input.guests)
        .bind(input.total_amount.as_ref().map(|a| a.to_string()))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to create booking: {}", e)))?;

        entity.into_domain()
    }

    pub async fn get(&self, account_id: i64, id: i64) -> Result<Booking> {
        let entity = sqlx::query_as::<_, BookingEntity>(
            "SELECT * FROM bookings WHERE account_id = ? AND id = ?",
        )
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to fetch booking: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Booking not found: {}", id))),
        }
    }

    pub async fn list(
        &self,
        account_id: i64,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> Result<Page<Booking>> {
        let status = filter.status.map(|s| s.as_str().to_string());

        let count_sql = format!("SELECT COUNT(*) FROM bookings WHERE {}", FILTER_WHERE);
        let total: i64 = sqlx::query_scalar(&count_sql)
            .bind(account_id)
            .bind(filter.property_id)
            .bind(&status)
            .bind(filter.from)
            .bind(filter.until)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to count bookings: {}", e)))?;

        let list_sql = format!(
            "SELECT * FROM bookings WHERE {} ORDER BY check_in DESC LIMIT ?6 OFFSET ?7",
            FILTER_WHERE
        );
        let entities = sqlx::query_as::<_, BookingEntity>(&list_sql)
            .bind(account_id)
            .bind(filter.property_id)
            .bind(&status)
            .bind(filter.from)
            .bind(filter.until)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to list bookings: {}", e)))?;

        let items = entities
            .into_iter()
            .map(|e| e.into_domain())
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }

    pub async fn set_status(
        &self,
        account_id: i64,
        id: i64,
        status: BookingStatus,
    ) -> Result<Booking> {
        let entity = sqlx::query_as::<_, BookingEntity>(
            "UPDATE bookings SET status = ?, updated_at = CURRENT_TIMESTAMP
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update booking: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Booking not found: {}", id))),
        }
    }

    pub async fn set_total_amount(
        &self,
        account_id: i64,
        id: i64,
        total: &BigDecimal,
    ) -> Result<Booking> {
        let entity = sqlx::query_as::<_, BookingEntity>(
            "UPDATE bookings SET total_amount = ?, updated_at = CURRENT_TIMESTAMP
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(total.to_string())
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::DatabaseError(format!("Failed to update booking total: {}", e)))?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!("Booking not found: {}", id))),
        }
    }

    // ---- availability requests ----

    pub async fn create_availability_request(
        &self,
        account_id: i64,
        input: &AvailabilityRequestInput,
    ) -> Result<AvailabilityRequest> {
        let entity = sqlx::query_as::<_, AvailabilityEntity>(
            "INSERT INTO availability_requests
                (account_id, property_id, requester_name, requester_email,
                 check_in, check_out, party_size, message, status)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, 'new') RETURNING *",
        )
        .bind(account_id)
        .bind(input.property_id)
        .bind(&input.requester_name)
        .bind(&input.requester_email)
        .bind(input.check_in)
        .bind(input.check_out)
        .bind(input.party_size)
        .bind(&input.message)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to create availability request: {}", e))
        })?;

        entity.into_domain()
    }

    pub async fn list_availability_requests(
        &self,
        account_id: i64,
        status: Option<AvailabilityStatus>,
        page: &PageRequest,
    ) -> Result<Page<AvailabilityRequest>> {
        let status = status.map(|s| s.as_str().to_string());

        let total: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM availability_requests
             WHERE account_id = ?1 AND (?2 IS NULL OR status = ?2)",
        )
        .bind(account_id)
        .bind(&status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to count availability requests: {}", e))
        })?;

        let entities = sqlx::query_as::<_, AvailabilityEntity>(
            "SELECT * FROM availability_requests
             WHERE account_id = ?1 AND (?2 IS NULL OR status = ?2)
             ORDER BY created_at DESC LIMIT ?3 OFFSET ?4",
        )
        .bind(account_id)
        .bind(&status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to list availability requests: {}", e))
        })?;

        let items = entities
            .into_iter()
            .map(|e| e.into_domain())
            .collect::<Result<Vec<_>>>()?;
        Ok(Page::new(items, page, total))
    }

    pub async fn set_availability_status(
        &self,
        account_id: i64,
        id: i64,
        status: AvailabilityStatus,
    ) -> Result<AvailabilityRequest> {
        let entity = sqlx::query_as::<_, AvailabilityEntity>(
            "UPDATE availability_requests SET status = ?
             WHERE account_id = ? AND id = ? RETURNING *",
        )
        .bind(status.as_str())
        .bind(account_id)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::DatabaseError(format!("Failed to update availability request: {}", e))
        })?;

        match entity {
            Some(entity) => entity.into_domain(),
            None => Err(AppError::NotFound(format!(
                "Availability request not found: {}",
                id
            ))),
        }
    }
}
