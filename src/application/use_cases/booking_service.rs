//! Booking lifecycle and availability request actions.

use std::sync::Arc;
use validator::Validate;

use crate::domain::auth::AuthContext;
use crate::domain::booking::{
    AvailabilityRequest, AvailabilityRequestInput, AvailabilityStatus, Booking, BookingFilter,
    BookingInput, BookingStatus,
};
use crate::domain::error::{AppError, Result};
use crate::domain::pagination::{Page, PageRequest};
use crate::infrastructure::db::repositories::{BookingRepository, PropertyRepository};

use super::audit_service::AuditService;
use super::permissions::{self, ops};

pub struct BookingService {
    bookings: Arc<BookingRepository>,
    properties: Arc<PropertyRepository>,
    audit: Arc<AuditService>,
}

impl BookingService {
    pub fn new(
        bookings: Arc<BookingRepository>,
        properties: Arc<PropertyRepository>,
        audit: Arc<AuditService>,
    ) -> Self {
        Self {
            bookings,
            properties,
            audit,
        }
    }

    pub async fn create(&self, ctx: &AuthContext, input: BookingInput) -> Result<Booking> {
        permissions::require(ctx, ops::BOOKINGS_CREATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        if input.check_out <= input.check_in {
            return Err(AppError::ValidationError(
                "Check-out must be after check-in".to_string(),
            ));
        }

        // Tenant check on the target property.
        self.properties.get(ctx.account_id, input.property_id).await?;

        let booking = self.bookings.create(ctx.account_id, &input).await?;
        self.audit
            .record(
                ctx,
                "booking",
                booking.id,
                "create",
                Some(&serde_json::json!({
                    "property_id": booking.property_id,
                    "check_in": booking.check_in,
                    "check_out": booking.check_out,
                })),
            )
            .await;
        Ok(booking)
    }

    pub async fn get(&self, ctx: &AuthContext, id: i64) -> Result<Booking> {
        permissions::require(ctx, ops::BOOKINGS_VIEW)?;
        self.bookings.get(ctx.account_id, id).await
    }

    pub async fn list(
        &self,
        ctx: &AuthContext,
        filter: &BookingFilter,
        page: &PageRequest,
    ) -> Result<Page<Booking>> {
        permissions::require(ctx, ops::BOOKINGS_VIEW)?;
        self.bookings.list(ctx.account_id, filter, page).await
    }

    /// Move a booking along its lifecycle. Illegal transitions are
    /// rejected before anything is written.
    pub async fn set_status(
        &self,
        ctx: &AuthContext,
        id: i64,
        next: BookingStatus,
    ) -> Result<Booking> {
        permissions::require(ctx, ops::BOOKINGS_UPDATE)?;

        let current = self.bookings.get(ctx.account_id, id).await?;
        if !current.status.can_transition_to(next) {
            return Err(AppError::ValidationError(format!(
                "Cannot move booking from '{}' to '{}'",
                current.status.as_str(),
                next.as_str()
            )));
        }

        let booking = self.bookings.set_status(ctx.account_id, id, next).await?;
        self.audit
            .record(
                ctx,
                "booking",
                id,
                "set_status",
                Some(&serde_json::json!({
                    "from": current.status,
                    "to": next,
                })),
            )
            .await;
        Ok(booking)
    }

    pub async fn set_total_amount(
        &self,
        ctx: &AuthContext,
        id: i64,
        total: bigdecimal::BigDecimal,
    ) -> Result<Booking> {
        permissions::require(ctx, ops::BOOKINGS_UPDATE)?;
        if total < bigdecimal::BigDecimal::from(0) {
            return Err(AppError::ValidationError(
                "Booking total cannot be negative".to_string(),
            ));
        }
        let booking = self.bookings.set_total_amount(ctx.account_id, id, &total).await?;
        self.audit
            .record(
                ctx,
                "booking",
                id,
                "set_total_amount",
                Some(&serde_json::json!({ "total": total.to_string() })),
            )
            .await;
        Ok(booking)
    }

    // ---- availability requests ----

    pub async fn create_availability_request(
        &self,
        ctx: &AuthContext,
        input: AvailabilityRequestInput,
    ) -> Result<AvailabilityRequest> {
        permissions::require(ctx, ops::AVAILABILITY_CREATE)?;
        input
            .validate()
            .map_err(|e| AppError::ValidationError(e.to_string()))?;
        if input.check_out <= input.check_in {
            return Err(AppError::ValidationError(
                "Check-out must be after check-in".to_string(),
            ));
        }

        self.properties.get(ctx.account_id, input.property_id).await?;
        let request = self
            .bookings
            .create_availability_request(ctx.account_id, &input)
            .await?;
        self.audit
            .record(ctx, "availability_request", request.id, "create", None)
            .await;
        Ok(request)
    }

    pub async fn list_availability_requests(
        &self,
        ctx: &AuthContext,
        status: Option<AvailabilityStatus>,
        page: &PageRequest,
    ) -> Result<Page<AvailabilityRequest>> {
        permissions::require(ctx, ops::AVAILABILITY_VIEW)?;
        self.bookings
            .list_availability_requests(ctx.account_id, status, page)
            .await
    }

    pub async fn set_availability_status(
        &self,
        ctx: &AuthContext,
        id: i64,
        status: AvailabilityStatus,
    ) -> Result<AvailabilityRequest> {
        permissions::require(ctx, ops::AVAILABILITY_UPDATE)?;
        let request = self
            .bookings
            .set_availability_status(ctx.account_id, id, status)
            .await?;
        self.audit
            .record(
                ctx,
                "availability_request",
                id,
                "set_status",
                Some(&serde_json::json!({ "to": status })),
            )
            .await;
        Ok(request)
    }
}
