use actix_web::{get, post, web, HttpRequest, Responder};
use bigdecimal::BigDecimal;
use chrono::NaiveDate;
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::booking::{
    AvailabilityRequestInput, AvailabilityStatus, BookingFilter, BookingInput, BookingStatus,
};
use crate::domain::pagination::PageRequest;

#[derive(Deserialize)]
pub struct BookingListQuery {
    pub property_id: Option<i64>,
    pub status: Option<BookingStatus>,
    pub from: Option<NaiveDate>,
    pub until: Option<NaiveDate>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: BookingStatus,
}

#[derive(Deserialize)]
pub struct SetTotalRequest {
    pub total_amount: BigDecimal,
}

#[derive(Deserialize)]
pub struct AvailabilityListQuery {
    pub status: Option<AvailabilityStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct SetAvailabilityStatusRequest {
    pub status: AvailabilityStatus,
}

#[post("/bookings")]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<BookingInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.bookings.create(&ctx, body.into_inner()).await)
}

#[get("/bookings")]
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<BookingListQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let filter = BookingFilter {
        property_id: query.property_id,
        status: query.status,
        from: query.from,
        until: query.until,
    };
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    respond(state.bookings.list(&ctx, &filter, &page).await)
}

#[get("/bookings/{id}")]
pub async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.bookings.get(&ctx, path.into_inner()).await)
}

#[post("/bookings/{id}/status")]
pub async fn set_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SetStatusRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .bookings
            .set_status(&ctx, path.into_inner(), body.status)
            .await,
    )
}

#[post("/bookings/{id}/total")]
pub async fn set_total(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SetTotalRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .bookings
            .set_total_amount(&ctx, path.into_inner(), body.into_inner().total_amount)
            .await,
    )
}

// ---- availability requests ----

#[post("/availability-requests")]
pub async fn create_availability(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<AvailabilityRequestInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .bookings
            .create_availability_request(&ctx, body.into_inner())
            .await,
    )
}

#[get("/availability-requests")]
pub async fn list_availability(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<AvailabilityListQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    respond(
        state
            .bookings
            .list_availability_requests(&ctx, query.status, &page)
            .await,
    )
}

#[post("/availability-requests/{id}/status")]
pub async fn set_availability_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SetAvailabilityStatusRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .bookings
            .set_availability_status(&ctx, path.into_inner(), body.status)
            .await,
    )
}
