use actix_web::{delete, get, post, put, web, HttpRequest, Responder};
use chrono::NaiveDate;
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::pricing::PricingRuleInput;

#[derive(Deserialize)]
pub struct QuoteQuery {
    pub property_id: i64,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
}

#[post("/pricing-rules")]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<PricingRuleInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.pricing.create(&ctx, body.into_inner()).await)
}

#[get("/pricing-rules/{id}")]
pub async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.pricing.get(&ctx, path.into_inner()).await)
}

#[put("/pricing-rules/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<PricingRuleInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .pricing
            .update(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

#[delete("/pricing-rules/{id}")]
pub async fn delete(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.pricing.delete(&ctx, path.into_inner()).await)
}

#[get("/properties/{id}/pricing-rules")]
pub async fn list_for_property(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.pricing.list_for_property(&ctx, path.into_inner()).await)
}

/// Price a stay with the narrowest covering rule.
#[get("/quote")]
pub async fn quote(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<QuoteQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .pricing
            .quote(&ctx, query.property_id, query.check_in, query.check_out)
            .await,
    )
}
