use actix_web::{delete, get, post, put, web, HttpRequest, Responder};
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::activity::ActivityProviderInput;
use crate::domain::pagination::PageRequest;

#[derive(Deserialize)]
pub struct ActivityListQuery {
    pub destination_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[post("/activity-providers")]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ActivityProviderInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.activities.create(&ctx, body.into_inner()).await)
}

#[get("/activity-providers")]
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ActivityListQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    respond(
        state
            .activities
            .list(&ctx, query.destination_id, &page)
            .await,
    )
}

#[get("/activity-providers/{id}")]
pub async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.activities.get(&ctx, path.into_inner()).await)
}

#[put("/activity-providers/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ActivityProviderInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .activities
            .update(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

#[delete("/activity-providers/{id}")]
pub async fn delete(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.activities.delete(&ctx, path.into_inner()).await)
}
