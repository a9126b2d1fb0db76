use actix_web::{delete, get, post, put, web, HttpRequest, Responder};

use super::{require_ctx, respond, AppState};
use crate::domain::destination::DestinationInput;
use crate::domain::pagination::PageRequest;

#[post("/destinations")]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<DestinationInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.destinations.create(&ctx, body.into_inner()).await)
}

#[get("/destinations")]
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PageRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.destinations.list(&ctx, &query).await)
}

#[get("/destinations/{id}")]
pub async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.destinations.get(&ctx, path.into_inner()).await)
}

#[put("/destinations/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<DestinationInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .destinations
            .update(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

#[delete("/destinations/{id}")]
pub async fn delete(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.destinations.delete(&ctx, path.into_inner()).await)
}
