use actix_web::{delete, get, post, put, web, HttpRequest, Responder};
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::equipment::{EquipmentRequestInput, EquipmentStatus};
use crate::domain::pagination::PageRequest;

#[derive(Deserialize)]
pub struct EquipmentListQuery {
    pub property_id: Option<i64>,
    pub status: Option<EquipmentStatus>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct SetStatusRequest {
    pub status: EquipmentStatus,
}

#[post("/equipment-requests")]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<EquipmentRequestInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.equipment.create(&ctx, body.into_inner()).await)
}

#[get("/equipment-requests")]
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<EquipmentListQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    respond(
        state
            .equipment
            .list(&ctx, query.property_id, query.status, &page)
            .await,
    )
}

#[get("/equipment-requests/{id}")]
pub async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.equipment.get(&ctx, path.into_inner()).await)
}

#[put("/equipment-requests/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<EquipmentRequestInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .equipment
            .update(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

#[delete("/equipment-requests/{id}")]
pub async fn delete(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.equipment.delete(&ctx, path.into_inner()).await)
}

#[post("/equipment-requests/{id}/status")]
pub async fn set_status(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SetStatusRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .equipment
            .set_status(&ctx, path.into_inner(), body.status)
            .await,
    )
}
