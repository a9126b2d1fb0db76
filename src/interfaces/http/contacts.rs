use actix_web::{delete, get, post, put, web, HttpRequest, Responder};
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::contact::{ContactInput, ContactKind};
use crate::domain::pagination::PageRequest;

#[derive(Deserialize)]
pub struct ContactListQuery {
    pub kind: Option<ContactKind>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[post("/contacts")]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ContactInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.contacts.create(&ctx, body.into_inner()).await)
}

#[get("/contacts")]
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<ContactListQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    respond(state.contacts.list(&ctx, query.kind, &page).await)
}

#[get("/contacts/{id}")]
pub async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.contacts.get(&ctx, path.into_inner()).await)
}

#[put("/contacts/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<ContactInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .contacts
            .update(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

#[delete("/contacts/{id}")]
pub async fn delete(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.contacts.delete(&ctx, path.into_inner()).await)
}
