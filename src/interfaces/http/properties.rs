use actix_web::{delete, get, post, put, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::pagination::PageRequest;
use crate::domain::property::{
    PhotoUpload, PropertyFilter, PropertyInput, PropertyStatus, PropertyUpdate, RoomInput,
};

#[derive(Deserialize)]
pub struct PropertyListQuery {
    pub status: Option<PropertyStatus>,
    pub destination_id: Option<i64>,
    pub city: Option<String>,
    pub query: Option<String>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[derive(Deserialize)]
pub struct SetContactsRequest {
    pub contact_ids: Vec<i64>,
}

#[post("/properties")]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<PropertyInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.properties.create(&ctx, body.into_inner()).await)
}

#[get("/properties")]
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<PropertyListQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let filter = PropertyFilter {
        status: query.status,
        destination_id: query.destination_id,
        city: query.city.clone(),
        query: query.query.clone(),
    };
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    respond(state.properties.list(&ctx, &filter, &page).await)
}

#[get("/properties/{id}")]
pub async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.properties.get(&ctx, path.into_inner()).await)
}

#[put("/properties/{id}")]
pub async fn update(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<PropertyUpdate>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .properties
            .update(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

/// Soft delete; the property moves to archived.
#[delete("/properties/{id}")]
pub async fn archive(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.properties.archive(&ctx, path.into_inner()).await)
}

// ---- rooms ----

#[post("/properties/{id}/rooms")]
pub async fn add_room(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<RoomInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .properties
            .add_room(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

#[get("/properties/{id}/rooms")]
pub async fn list_rooms(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.properties.list_rooms(&ctx, path.into_inner()).await)
}

#[put("/properties/{id}/rooms/{room_id}")]
pub async fn update_room(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
    body: web::Json<RoomInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let (property_id, room_id) = path.into_inner();
    respond(
        state
            .properties
            .update_room(&ctx, property_id, room_id, body.into_inner())
            .await,
    )
}

#[delete("/properties/{id}/rooms/{room_id}")]
pub async fn delete_room(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let (property_id, room_id) = path.into_inner();
    respond(state.properties.delete_room(&ctx, property_id, room_id).await)
}

// ---- photos ----

#[post("/properties/{id}/photos")]
pub async fn add_photo(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<PhotoUpload>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .properties
            .add_photo(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

#[get("/properties/{id}/photos")]
pub async fn list_photos(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.properties.list_photos(&ctx, path.into_inner()).await)
}

/// Raw image bytes. Failures still use the JSON envelope.
#[get("/properties/{id}/photos/{photo_id}/content")]
pub async fn photo_content(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let (property_id, photo_id) = path.into_inner();
    match state
        .properties
        .get_photo_content(&ctx, property_id, photo_id)
        .await
    {
        Ok(bytes) => HttpResponse::Ok()
            .content_type("application/octet-stream")
            .body(bytes),
        Err(e) => super::failure(&e),
    }
}

#[delete("/properties/{id}/photos/{photo_id}")]
pub async fn delete_photo(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let (property_id, photo_id) = path.into_inner();
    respond(state.properties.delete_photo(&ctx, property_id, photo_id).await)
}

// ---- attached contacts ----

#[put("/properties/{id}/contacts")]
pub async fn set_contacts(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SetContactsRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .properties
            .set_contacts(&ctx, path.into_inner(), body.into_inner().contact_ids)
            .await,
    )
}

#[get("/properties/{id}/contacts")]
pub async fn list_contacts(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.properties.list_contacts(&ctx, path.into_inner()).await)
}
