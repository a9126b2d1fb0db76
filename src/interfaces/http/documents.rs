use actix_web::{delete, get, post, web, HttpRequest, HttpResponse, Responder};
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::legal_document::{LegalDocumentInput, VersionUpload};
use crate::domain::pagination::PageRequest;

#[derive(Deserialize)]
pub struct DocumentListQuery {
    pub property_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[post("/documents")]
pub async fn create(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<LegalDocumentInput>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.documents.create(&ctx, body.into_inner()).await)
}

#[get("/documents")]
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<DocumentListQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    respond(
        state
            .documents
            .list(&ctx, query.property_id, &page)
            .await,
    )
}

#[get("/documents/{id}")]
pub async fn get(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.documents.get(&ctx, path.into_inner()).await)
}

#[delete("/documents/{id}")]
pub async fn delete(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.documents.delete(&ctx, path.into_inner()).await)
}

#[post("/documents/{id}/versions")]
pub async fn upload_version(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<VersionUpload>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .documents
            .upload_version(&ctx, path.into_inner(), body.into_inner())
            .await,
    )
}

#[get("/documents/{id}/versions")]
pub async fn list_versions(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.documents.list_versions(&ctx, path.into_inner()).await)
}

/// Raw file bytes of one stored version.
#[get("/documents/{id}/versions/{version_id}/content")]
pub async fn version_content(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<(i64, i64)>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let (document_id, version_id) = path.into_inner();
    match state
        .documents
        .download_version(&ctx, document_id, version_id)
        .await
    {
        Ok((version, bytes)) => HttpResponse::Ok()
            .content_type("application/octet-stream")
            .insert_header((
                "Content-Disposition",
                format!("attachment; filename=\"{}\"", version.file_name),
            ))
            .body(bytes),
        Err(e) => super::failure(&e),
    }
}
