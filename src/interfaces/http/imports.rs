use actix_web::{post, web, HttpRequest, Responder};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use std::collections::HashMap;

use super::{failure, require_ctx, respond, AppState};
use crate::domain::csv::TargetField;
use crate::domain::error::AppError;

#[derive(Deserialize)]
pub struct ImportRequest {
    /// Base64-encoded file content.
    pub content_base64: String,
    /// Manual header assignments that override the auto-mapper.
    #[serde(default)]
    pub mapping: HashMap<TargetField, String>,
}

fn decode(body: &ImportRequest) -> Result<Vec<u8>, AppError> {
    BASE64
        .decode(&body.content_base64)
        .map_err(|e| AppError::ValidationError(format!("Invalid base64 content: {}", e)))
}

/// Dry run: returns the mapping preview and per-row errors without
/// writing anything.
#[post("/imports/contacts/analyze")]
pub async fn analyze(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ImportRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let bytes = match decode(&body) {
        Ok(bytes) => bytes,
        Err(e) => return failure(&e),
    };
    respond(state.imports.analyze(&ctx, &bytes, &body.mapping).await)
}

#[post("/imports/contacts")]
pub async fn commit(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<ImportRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let bytes = match decode(&body) {
        Ok(bytes) => bytes,
        Err(e) => return failure(&e),
    };
    respond(state.imports.commit(&ctx, &bytes, &body.mapping).await)
}
