use actix_web::{get, web, HttpRequest, Responder};
use serde::Deserialize;

use super::{require_ctx, respond, AppState};

const DEFAULT_LIMIT: usize = 20;
const MAX_LIMIT: usize = 100;

#[derive(Deserialize)]
pub struct SearchQuery {
    pub q: String,
    pub limit: Option<usize>,
}

/// Fuzzy name search across properties and contacts.
#[get("/search")]
pub async fn search(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<SearchQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let limit = query.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
    respond(state.search.search(&ctx, &query.q, limit).await)
}
