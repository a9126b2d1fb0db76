use actix_web::{delete, get, web, HttpRequest, Responder};
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::audit::AuditFilter;
use crate::domain::pagination::PageRequest;

#[derive(Deserialize)]
pub struct AuditListQuery {
    pub entity_type: Option<String>,
    pub actor_id: Option<i64>,
    pub page: Option<i64>,
    pub per_page: Option<i64>,
}

#[get("/audit-logs")]
pub async fn list(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<AuditListQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let filter = AuditFilter {
        entity_type: query.entity_type.clone(),
        actor_id: query.actor_id,
    };
    let page = PageRequest {
        page: query.page,
        per_page: query.per_page,
    };
    respond(state.audit.list(&ctx, &filter, &page).await)
}

#[derive(Deserialize)]
pub struct RetentionQuery {
    pub days_old: Option<i32>,
}

#[delete("/audit-logs")]
pub async fn clear_old(
    state: web::Data<AppState>,
    req: HttpRequest,
    query: web::Query<RetentionQuery>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    let days_old = query.days_old.unwrap_or(365).max(1);
    respond(state.audit.clear_old_logs(&ctx, days_old).await)
}
