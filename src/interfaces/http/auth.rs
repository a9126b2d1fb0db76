use actix_web::{delete, get, post, put, web, HttpRequest, Responder};
use serde::Deserialize;

use super::{require_ctx, respond, AppState};
use crate::domain::auth::Role;

#[derive(Deserialize)]
pub struct BootstrapRequest {
    pub account_name: String,
    pub admin_email: String,
    pub admin_name: String,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub email: String,
    pub display_name: String,
    pub role: Role,
}

#[derive(Deserialize)]
pub struct SetRoleRequest {
    pub role: Role,
}

/// First-run entry point; creates the account and its admin.
#[post("/auth/bootstrap")]
pub async fn bootstrap(
    state: web::Data<AppState>,
    body: web::Json<BootstrapRequest>,
) -> impl Responder {
    respond(
        state
            .auth
            .bootstrap_account(&body.account_name, &body.admin_email, &body.admin_name)
            .await,
    )
}

#[post("/auth/rotate")]
pub async fn rotate_token(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.auth.rotate_token(&ctx).await)
}

#[post("/users")]
pub async fn create_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    body: web::Json<CreateUserRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(
        state
            .auth
            .create_user(&ctx, &body.email, &body.display_name, body.role)
            .await,
    )
}

#[get("/users")]
pub async fn list_users(state: web::Data<AppState>, req: HttpRequest) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.auth.list_users(&ctx).await)
}

#[put("/users/{id}/role")]
pub async fn set_role(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
    body: web::Json<SetRoleRequest>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.auth.set_role(&ctx, path.into_inner(), body.role).await)
}

#[delete("/users/{id}")]
pub async fn deactivate_user(
    state: web::Data<AppState>,
    req: HttpRequest,
    path: web::Path<i64>,
) -> impl Responder {
    let ctx = require_ctx!(&state, &req);
    respond(state.auth.deactivate_user(&ctx, path.into_inner()).await)
}
