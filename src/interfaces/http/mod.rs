//! JSON API over the back-office actions.
//!
//! Every action responds 200 with a `{ success, data | error }`
//! envelope; transport problems are the only thing surfaced through
//! HTTP status codes. Authentication is a bearer token resolved per
//! request, and failures of any kind land in the envelope.

mod activities;
mod audit;
mod auth;
mod bookings;
mod contacts;
mod destinations;
mod documents;
mod equipment;
mod imports;
mod pricing;
mod properties;
mod search;

use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{dev::Server, web, App, HttpRequest, HttpResponse, HttpServer};
use serde::Serialize;
use serde_json::json;
use tracing::info;

use crate::application::{
    ActivityService, AuditService, AuthService, BookingService, ContactService, CsvImportService,
    DestinationService, DocumentService, EquipmentService, PricingService, PropertyService,
    SearchService,
};
use crate::domain::auth::AuthContext;
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::AppConfig;

pub struct AppState {
    pub auth: AuthService,
    pub destinations: DestinationService,
    pub properties: PropertyService,
    pub bookings: BookingService,
    pub contacts: ContactService,
    pub documents: DocumentService,
    pub equipment: EquipmentService,
    pub pricing: PricingService,
    pub activities: ActivityService,
    pub search: SearchService,
    pub imports: CsvImportService,
    pub audit: std::sync::Arc<AuditService>,
}

/// Resolve the caller from the Authorization header.
pub(crate) async fn authenticate(state: &AppState, req: &HttpRequest) -> Result<AuthContext> {
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;
    state.auth.authenticate(token).await
}

pub(crate) fn respond<T: Serialize>(result: Result<T>) -> HttpResponse {
    match result {
        Ok(data) => HttpResponse::Ok().json(json!({ "success": true, "data": data })),
        Err(e) => failure(&e),
    }
}

pub(crate) fn failure(e: &AppError) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "success": false, "error": e.to_string() }))
}

/// Every handler starts by resolving the caller; this cuts the
/// boilerplate of doing it by hand.
macro_rules! require_ctx {
    ($state:expr, $req:expr) => {
        match crate::interfaces::http::authenticate($state, $req).await {
            Ok(ctx) => ctx,
            Err(e) => return crate::interfaces::http::failure(&e),
        }
    };
}
pub(crate) use require_ctx;

pub fn start_server(config: &AppConfig, state: AppState) -> std::io::Result<Server> {
    let state = web::Data::new(state);
    let permissive_cors = config.permissive_cors;

    info!(host = %config.host, port = config.port, "Starting HTTP server");

    let server = HttpServer::new(move || {
        let cors = if permissive_cors {
            Cors::permissive()
        } else {
            Cors::default()
                .allowed_methods(["GET", "POST", "PUT", "DELETE"])
                .allow_any_header()
        };

        App::new().wrap(cors).app_data(state.clone()).service(
            web::scope("/api")
                .service(auth::bootstrap)
                .service(auth::rotate_token)
                .service(auth::create_user)
                .service(auth::list_users)
                .service(auth::set_role)
                .service(auth::deactivate_user)
                .service(destinations::create)
                .service(destinations::list)
                .service(destinations::get)
                .service(destinations::update)
                .service(destinations::delete)
                .service(properties::create)
                .service(properties::list)
                .service(properties::get)
                .service(properties::update)
                .service(properties::archive)
                .service(properties::add_room)
                .service(properties::list_rooms)
                .service(properties::update_room)
                .service(properties::delete_room)
                .service(properties::add_photo)
                .service(properties::list_photos)
                .service(properties::photo_content)
                .service(properties::delete_photo)
                .service(properties::set_contacts)
                .service(properties::list_contacts)
                .service(bookings::create)
                .service(bookings::list)
                .service(bookings::get)
                .service(bookings::set_status)
                .service(bookings::set_total)
                .service(bookings::create_availability)
                .service(bookings::list_availability)
                .service(bookings::set_availability_status)
                .service(contacts::create)
                .service(contacts::list)
                .service(contacts::get)
                .service(contacts::update)
                .service(contacts::delete)
                .service(documents::create)
                .service(documents::list)
                .service(documents::get)
                .service(documents::delete)
                .service(documents::upload_version)
                .service(documents::list_versions)
                .service(documents::version_content)
                .service(equipment::create)
                .service(equipment::list)
                .service(equipment::get)
                .service(equipment::update)
                .service(equipment::delete)
                .service(equipment::set_status)
                .service(pricing::create)
                .service(pricing::get)
                .service(pricing::update)
                .service(pricing::delete)
                .service(pricing::list_for_property)
                .service(pricing::quote)
                .service(activities::create)
                .service(activities::list)
                .service(activities::get)
                .service(activities::update)
                .service(activities::delete)
                .service(imports::analyze)
                .service(imports::commit)
                .service(search::search)
                .service(audit::list)
                .service(audit::clear_old),
        )
    })
    .bind((config.host.as_str(), config.port))?
    .run();

    Ok(server)
}
