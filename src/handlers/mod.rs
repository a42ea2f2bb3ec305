pub mod availability;
pub mod bookings;
pub mod health;

use std::sync::Arc;

use axum::http::HeaderMap;
use axum::routing::{get, post};
use axum::Router;
use rusqlite::Connection;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::db::queries;
use crate::errors::AppError;
use crate::models::Tenant;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let business = Router::new()
        .route(
            "/courts/:court_id/availability",
            get(availability::get_availability),
        )
        .route(
            "/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/bookings/pending-presence",
            get(bookings::pending_presence),
        )
        .route(
            "/bookings/:booking_id",
            get(bookings::get_booking)
                .patch(bookings::update_booking)
                .delete(bookings::delete_booking),
        )
        .route(
            "/bookings/:booking_id/cancel",
            post(bookings::cancel_booking),
        );

    let mobile = Router::new()
        .route(
            "/courts/:court_id/availability",
            get(availability::get_availability),
        )
        .route("/bookings", post(bookings::create_mobile_booking));

    Router::new()
        .route("/health", get(health::health))
        .nest("/api/tenants/:tenant_id", business)
        .nest("/api/mobile/tenants/:tenant_id", mobile)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

fn check_auth(headers: &HeaderMap, expected_token: &str) -> Result<(), AppError> {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    let token = auth.strip_prefix("Bearer ").unwrap_or("");
    if token.is_empty() || token != expected_token {
        return Err(AppError::Unauthorized);
    }
    Ok(())
}

fn load_tenant(conn: &Connection, tenant_id: i64) -> Result<Tenant, AppError> {
    queries::get_tenant(conn, tenant_id)?.ok_or_else(|| AppError::NotFound(format!("tenant {tenant_id}")))
}
