use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use chrono::Utc;

use super::{check_auth, load_tenant};
use crate::errors::AppError;
use crate::models::{Booking, BookingFilters, BookingPatch, BookingSet, CreateBooking, Page};
use crate::services::booking::{self, BookingSource, TimeContext};
use crate::state::AppState;

// GET /api/tenants/:tenant_id/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<i64>,
    Query(filters): Query<BookingFilters>,
) -> Result<Json<Page<Booking>>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let page = {
        let db = state.conn()?;
        let tenant = load_tenant(&db, tenant_id)?;
        booking::list(&db, &tenant, &filters, state.config.default_page_size)?
    };

    Ok(Json(page))
}

// GET /api/tenants/:tenant_id/bookings/pending-presence
pub async fn pending_presence(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<i64>,
    Query(filters): Query<BookingFilters>,
) -> Result<Json<Page<Booking>>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let page = {
        let db = state.conn()?;
        let tenant = load_tenant(&db, tenant_id)?;
        let time = TimeContext::new(Utc::now(), tenant.tz()?);
        booking::pending_presence(&db, &tenant, &filters, &time, state.config.default_page_size)?
    };

    Ok(Json(page))
}

// GET /api/tenants/:tenant_id/bookings/:booking_id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((tenant_id, booking_id)): Path<(i64, i64)>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let found = {
        let db = state.conn()?;
        let tenant = load_tenant(&db, tenant_id)?;
        booking::get(&db, &tenant, booking_id)?
    };

    Ok(Json(found))
}

// POST /api/tenants/:tenant_id/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<i64>,
    Json(request): Json<CreateBooking>,
) -> Result<(StatusCode, Json<BookingSet>), AppError> {
    create_from(&state, &headers, tenant_id, &request, BookingSource::Business)
}

// POST /api/mobile/tenants/:tenant_id/bookings
pub async fn create_mobile_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(tenant_id): Path<i64>,
    Json(request): Json<CreateBooking>,
) -> Result<(StatusCode, Json<BookingSet>), AppError> {
    create_from(&state, &headers, tenant_id, &request, BookingSource::Mobile)
}

fn create_from(
    state: &AppState,
    headers: &HeaderMap,
    tenant_id: i64,
    request: &CreateBooking,
    source: BookingSource,
) -> Result<(StatusCode, Json<BookingSet>), AppError> {
    check_auth(headers, &state.config.api_token)?;

    let created = {
        let mut db = state.conn()?;
        let tenant = load_tenant(&db, tenant_id)?;
        booking::create(&mut db, state.jobs.as_ref(), &tenant, request, source)?
    };

    Ok((StatusCode::CREATED, Json(created)))
}

// PATCH /api/tenants/:tenant_id/bookings/:booking_id
pub async fn update_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((tenant_id, booking_id)): Path<(i64, i64)>,
    Json(patch): Json<BookingPatch>,
) -> Result<Json<BookingSet>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let updated = {
        let mut db = state.conn()?;
        let tenant = load_tenant(&db, tenant_id)?;
        booking::update(&mut db, state.jobs.as_ref(), &tenant, booking_id, &patch)?
    };

    Ok(Json(updated))
}

// POST /api/tenants/:tenant_id/bookings/:booking_id/cancel
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((tenant_id, booking_id)): Path<(i64, i64)>,
) -> Result<Json<Booking>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let cancelled = {
        let mut db = state.conn()?;
        let tenant = load_tenant(&db, tenant_id)?;
        let time = TimeContext::new(Utc::now(), tenant.tz()?);
        booking::cancel(&mut db, state.jobs.as_ref(), &tenant, booking_id, &time)?
    };

    Ok(Json(cancelled))
}

// DELETE /api/tenants/:tenant_id/bookings/:booking_id
pub async fn delete_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((tenant_id, booking_id)): Path<(i64, i64)>,
) -> Result<StatusCode, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    {
        let mut db = state.conn()?;
        let tenant = load_tenant(&db, tenant_id)?;
        booking::delete(&mut db, &tenant, booking_id)?;
    }

    Ok(StatusCode::NO_CONTENT)
}
