use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::HeaderMap;
use axum::Json;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{check_auth, load_tenant};
use crate::db::queries;
use crate::errors::AppError;
use crate::models::Slot;
use crate::services::availability;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
    /// Booking being edited; its own slot is reported as free.
    pub exclude_booking_id: Option<i64>,
}

#[derive(Serialize)]
pub struct AvailabilityResponse {
    court_id: i64,
    date: NaiveDate,
    slots: Vec<Slot>,
}

// GET /api/tenants/:tenant_id/courts/:court_id/availability
pub async fn get_availability(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path((tenant_id, court_id)): Path<(i64, i64)>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<AvailabilityResponse>, AppError> {
    check_auth(&headers, &state.config.api_token)?;

    let slots = {
        let db = state.conn()?;
        let tenant = load_tenant(&db, tenant_id)?;
        let court = queries::get_court(&db, court_id)?
            .filter(|c| c.tenant_id == tenant.id)
            .ok_or_else(|| AppError::NotFound(format!("court {court_id}")))?;
        availability::list_available_slots(&db, &court, query.date, query.exclude_booking_id)?
    };

    Ok(Json(AvailabilityResponse {
        court_id,
        date: query.date,
        slots,
    }))
}
