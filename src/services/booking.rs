use std::fmt::Debug;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use chrono_tz::Tz;
use rusqlite::{Connection, TransactionBehavior};

use crate::db::queries::{self, PresenceCutoff};
use crate::errors::AppError;
use crate::models::{
    AvailabilityRule, Booking, BookingFilters, BookingPatch, BookingSet, BookingStatus, Court,
    CourtStatus, CreateBooking, NewBooking, Page, PaymentMethod, PaymentStatus, Slot, Tenant,
    TimeOfDay,
};
use crate::services::availability;
use crate::services::conflict;
use crate::services::grouping::{self, block_span};
use crate::services::jobs::{BookingJob, JobQueue};

pub const MAX_PAGE_SIZE: u32 = 100;

/// Which API surface a booking came through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingSource {
    Business,
    Mobile,
}

/// "Now" as seen by one tenant. Dates and times in the store are the
/// tenant's wall clock; comparisons against the present go through here.
#[derive(Debug, Clone, Copy)]
pub struct TimeContext {
    pub now: DateTime<Utc>,
    pub timezone: Tz,
}

impl TimeContext {
    pub fn new(now: DateTime<Utc>, timezone: Tz) -> Self {
        Self { now, timezone }
    }

    pub fn local_now(&self) -> NaiveDateTime {
        self.now.with_timezone(&self.timezone).naive_local()
    }

    pub fn today(&self) -> NaiveDate {
        self.local_now().date()
    }

    pub fn time_of_day(&self) -> TimeOfDay {
        TimeOfDay::from_naive(self.local_now().time())
    }
}

// ── Commands ──

pub fn create(
    conn: &mut Connection,
    jobs: &dyn JobQueue,
    tenant: &Tenant,
    request: &CreateBooking,
    source: BookingSource,
) -> Result<BookingSet, AppError> {
    let created = create_in_transaction(conn, tenant, request, source)
        .inspect_err(|e| log_failure("create", tenant.id, None, request, e))?;

    tracing::info!(
        tenant_id = tenant.id,
        booking_id = created.booking.id,
        siblings = created.siblings.len(),
        source = ?source,
        "booking created"
    );

    for booking in created.all() {
        request_qr_code(jobs, booking);
    }
    enqueue(
        jobs,
        BookingJob::BookingCreated {
            tenant_id: tenant.id,
            booking_id: created.booking.id,
            client_id: created.booking.client_id,
        },
    );

    Ok(created)
}

fn create_in_transaction(
    conn: &mut Connection,
    tenant: &Tenant,
    request: &CreateBooking,
    source: BookingSource,
) -> Result<BookingSet, AppError> {
    validate_price(request.price)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let court = load_court(&tx, tenant, request.court_id)?;
    let client = queries::get_client(&tx, request.client_id)?.ok_or_else(|| {
        AppError::InvalidReference(format!("client {} does not exist", request.client_id))
    })?;

    let blocks = requested_blocks(
        request.start_time,
        request.end_time,
        request.slots.as_deref(),
        court.buffer_minutes(),
    )?;
    let priced_per_slot = has_slots(request.slots.as_deref());

    let (status, payment_status) = match source {
        BookingSource::Business => (
            request.status.unwrap_or(BookingStatus::Confirmed),
            request.payment_status.unwrap_or(PaymentStatus::Pending),
        ),
        BookingSource::Mobile if tenant.auto_confirm_bookings => {
            (BookingStatus::Confirmed, PaymentStatus::Pending)
        }
        BookingSource::Mobile => (BookingStatus::Pending, PaymentStatus::Pending),
    };

    let rules = availability::rules_for(&tx, &court, request.start_date)?;
    let mut created = Vec::with_capacity(blocks.len());

    for block in &blocks {
        let span = block_span(block).ok_or_else(|| AppError::Validation("empty slot block".to_string()))?;
        ensure_bookable(&tx, &court, &rules, request.start_date, &span, Some(client.id), None)?;

        let id = queries::insert_booking(
            &tx,
            &NewBooking {
                tenant_id: tenant.id,
                court_id: court.id,
                client_id: client.id,
                date: request.start_date,
                interval: span,
                price: block_price(block, priced_per_slot, request.price, &court)?,
                status,
                payment_status,
                payment_method: request.payment_method,
                qr_code: Some(uuid::Uuid::new_v4().to_string()),
            },
        )?;
        created.push(fetch(&tx, tenant.id, id)?);
    }

    queries::link_client_to_tenant(&tx, tenant.id, client.id)?;
    tx.commit()?;

    into_set(created)
}

pub fn update(
    conn: &mut Connection,
    jobs: &dyn JobQueue,
    tenant: &Tenant,
    booking_id: i64,
    patch: &BookingPatch,
) -> Result<BookingSet, AppError> {
    let updated = update_in_transaction(conn, tenant, booking_id, patch)
        .inspect_err(|e| log_failure("update", tenant.id, Some(booking_id), patch, e))?;

    tracing::info!(
        tenant_id = tenant.id,
        booking_id,
        siblings = updated.siblings.len(),
        "booking updated"
    );

    for sibling in &updated.siblings {
        request_qr_code(jobs, sibling);
    }

    Ok(updated)
}

fn update_in_transaction(
    conn: &mut Connection,
    tenant: &Tenant,
    booking_id: i64,
    patch: &BookingPatch,
) -> Result<BookingSet, AppError> {
    validate_price(patch.price)?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let mut booking = fetch(&tx, tenant.id, booking_id)?;
    if booking.is_frozen() {
        return Err(AppError::ImmutableBooking(
            "booking has been marked as attended and can no longer be modified".to_string(),
        ));
    }

    let court = match patch.court_id {
        Some(court_id) if court_id != booking.court_id => load_court(&tx, tenant, court_id)?,
        _ => tenant_court(&tx, tenant, booking.court_id)?,
    };
    let date = patch.start_date.unwrap_or(booking.start_date);
    let blocks = requested_blocks(
        Some(patch.start_time.unwrap_or(booking.start_time)),
        Some(patch.end_time.unwrap_or(booking.end_time)),
        patch.slots.as_deref(),
        court.buffer_minutes(),
    )?;
    let priced_per_slot = has_slots(patch.slots.as_deref());

    let (first, rest) = blocks
        .split_first()
        .ok_or_else(|| AppError::Validation("no slots supplied".to_string()))?;
    let first_span = block_span(first).ok_or_else(|| AppError::Validation("empty slot block".to_string()))?;

    let status = patch.status.unwrap_or(booking.status);
    let moved = court.id != booking.court_id || date != booking.start_date || first_span != booking.interval();
    let reactivated = booking.is_cancelled() && status != BookingStatus::Cancelled;
    let holds_slot = status != BookingStatus::Cancelled;

    let rules = availability::rules_for(&tx, &court, date)?;
    if holds_slot && (moved || reactivated) {
        ensure_bookable(&tx, &court, &rules, date, &first_span, Some(booking.client_id), Some(booking.id))?;
    }

    booking.court_id = court.id;
    booking.start_date = date;
    booking.end_date = date;
    booking.start_time = first_span.start;
    booking.end_time = first_span.end;
    booking.price = if priced_per_slot {
        block_price(first, true, patch.price, &court)?
    } else {
        patch.price.unwrap_or(booking.price)
    };
    booking.status = status;
    booking.payment_status = patch.payment_status.unwrap_or(booking.payment_status);
    booking.payment_method = patch.payment_method.or(booking.payment_method);
    booking.present = patch.present.or(booking.present);
    queries::update_booking(&tx, &booking)?;

    let mut siblings = Vec::with_capacity(rest.len());
    for block in rest {
        let span = block_span(block).ok_or_else(|| AppError::Validation("empty slot block".to_string()))?;
        if holds_slot {
            ensure_bookable(&tx, &court, &rules, date, &span, Some(booking.client_id), None)?;
        }
        let id = queries::insert_booking(
            &tx,
            &NewBooking {
                tenant_id: tenant.id,
                court_id: court.id,
                client_id: booking.client_id,
                date,
                interval: span,
                price: block_price(block, true, patch.price, &court)?,
                status: booking.status,
                payment_status: booking.payment_status,
                payment_method: booking.payment_method,
                qr_code: Some(uuid::Uuid::new_v4().to_string()),
            },
        )?;
        siblings.push(fetch(&tx, tenant.id, id)?);
    }

    let booking = fetch(&tx, tenant.id, booking.id)?;
    tx.commit()?;

    Ok(BookingSet { booking, siblings })
}

pub fn cancel(
    conn: &mut Connection,
    jobs: &dyn JobQueue,
    tenant: &Tenant,
    booking_id: i64,
    time: &TimeContext,
) -> Result<Booking, AppError> {
    let booking = cancel_in_transaction(conn, tenant, booking_id, time)
        .inspect_err(|e| log_failure("cancel", tenant.id, Some(booking_id), &booking_id, e))?;

    tracing::info!(tenant_id = tenant.id, booking_id, "booking cancelled");

    enqueue(
        jobs,
        BookingJob::DeleteQrCode {
            tenant_id: tenant.id,
            booking_id,
            qr_code: booking.qr_code.clone(),
        },
    );
    enqueue(
        jobs,
        BookingJob::BookingCancelled {
            tenant_id: tenant.id,
            booking_id,
            client_id: booking.client_id,
        },
    );

    Ok(booking)
}

fn cancel_in_transaction(
    conn: &mut Connection,
    tenant: &Tenant,
    booking_id: i64,
    time: &TimeContext,
) -> Result<Booking, AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let booking = fetch(&tx, tenant.id, booking_id)?;
    if booking.is_frozen() {
        return Err(AppError::ImmutableBooking(
            "booking has been marked as attended and can no longer be cancelled".to_string(),
        ));
    }
    if booking.is_cancelled() {
        return Err(AppError::AlreadyCancelled);
    }
    if booking.start_date < time.today() {
        return Err(AppError::PastBooking);
    }

    queries::update_booking_status(&tx, tenant.id, booking_id, BookingStatus::Cancelled)?;
    let booking = fetch(&tx, tenant.id, booking_id)?;
    tx.commit()?;

    Ok(booking)
}

pub fn delete(conn: &mut Connection, tenant: &Tenant, booking_id: i64) -> Result<(), AppError> {
    delete_in_transaction(conn, tenant, booking_id)
        .inspect_err(|e| log_failure("delete", tenant.id, Some(booking_id), &booking_id, e))?;

    tracing::info!(tenant_id = tenant.id, booking_id, "booking deleted");
    Ok(())
}

fn delete_in_transaction(conn: &mut Connection, tenant: &Tenant, booking_id: i64) -> Result<(), AppError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let booking = fetch(&tx, tenant.id, booking_id)?;
    if booking.is_frozen() {
        return Err(AppError::ImmutableBooking(
            "booking has been marked as attended and cannot be deleted".to_string(),
        ));
    }
    if booking.payment_method == Some(PaymentMethod::InApp) {
        return Err(AppError::ImmutableBooking(
            "bookings paid in the app must be cancelled instead of deleted".to_string(),
        ));
    }

    queries::delete_booking(&tx, tenant.id, booking_id)?;
    tx.commit()?;
    Ok(())
}

// ── Queries ──

pub fn get(conn: &Connection, tenant: &Tenant, booking_id: i64) -> Result<Booking, AppError> {
    fetch(conn, tenant.id, booking_id)
}

pub fn list(
    conn: &Connection,
    tenant: &Tenant,
    filters: &BookingFilters,
    default_page_size: u32,
) -> Result<Page<Booking>, AppError> {
    let (page, per_page) = page_bounds(filters, default_page_size);
    let (data, total) = queries::list_bookings(conn, tenant.id, filters, None, page, per_page)?;
    Ok(Page { data, total, page, per_page })
}

/// Bookings that have started (or ended) without being marked present.
pub fn pending_presence(
    conn: &Connection,
    tenant: &Tenant,
    filters: &BookingFilters,
    time: &TimeContext,
    default_page_size: u32,
) -> Result<Page<Booking>, AppError> {
    let (page, per_page) = page_bounds(filters, default_page_size);
    let cutoff = PresenceCutoff {
        today: time.today(),
        time: time.time_of_day(),
    };
    let (data, total) = queries::list_bookings(conn, tenant.id, filters, Some(cutoff), page, per_page)?;
    Ok(Page { data, total, page, per_page })
}

// ── Helpers ──

fn fetch(conn: &Connection, tenant_id: i64, booking_id: i64) -> Result<Booking, AppError> {
    queries::get_booking(conn, tenant_id, booking_id)?
        .ok_or_else(|| AppError::NotFound(format!("booking {booking_id}")))
}

fn tenant_court(conn: &Connection, tenant: &Tenant, court_id: i64) -> Result<Court, AppError> {
    let court = queries::get_court(conn, court_id)?
        .ok_or_else(|| AppError::NotFound(format!("court {court_id}")))?;
    if court.tenant_id != tenant.id {
        return Err(AppError::InvalidReference(format!(
            "court {court_id} does not belong to this tenant"
        )));
    }
    Ok(court)
}

/// Court a booking is being placed on: must belong to the tenant and be open for bookings.
fn load_court(conn: &Connection, tenant: &Tenant, court_id: i64) -> Result<Court, AppError> {
    let court = tenant_court(conn, tenant, court_id)?;
    if court.status != CourtStatus::Active {
        return Err(AppError::InvalidReference(format!("court {court_id} is not active")));
    }
    Ok(court)
}

fn has_slots(slots: Option<&[Slot]>) -> bool {
    slots.is_some_and(|s| !s.is_empty())
}

/// Turns either an explicit slot list or a single start/end pair into blocks.
fn requested_blocks(
    start: Option<TimeOfDay>,
    end: Option<TimeOfDay>,
    slots: Option<&[Slot]>,
    buffer_minutes: i32,
) -> Result<Vec<Vec<Slot>>, AppError> {
    if let Some(slots) = slots.filter(|s| !s.is_empty()) {
        validate_slots(slots)?;
        return Ok(grouping::group(slots, buffer_minutes));
    }

    match (start, end) {
        (Some(start), Some(end)) => {
            let slot = Slot::new(start, end);
            if !slot.is_valid() {
                return Err(AppError::Validation("end_time must be after start_time".to_string()));
            }
            Ok(vec![vec![slot]])
        }
        _ => Err(AppError::Validation(
            "either start_time and end_time or slots must be supplied".to_string(),
        )),
    }
}

fn validate_slots(slots: &[Slot]) -> Result<(), AppError> {
    if let Some(bad) = slots.iter().find(|s| !s.is_valid()) {
        return Err(AppError::Validation(format!("slot {bad} ends before it starts")));
    }
    let mut sorted = slots.to_vec();
    sorted.sort_by_key(|s| (s.start, s.end));
    if let Some(pair) = sorted.windows(2).find(|pair| pair[0].overlaps(&pair[1])) {
        return Err(AppError::Validation(format!(
            "slots {} and {} overlap",
            pair[0], pair[1]
        )));
    }
    Ok(())
}

/// Slot requests are priced per slot; a plain start/end request takes the
/// given price as the total, or charges every started interval.
fn block_price(
    block: &[Slot],
    priced_per_slot: bool,
    requested: Option<i64>,
    court: &Court,
) -> Result<i64, AppError> {
    let too_large = || AppError::Validation("price is too large".to_string());
    let per_interval = court.court_type.price_per_interval;

    if priced_per_slot {
        let slots = i64::try_from(block.len()).map_err(|_| too_large())?;
        return requested
            .unwrap_or(per_interval)
            .checked_mul(slots)
            .ok_or_else(too_large);
    }
    if let Some(total) = requested {
        return Ok(total);
    }
    let Some(span) = block_span(block) else {
        return Ok(0);
    };
    let interval = court.interval_minutes();
    let intervals = if interval > 0 {
        (span.duration_minutes() + interval - 1) / interval
    } else {
        1
    };
    per_interval.checked_mul(i64::from(intervals)).ok_or_else(too_large)
}

fn validate_price(price: Option<i64>) -> Result<(), AppError> {
    match price {
        Some(p) if p < 0 => Err(AppError::Validation("price must not be negative".to_string())),
        _ => Ok(()),
    }
}

fn ensure_bookable(
    conn: &Connection,
    court: &Court,
    rules: &[AvailabilityRule],
    date: NaiveDate,
    requested: &Slot,
    acting_user_id: Option<i64>,
    exclude_booking_id: Option<i64>,
) -> Result<(), AppError> {
    if !availability::within_opening_hours(rules, requested) {
        return Err(AppError::OutsideOpeningHours {
            hours: availability::describe_opening_hours(rules),
        });
    }
    if let Some(message) =
        conflict::check_availability(conn, court, date, requested, acting_user_id, exclude_booking_id)?
    {
        return Err(AppError::SlotConflict(message));
    }
    Ok(())
}

fn into_set(bookings: Vec<Booking>) -> Result<BookingSet, AppError> {
    let mut bookings = bookings.into_iter();
    let booking = bookings
        .next()
        .ok_or_else(|| AppError::Internal(anyhow::anyhow!("no booking rows were written")))?;
    Ok(BookingSet {
        booking,
        siblings: bookings.collect(),
    })
}

fn page_bounds(filters: &BookingFilters, default_page_size: u32) -> (u32, u32) {
    let page = filters.page.unwrap_or(1).max(1);
    let per_page = filters
        .per_page
        .unwrap_or(default_page_size)
        .clamp(1, MAX_PAGE_SIZE);
    (page, per_page)
}

fn request_qr_code(jobs: &dyn JobQueue, booking: &Booking) {
    if let Some(qr_code) = &booking.qr_code {
        enqueue(
            jobs,
            BookingJob::GenerateQrCode {
                tenant_id: booking.tenant_id,
                booking_id: booking.id,
                qr_code: qr_code.clone(),
            },
        );
    }
}

fn enqueue(jobs: &dyn JobQueue, job: BookingJob) {
    if let Err(e) = jobs.enqueue(job) {
        tracing::warn!(error = %e, "failed to enqueue booking job");
    }
}

fn log_failure<T: Debug>(
    operation: &'static str,
    tenant_id: i64,
    booking_id: Option<i64>,
    payload: &T,
    error: &AppError,
) {
    if error.is_unexpected() {
        tracing::error!(
            operation,
            tenant_id,
            booking_id = ?booking_id,
            payload = ?payload,
            error = %error,
            "booking operation failed"
        );
    } else {
        tracing::info!(
            operation,
            tenant_id,
            booking_id = ?booking_id,
            error = %error,
            "booking request rejected"
        );
    }
}
