use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::slot::overlaps_minutes;
use crate::models::{Booking, Court, Slot};

/// `[start - buffer, end + buffer)` around an existing booking, in minutes.
fn buffer_zone(booking: &Booking, buffer_minutes: i32) -> (i32, i32) {
    let buffer = buffer_minutes.max(0);
    (
        booking.start_time.minutes() - buffer,
        booking.end_time.minutes() + buffer,
    )
}

fn blocks_slot(booking: &Booking, exclude_booking_id: Option<i64>) -> bool {
    !booking.is_cancelled() && Some(booking.id) != exclude_booking_id
}

/// Drops every candidate that touches an existing booking or its buffer.
///
/// The buffer applies on both sides of each booking regardless of who owns it;
/// the own-booking exception only applies to explicit requests, see
/// [`find_conflict`].
pub fn available_slots(
    candidates: &[Slot],
    bookings: &[Booking],
    buffer_minutes: i32,
    exclude_booking_id: Option<i64>,
) -> Vec<Slot> {
    let zones: Vec<(i32, i32)> = bookings
        .iter()
        .filter(|b| blocks_slot(b, exclude_booking_id))
        .map(|b| buffer_zone(b, buffer_minutes))
        .collect();

    candidates
        .iter()
        .filter(|slot| {
            !zones.iter().any(|(zone_start, zone_end)| {
                overlaps_minutes(slot.start.minutes(), slot.end.minutes(), *zone_start, *zone_end)
            })
        })
        .copied()
        .collect()
}

/// True when `requested` only reaches into the buffer of a booking that the
/// acting client owns. Clients may chain their own bookings back to back; the
/// buffer only protects the next client.
pub fn is_own_adjacent_booking(existing: &Booking, requested: &Slot, acting_user_id: Option<i64>) -> bool {
    acting_user_id == Some(existing.client_id) && !existing.interval().overlaps(requested)
}

/// Validates one requested interval against the bookings of its court/day.
/// Returns a message describing the first conflicting window, if any.
pub fn find_conflict(
    requested: &Slot,
    bookings: &[Booking],
    buffer_minutes: i32,
    acting_user_id: Option<i64>,
    exclude_booking_id: Option<i64>,
) -> Option<String> {
    for booking in bookings.iter().filter(|b| blocks_slot(b, exclude_booking_id)) {
        let existing = booking.interval();
        if existing.overlaps(requested) {
            return Some(format!(
                "The court is already booked from {} to {}.",
                existing.start, existing.end
            ));
        }

        if buffer_minutes <= 0 {
            continue;
        }
        let (zone_start, zone_end) = buffer_zone(booking, buffer_minutes);
        let in_buffer = overlaps_minutes(
            requested.start.minutes(),
            requested.end.minutes(),
            zone_start,
            zone_end,
        );
        if in_buffer && !is_own_adjacent_booking(booking, requested, acting_user_id) {
            return Some(format!(
                "The requested time is within the {buffer_minutes} minute buffer around the booking from {} to {}.",
                existing.start, existing.end
            ));
        }
    }
    None
}

pub fn check_availability(
    conn: &Connection,
    court: &Court,
    date: NaiveDate,
    requested: &Slot,
    acting_user_id: Option<i64>,
    exclude_booking_id: Option<i64>,
) -> anyhow::Result<Option<String>> {
    let bookings = queries::get_active_bookings_for_court(conn, court.id, date)?;
    Ok(find_conflict(
        requested,
        &bookings,
        court.buffer_minutes(),
        acting_user_id,
        exclude_booking_id,
    ))
}
