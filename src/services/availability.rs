use chrono::NaiveDate;
use rusqlite::Connection;

use crate::db::queries;
use crate::models::{AvailabilityRule, Court, Slot};
use crate::services::{conflict, slots};

/// Rules governing `court` on `date`.
///
/// Levels, most specific first: specific date for the court, its court type,
/// the tenant; then recurring weekday for the same three scopes. The first
/// level with an opening supplies every opening on that level. Blackouts from
/// that level and any more specific one are returned alongside them.
pub fn rules_for(conn: &Connection, court: &Court, date: NaiveDate) -> anyhow::Result<Vec<AvailabilityRule>> {
    let candidates = queries::get_candidate_rules(conn, court, date)?;
    Ok(resolve_rules(court, date, candidates))
}

pub fn resolve_rules(court: &Court, date: NaiveDate, candidates: Vec<AvailabilityRule>) -> Vec<AvailabilityRule> {
    let applicable: Vec<AvailabilityRule> = candidates
        .into_iter()
        .filter(|r| r.tenant_id == court.tenant_id)
        .filter(|r| r.applies_to(court.id, court.court_type.id))
        .filter(|r| r.schedule.applies_on(date))
        .collect();

    let Some(opening_level) = applicable.iter().filter(|r| r.is_available).map(|r| r.level()).min() else {
        // Nothing opens the court; blackouts alone still resolve so callers
        // can tell "closed" from "unconfigured".
        return applicable.into_iter().filter(|r| !r.is_available).collect();
    };

    let mut resolved: Vec<AvailabilityRule> = applicable
        .into_iter()
        .filter(|r| {
            if r.is_available {
                r.level() == opening_level
            } else {
                r.level() <= opening_level
            }
        })
        .collect();
    resolved.sort_by_key(|r| (r.window.start, r.window.end, r.id));
    resolved
}

/// Whether every minute of `requested` is open: covered by an opening minus
/// its breaks, and clear of every blackout. Openings that touch or overlap
/// count as one stretch. Courts with no resolved rules are unrestricted.
pub fn within_opening_hours(rules: &[AvailabilityRule], requested: &Slot) -> bool {
    if rules.is_empty() {
        return true;
    }
    if rules.iter().any(|r| !r.is_available && r.window.overlaps(requested)) {
        return false;
    }
    let (start, end) = (requested.start.minutes(), requested.end.minutes());
    open_stretches(rules)
        .iter()
        .any(|(open_start, open_end)| *open_start <= start && end <= *open_end)
}

/// Openings with their breaks cut out, sorted and merged, in minutes.
fn open_stretches(rules: &[AvailabilityRule]) -> Vec<(i32, i32)> {
    let mut pieces: Vec<(i32, i32)> = vec![];
    for rule in rules.iter().filter(|r| r.is_available) {
        let mut breaks: Vec<(i32, i32)> = rule
            .breaks
            .iter()
            .map(|b| (b.start.minutes(), b.end.minutes()))
            .collect();
        breaks.sort_unstable();

        let window_end = rule.window.end.minutes();
        let mut cursor = rule.window.start.minutes();
        for (break_start, break_end) in breaks {
            if break_start > cursor {
                pieces.push((cursor, break_start.min(window_end)));
            }
            cursor = cursor.max(break_end);
        }
        if cursor < window_end {
            pieces.push((cursor, window_end));
        }
    }
    pieces.retain(|(start, end)| start < end);
    pieces.sort_unstable();

    let mut merged: Vec<(i32, i32)> = vec![];
    for (start, end) in pieces {
        match merged.last_mut() {
            Some(last) if start <= last.1 => last.1 = last.1.max(end),
            _ => merged.push((start, end)),
        }
    }
    merged
}

pub fn describe_opening_hours(rules: &[AvailabilityRule]) -> String {
    let windows: Vec<String> = rules
        .iter()
        .filter(|r| r.is_available)
        .map(|r| r.window.to_string())
        .collect();
    if windows.is_empty() {
        "closed".to_string()
    } else {
        windows.join(", ")
    }
}

/// Bookable slots for `court` on `date`, optionally ignoring the booking being edited.
pub fn list_available_slots(
    conn: &Connection,
    court: &Court,
    date: NaiveDate,
    exclude_booking_id: Option<i64>,
) -> anyhow::Result<Vec<Slot>> {
    let rules = rules_for(conn, court, date)?;
    let candidates = slots::generate(&rules, court.interval_minutes());
    let bookings = queries::get_active_bookings_for_court(conn, court.id, date)?;

    let free = conflict::available_slots(&candidates, &bookings, court.buffer_minutes(), exclude_booking_id);

    tracing::debug!(
        court_id = court.id,
        date = %date,
        candidates = candidates.len(),
        free = free.len(),
        "computed availability"
    );

    Ok(free)
}
