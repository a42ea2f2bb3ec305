use chrono::{NaiveDate, NaiveDateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::models::availability::{parse_weekday, weekday_name};
use crate::models::{
    AvailabilityRule, Booking, BookingFilters, BookingStatus, Breaks, Client, Court, CourtStatus,
    CourtType, NewBooking, PaymentMethod, PaymentStatus, RuleSchedule, RuleScope, Slot, Tenant,
    TimeOfDay,
};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ── Tenants ──

pub fn insert_tenant(
    conn: &Connection,
    name: &str,
    timezone: &str,
    auto_confirm_bookings: bool,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO tenants (name, timezone, auto_confirm_bookings) VALUES (?1, ?2, ?3)",
        params![name, timezone, auto_confirm_bookings],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_tenant(conn: &Connection, id: i64) -> anyhow::Result<Option<Tenant>> {
    let tenant = conn
        .query_row(
            "SELECT id, name, timezone, auto_confirm_bookings FROM tenants WHERE id = ?1",
            params![id],
            |row| {
                Ok(Tenant {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    timezone: row.get(2)?,
                    auto_confirm_bookings: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(tenant)
}

// ── Clients ──

pub fn insert_client(
    conn: &Connection,
    name: &str,
    email: Option<&str>,
    phone: Option<&str>,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO clients (name, email, phone) VALUES (?1, ?2, ?3)",
        params![name, email, phone],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_client(conn: &Connection, id: i64) -> anyhow::Result<Option<Client>> {
    let client = conn
        .query_row(
            "SELECT id, name, email, phone FROM clients WHERE id = ?1",
            params![id],
            |row| {
                Ok(Client {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    email: row.get(2)?,
                    phone: row.get(3)?,
                })
            },
        )
        .optional()?;
    Ok(client)
}

/// Idempotent.
pub fn link_client_to_tenant(conn: &Connection, tenant_id: i64, client_id: i64) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO tenant_clients (tenant_id, client_id) VALUES (?1, ?2)
         ON CONFLICT(tenant_id, client_id) DO NOTHING",
        params![tenant_id, client_id],
    )?;
    Ok(())
}

pub fn is_client_of_tenant(conn: &Connection, tenant_id: i64, client_id: i64) -> anyhow::Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM tenant_clients WHERE tenant_id = ?1 AND client_id = ?2",
        params![tenant_id, client_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

// ── Courts ──

pub fn insert_court_type(conn: &Connection, court_type: &CourtType) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO court_types (tenant_id, name, interval_time_minutes, buffer_time_minutes, price_per_interval)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            court_type.tenant_id,
            court_type.name,
            court_type.interval_time_minutes,
            court_type.buffer_time_minutes,
            court_type.price_per_interval,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn insert_court(
    conn: &Connection,
    tenant_id: i64,
    court_type_id: i64,
    name: &str,
    status: CourtStatus,
) -> anyhow::Result<i64> {
    conn.execute(
        "INSERT INTO courts (tenant_id, court_type_id, name, status) VALUES (?1, ?2, ?3, ?4)",
        params![tenant_id, court_type_id, name, status.as_str()],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_court(conn: &Connection, id: i64) -> anyhow::Result<Option<Court>> {
    let court = conn
        .query_row(
            "SELECT c.id, c.tenant_id, c.name, c.status,
                    t.id, t.tenant_id, t.name, t.interval_time_minutes, t.buffer_time_minutes, t.price_per_interval
             FROM courts c INNER JOIN court_types t ON t.id = c.court_type_id
             WHERE c.id = ?1",
            params![id],
            |row| {
                let status: String = row.get(3)?;
                Ok(Court {
                    id: row.get(0)?,
                    tenant_id: row.get(1)?,
                    name: row.get(2)?,
                    status: CourtStatus::parse(&status),
                    court_type: CourtType {
                        id: row.get(4)?,
                        tenant_id: row.get(5)?,
                        name: row.get(6)?,
                        interval_time_minutes: row.get(7)?,
                        buffer_time_minutes: row.get(8)?,
                        price_per_interval: row.get(9)?,
                    },
                })
            },
        )
        .optional()?;
    Ok(court)
}

// ── Availability Rules ──

pub fn insert_availability_rule(conn: &Connection, rule: &AvailabilityRule) -> anyhow::Result<i64> {
    let (court_id, court_type_id) = match rule.scope {
        RuleScope::Court(id) => (Some(id), None),
        RuleScope::CourtType(id) => (None, Some(id)),
        RuleScope::Tenant => (None, None),
    };
    let (day, specific_date) = match rule.schedule {
        RuleSchedule::Recurring(day) => (Some(weekday_name(day)), None),
        RuleSchedule::SpecificDate(date) => (None, Some(date.format(DATE_FORMAT).to_string())),
    };
    let breaks = Breaks(rule.breaks.clone()).to_json()?;

    conn.execute(
        "INSERT INTO availability_rules
            (tenant_id, court_id, court_type_id, day_of_week_recurring, specific_date, start_time, end_time, breaks, is_available)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            rule.tenant_id,
            court_id,
            court_type_id,
            day,
            specific_date,
            rule.window.start.to_string(),
            rule.window.end.to_string(),
            breaks,
            rule.is_available,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Every rule that could apply to `court` on `date`, at any resolution level.
pub fn get_candidate_rules(
    conn: &Connection,
    court: &Court,
    date: NaiveDate,
) -> anyhow::Result<Vec<AvailabilityRule>> {
    let mut stmt = conn.prepare(
        "SELECT id, tenant_id, court_id, court_type_id, day_of_week_recurring, specific_date,
                start_time, end_time, breaks, is_available
         FROM availability_rules
         WHERE tenant_id = ?1
           AND (court_id = ?2 OR court_type_id = ?3 OR (court_id IS NULL AND court_type_id IS NULL))
           AND (specific_date = ?4 OR day_of_week_recurring IS NOT NULL)
         ORDER BY start_time ASC, id ASC",
    )?;

    let rows = stmt.query_map(
        params![
            court.tenant_id,
            court.id,
            court.court_type.id,
            date.format(DATE_FORMAT).to_string()
        ],
        |row| Ok(parse_rule_row(row)),
    )?;

    let mut rules = vec![];
    for row in rows {
        let rule = row??;
        if rule.schedule.applies_on(date) {
            rules.push(rule);
        }
    }
    Ok(rules)
}

fn parse_rule_row(row: &rusqlite::Row) -> anyhow::Result<AvailabilityRule> {
    let id: i64 = row.get(0)?;
    let tenant_id: i64 = row.get(1)?;
    let court_id: Option<i64> = row.get(2)?;
    let court_type_id: Option<i64> = row.get(3)?;
    let day: Option<String> = row.get(4)?;
    let specific_date: Option<String> = row.get(5)?;
    let start_str: String = row.get(6)?;
    let end_str: String = row.get(7)?;
    let breaks_json: String = row.get(8)?;
    let is_available: bool = row.get(9)?;

    let scope = match (court_id, court_type_id) {
        (Some(id), _) => RuleScope::Court(id),
        (None, Some(id)) => RuleScope::CourtType(id),
        (None, None) => RuleScope::Tenant,
    };
    let schedule = match (specific_date, day) {
        (Some(date), _) => RuleSchedule::SpecificDate(NaiveDate::parse_from_str(&date, DATE_FORMAT)?),
        (None, Some(day)) => RuleSchedule::Recurring(parse_weekday(&day)?),
        (None, None) => return Err(anyhow::anyhow!("availability rule {id} has no schedule")),
    };

    Ok(AvailabilityRule {
        id,
        tenant_id,
        scope,
        schedule,
        window: Slot::new(TimeOfDay::parse(&start_str)?, TimeOfDay::parse(&end_str)?),
        breaks: Breaks::from_json(&breaks_json)?.0,
        is_available,
    })
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "b.id, b.tenant_id, b.court_id, b.client_id, b.start_date, b.end_date, b.start_time, b.end_time, \
     b.price, b.status, b.payment_status, b.payment_method, b.present, b.qr_code, b.created_at, b.updated_at";

pub fn insert_booking(conn: &Connection, booking: &NewBooking) -> anyhow::Result<i64> {
    let date = booking.date.format(DATE_FORMAT).to_string();
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();

    conn.execute(
        "INSERT INTO bookings (tenant_id, court_id, client_id, start_date, end_date, start_time, end_time,
                               price, status, payment_status, payment_method, qr_code, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?12)",
        params![
            booking.tenant_id,
            booking.court_id,
            booking.client_id,
            date,
            booking.interval.start.to_string(),
            booking.interval.end.to_string(),
            booking.price,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.payment_method.map(|m| m.as_str()),
            booking.qr_code,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Tenant-scoped lookup.
pub fn get_booking(conn: &Connection, tenant_id: i64, id: i64) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings b WHERE b.id = ?1 AND b.tenant_id = ?2"),
        params![id, tenant_id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Non-cancelled bookings occupying `court_id` on `date`, earliest first.
pub fn get_active_bookings_for_court(
    conn: &Connection,
    court_id: i64,
    date: NaiveDate,
) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings b
         WHERE b.court_id = ?1 AND b.start_date = ?2 AND b.status != 'cancelled'
         ORDER BY b.start_time ASC, b.id ASC"
    ))?;

    let rows = stmt.query_map(params![court_id, date.format(DATE_FORMAT).to_string()], |row| {
        Ok(parse_booking_row(row))
    })?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

pub fn update_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET
            court_id = ?1, start_date = ?2, end_date = ?3, start_time = ?4, end_time = ?5,
            price = ?6, status = ?7, payment_status = ?8, payment_method = ?9, present = ?10,
            updated_at = ?11
         WHERE id = ?12 AND tenant_id = ?13",
        params![
            booking.court_id,
            booking.start_date.format(DATE_FORMAT).to_string(),
            booking.end_date.format(DATE_FORMAT).to_string(),
            booking.start_time.to_string(),
            booking.end_time.to_string(),
            booking.price,
            booking.status.as_str(),
            booking.payment_status.as_str(),
            booking.payment_method.map(|m| m.as_str()),
            booking.present,
            now,
            booking.id,
            booking.tenant_id,
        ],
    )?;
    Ok(count > 0)
}

pub fn update_booking_status(
    conn: &Connection,
    tenant_id: i64,
    id: i64,
    status: BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TIMESTAMP_FORMAT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3 AND tenant_id = ?4",
        params![status.as_str(), now, id, tenant_id],
    )?;
    Ok(count > 0)
}

pub fn delete_booking(conn: &Connection, tenant_id: i64, id: i64) -> anyhow::Result<bool> {
    let count = conn.execute(
        "DELETE FROM bookings WHERE id = ?1 AND tenant_id = ?2",
        params![id, tenant_id],
    )?;
    Ok(count > 0)
}

/// Local "now" used by the pending-presence predicate.
#[derive(Debug, Clone, Copy)]
pub struct PresenceCutoff {
    pub today: NaiveDate,
    pub time: TimeOfDay,
}

pub fn list_bookings(
    conn: &Connection,
    tenant_id: i64,
    filters: &BookingFilters,
    presence_cutoff: Option<PresenceCutoff>,
    page: u32,
    per_page: u32,
) -> anyhow::Result<(Vec<Booking>, i64)> {
    let mut clauses: Vec<String> = vec!["b.tenant_id = ?".to_string()];
    let mut params_vec: Vec<Box<dyn rusqlite::types::ToSql>> = vec![Box::new(tenant_id)];

    if let Some(status) = filters.status {
        clauses.push("b.status = ?".to_string());
        params_vec.push(Box::new(status.as_str()));
    }
    if let Some(payment_status) = filters.payment_status {
        clauses.push("b.payment_status = ?".to_string());
        params_vec.push(Box::new(payment_status.as_str()));
    }
    if let Some(date) = filters.date {
        clauses.push("b.start_date = ?".to_string());
        params_vec.push(Box::new(date.format(DATE_FORMAT).to_string()));
    }
    if let Some(start) = filters.start_date {
        clauses.push("b.start_date >= ?".to_string());
        params_vec.push(Box::new(start.format(DATE_FORMAT).to_string()));
    }
    if let Some(end) = filters.end_date {
        clauses.push("b.start_date <= ?".to_string());
        params_vec.push(Box::new(end.format(DATE_FORMAT).to_string()));
    }
    if let Some(court_id) = filters.court_id {
        clauses.push("b.court_id = ?".to_string());
        params_vec.push(Box::new(court_id));
    }
    if let Some(search) = filters.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        clauses.push("c.name LIKE ? ESCAPE '\\'".to_string());
        params_vec.push(Box::new(format!("%{}%", escape_like(search))));
    }
    if let Some(cutoff) = presence_cutoff {
        let today = cutoff.today.format(DATE_FORMAT).to_string();
        let time = cutoff.time.to_string();
        clauses.push(
            "(b.present IS NULL OR b.present = 0) AND b.status != 'cancelled' AND \
             (b.start_date < ? OR (b.start_date = ? AND b.start_time < ?) OR (b.end_date = ? AND b.end_time < ?))"
                .to_string(),
        );
        params_vec.push(Box::new(today.clone()));
        params_vec.push(Box::new(today.clone()));
        params_vec.push(Box::new(time.clone()));
        params_vec.push(Box::new(today));
        params_vec.push(Box::new(time));
    }

    let where_sql = clauses.join(" AND ");
    let from_sql = "FROM bookings b INNER JOIN clients c ON c.id = b.client_id";

    let params_refs: Vec<&dyn rusqlite::types::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
    let total: i64 = conn.query_row(
        &format!("SELECT COUNT(*) {from_sql} WHERE {where_sql}"),
        params_refs.as_slice(),
        |row| row.get(0),
    )?;

    let offset = i64::from(page.saturating_sub(1)) * i64::from(per_page);
    let sql = format!(
        "SELECT {BOOKING_COLUMNS} {from_sql} WHERE {where_sql}
         ORDER BY b.start_date ASC, b.start_time ASC, b.id ASC LIMIT {per_page} OFFSET {offset}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok((bookings, total))
}

/// Makes `%` and `_` in user input match literally.
fn escape_like(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for ch in s.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let start_date: String = row.get(4)?;
    let end_date: String = row.get(5)?;
    let start_time: String = row.get(6)?;
    let end_time: String = row.get(7)?;
    let status: String = row.get(9)?;
    let payment_status: String = row.get(10)?;
    let payment_method: Option<String> = row.get(11)?;
    let created_at: String = row.get(14)?;
    let updated_at: String = row.get(15)?;

    Ok(Booking {
        id: row.get(0)?,
        tenant_id: row.get(1)?,
        court_id: row.get(2)?,
        client_id: row.get(3)?,
        start_date: NaiveDate::parse_from_str(&start_date, DATE_FORMAT)?,
        end_date: NaiveDate::parse_from_str(&end_date, DATE_FORMAT)?,
        start_time: TimeOfDay::parse(&start_time)?,
        end_time: TimeOfDay::parse(&end_time)?,
        price: row.get(8)?,
        status: BookingStatus::parse(&status),
        payment_status: PaymentStatus::parse(&payment_status),
        payment_method: payment_method.as_deref().and_then(PaymentMethod::parse),
        present: row.get(12)?,
        qr_code: row.get(13)?,
        created_at: NaiveDateTime::parse_from_str(&created_at, TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| Utc::now().naive_utc()),
        updated_at: NaiveDateTime::parse_from_str(&updated_at, TIMESTAMP_FORMAT)
            .unwrap_or_else(|_| Utc::now().naive_utc()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use chrono::Weekday;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, DATE_FORMAT).unwrap()
    }

    fn seed_court(conn: &Connection) -> Court {
        let tenant_id = insert_tenant(conn, "Club", "UTC", true).unwrap();
        let type_id = insert_court_type(
            conn,
            &CourtType {
                id: 0,
                tenant_id,
                name: "Padel".to_string(),
                interval_time_minutes: 60,
                buffer_time_minutes: 10,
                price_per_interval: 2000,
            },
        )
        .unwrap();
        let court_id = insert_court(conn, tenant_id, type_id, "Court 1", CourtStatus::Active).unwrap();
        get_court(conn, court_id).unwrap().unwrap()
    }

    #[test]
    fn test_get_court_joins_court_type() {
        let conn = db::init_db(":memory:").unwrap();
        let court = seed_court(&conn);
        assert_eq!(court.name, "Court 1");
        assert_eq!(court.interval_minutes(), 60);
        assert_eq!(court.buffer_minutes(), 10);
        assert!(get_court(&conn, 999).unwrap().is_none());
    }

    #[test]
    fn test_rule_round_trip_and_date_matching() {
        let conn = db::init_db(":memory:").unwrap();
        let court = seed_court(&conn);
        let rule = AvailabilityRule {
            id: 0,
            tenant_id: court.tenant_id,
            scope: RuleScope::CourtType(court.court_type.id),
            schedule: RuleSchedule::Recurring(Weekday::Mon),
            window: Slot::new(t("08:00"), t("22:00")),
            breaks: vec![Slot::new(t("13:00"), t("14:00"))],
            is_available: true,
        };
        let id = insert_availability_rule(&conn, &rule).unwrap();

        // 2025-06-16 is a Monday
        let rules = get_candidate_rules(&conn, &court, date("2025-06-16")).unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0], AvailabilityRule { id, ..rule });

        let tuesday = get_candidate_rules(&conn, &court, date("2025-06-17")).unwrap();
        assert!(tuesday.is_empty());
    }

    #[test]
    fn test_active_bookings_skip_cancelled() {
        let conn = db::init_db(":memory:").unwrap();
        let court = seed_court(&conn);
        let client_id = insert_client(&conn, "Alice", None, None).unwrap();
        let new = |start: &str, end: &str| NewBooking {
            tenant_id: court.tenant_id,
            court_id: court.id,
            client_id,
            date: date("2025-06-16"),
            interval: Slot::new(t(start), t(end)),
            price: 2000,
            status: BookingStatus::Confirmed,
            payment_status: PaymentStatus::Pending,
            payment_method: None,
            qr_code: None,
        };
        let first = insert_booking(&conn, &new("10:00", "11:00")).unwrap();
        insert_booking(&conn, &new("08:00", "09:00")).unwrap();
        update_booking_status(&conn, court.tenant_id, first, BookingStatus::Cancelled).unwrap();

        let active = get_active_bookings_for_court(&conn, court.id, date("2025-06-16")).unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].start_time, t("08:00"));
        assert_eq!(active[0].end_date, date("2025-06-16"));
    }

    #[test]
    fn test_get_booking_is_tenant_scoped() {
        let conn = db::init_db(":memory:").unwrap();
        let court = seed_court(&conn);
        let client_id = insert_client(&conn, "Alice", None, None).unwrap();
        let id = insert_booking(
            &conn,
            &NewBooking {
                tenant_id: court.tenant_id,
                court_id: court.id,
                client_id,
                date: date("2025-06-16"),
                interval: Slot::new(t("10:00"), t("11:00")),
                price: 2000,
                status: BookingStatus::Pending,
                payment_status: PaymentStatus::Pending,
                payment_method: Some(PaymentMethod::Cash),
                qr_code: Some("qr-1".to_string()),
            },
        )
        .unwrap();

        let booking = get_booking(&conn, court.tenant_id, id).unwrap().unwrap();
        assert_eq!(booking.payment_method, Some(PaymentMethod::Cash));
        assert_eq!(booking.present, None);
        assert!(get_booking(&conn, court.tenant_id + 1, id).unwrap().is_none());
    }

    #[test]
    fn test_link_client_is_idempotent() {
        let conn = db::init_db(":memory:").unwrap();
        let tenant_id = insert_tenant(&conn, "Club", "UTC", false).unwrap();
        let client_id = insert_client(&conn, "Alice", Some("alice@example.com"), None).unwrap();
        link_client_to_tenant(&conn, tenant_id, client_id).unwrap();
        link_client_to_tenant(&conn, tenant_id, client_id).unwrap();
        assert!(is_client_of_tenant(&conn, tenant_id, client_id).unwrap());
        let tenant = get_tenant(&conn, tenant_id).unwrap().unwrap();
        assert!(!tenant.auto_confirm_bookings);
    }

    #[test]
    fn test_search_treats_wildcards_literally() {
        let conn = db::init_db(":memory:").unwrap();
        let court = seed_court(&conn);
        let plain = insert_client(&conn, "Ann Lee", None, None).unwrap();
        let odd = insert_client(&conn, "50%_off Club", None, None).unwrap();
        for (client_id, start, end) in [(plain, "08:00", "09:00"), (odd, "10:00", "11:00")] {
            insert_booking(
                &conn,
                &NewBooking {
                    tenant_id: court.tenant_id,
                    court_id: court.id,
                    client_id,
                    date: date("2025-06-16"),
                    interval: Slot::new(t(start), t(end)),
                    price: 2000,
                    status: BookingStatus::Confirmed,
                    payment_status: PaymentStatus::Pending,
                    payment_method: None,
                    qr_code: None,
                },
            )
            .unwrap();
        }

        let search = |term: &str| {
            let filters = BookingFilters {
                search: Some(term.to_string()),
                ..Default::default()
            };
            let (bookings, total) = list_bookings(&conn, court.tenant_id, &filters, None, 1, 20).unwrap();
            assert_eq!(total as usize, bookings.len());
            bookings.iter().map(|b| b.client_id).collect::<Vec<_>>()
        };

        assert_eq!(search("%"), vec![odd]);
        assert_eq!(search("_"), vec![odd]);
        assert_eq!(search("n_L"), Vec::<i64>::new());
        assert_eq!(search("ann"), vec![plain]);
    }
}
