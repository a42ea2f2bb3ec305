use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::slot::{Slot, TimeOfDay};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: i64,
    pub tenant_id: i64,
    pub court_id: i64,
    pub client_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub start_time: TimeOfDay,
    pub end_time: TimeOfDay,
    /// Minor currency units.
    pub price: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    /// `None` until attendance is checked.
    pub present: Option<bool>,
    pub qr_code: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Booking {
    pub fn interval(&self) -> Slot {
        Slot::new(self.start_time, self.end_time)
    }

    /// Attended bookings can no longer be changed or removed.
    pub fn is_frozen(&self) -> bool {
        self.present == Some(true)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "pending",
            BookingStatus::Confirmed => "confirmed",
            BookingStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "confirmed" => BookingStatus::Confirmed,
            "cancelled" => BookingStatus::Cancelled,
            _ => BookingStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Refunded,
    Failed,
    PartiallyPaid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Refunded => "refunded",
            PaymentStatus::Failed => "failed",
            PaymentStatus::PartiallyPaid => "partially_paid",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "paid" => PaymentStatus::Paid,
            "refunded" => PaymentStatus::Refunded,
            "failed" => PaymentStatus::Failed,
            "partially_paid" => PaymentStatus::PartiallyPaid,
            _ => PaymentStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    Cash,
    Card,
    BankTransfer,
    /// Paid through the mobile app; such bookings keep their payment trail.
    InApp,
}

impl PaymentMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Card => "card",
            PaymentMethod::BankTransfer => "bank_transfer",
            PaymentMethod::InApp => "in_app",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "cash" => Some(PaymentMethod::Cash),
            "card" => Some(PaymentMethod::Card),
            "bank_transfer" => Some(PaymentMethod::BankTransfer),
            "in_app" => Some(PaymentMethod::InApp),
            _ => None,
        }
    }
}

/// Row to insert; ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub tenant_id: i64,
    pub court_id: i64,
    pub client_id: i64,
    pub date: NaiveDate,
    pub interval: Slot,
    pub price: i64,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub payment_method: Option<PaymentMethod>,
    pub qr_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateBooking {
    pub court_id: i64,
    pub client_id: i64,
    pub start_date: NaiveDate,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub slots: Option<Vec<Slot>>,
    pub price: Option<i64>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BookingPatch {
    pub court_id: Option<i64>,
    pub start_date: Option<NaiveDate>,
    pub start_time: Option<TimeOfDay>,
    pub end_time: Option<TimeOfDay>,
    pub slots: Option<Vec<Slot>>,
    pub price: Option<i64>,
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub payment_method: Option<PaymentMethod>,
    pub present: Option<bool>,
}

/// One logical request may produce several rows: `booking` is the primary
/// row, `siblings` the extra blocks split off it.
#[derive(Debug, Clone, Serialize)]
pub struct BookingSet {
    pub booking: Booking,
    pub siblings: Vec<Booking>,
}

impl BookingSet {
    pub fn all(&self) -> impl Iterator<Item = &Booking> {
        std::iter::once(&self.booking).chain(self.siblings.iter())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingFilters {
    pub status: Option<BookingStatus>,
    pub payment_status: Option<PaymentStatus>,
    pub date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub court_id: Option<i64>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: i64,
    pub page: u32,
    pub per_page: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_strings_round_trip_through_storage_names() {
        for status in [BookingStatus::Pending, BookingStatus::Confirmed, BookingStatus::Cancelled] {
            assert_eq!(BookingStatus::parse(status.as_str()), status);
        }
        assert_eq!(PaymentStatus::parse("partially_paid"), PaymentStatus::PartiallyPaid);
        assert_eq!(PaymentMethod::parse("in_app"), Some(PaymentMethod::InApp));
        assert_eq!(PaymentMethod::parse("bitcoin"), None);
    }

    #[test]
    fn test_create_request_accepts_slots() {
        let json = r#"{
            "court_id": 1,
            "client_id": 2,
            "start_date": "2025-06-16",
            "slots": [{"start":"10:00","end":"11:00"},{"start":"11:10","end":"12:10"}],
            "payment_method": "in_app"
        }"#;
        let req: CreateBooking = serde_json::from_str(json).unwrap();
        assert_eq!(req.slots.as_ref().map(Vec::len), Some(2));
        assert_eq!(req.payment_method, Some(PaymentMethod::InApp));
        assert!(req.start_time.is_none());
    }
}
