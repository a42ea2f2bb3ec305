use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CourtType {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    /// Slot length and booking granularity.
    pub interval_time_minutes: i32,
    /// Idle gap enforced between different clients' bookings.
    pub buffer_time_minutes: i32,
    pub price_per_interval: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Court {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub status: CourtStatus,
    pub court_type: CourtType,
}

impl Court {
    pub fn interval_minutes(&self) -> i32 {
        self.court_type.interval_time_minutes
    }

    pub fn buffer_minutes(&self) -> i32 {
        self.court_type.buffer_time_minutes
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CourtStatus {
    Active,
    Inactive,
}

impl CourtStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CourtStatus::Active => "active",
            CourtStatus::Inactive => "inactive",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s {
            "active" => CourtStatus::Active,
            _ => CourtStatus::Inactive,
        }
    }
}
