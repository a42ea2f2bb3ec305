use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Wall-clock time with minute granularity, stored as minutes since midnight.
/// `24:00` is accepted so a window can close at the end of the day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimeOfDay(u16);

impl TimeOfDay {
    pub const MIDNIGHT: TimeOfDay = TimeOfDay(0);
    pub const END_OF_DAY: TimeOfDay = TimeOfDay(24 * 60);

    pub fn from_minutes(minutes: i32) -> Option<Self> {
        if (0..=24 * 60).contains(&minutes) {
            Some(TimeOfDay(minutes as u16))
        } else {
            None
        }
    }

    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        if minute > 59 {
            return None;
        }
        Self::from_minutes((hour * 60 + minute) as i32)
    }

    pub fn minutes(self) -> i32 {
        i32::from(self.0)
    }

    pub fn from_naive(time: chrono::NaiveTime) -> Self {
        use chrono::Timelike;
        TimeOfDay((time.hour() * 60 + time.minute()) as u16)
    }

    /// Parses `HH:MM` or `HH:MM:SS` (seconds are dropped).
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.len() != 2 && parts.len() != 3 {
            return Err(anyhow::anyhow!("invalid time format: {s}"));
        }
        let hour: u32 = parts[0]
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid hour in: {s}"))?;
        let minute: u32 = parts[1]
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid minute in: {s}"))?;
        if parts.len() == 3 {
            let second: u32 = parts[2]
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid second in: {s}"))?;
            if second > 59 || (hour == 24 && second != 0) {
                return Err(anyhow::anyhow!("time out of range: {s}"));
            }
        }
        if hour > 24 || (hour == 24 && minute != 0) {
            return Err(anyhow::anyhow!("time out of range: {s}"));
        }
        Self::from_hm(hour, minute).ok_or_else(|| anyhow::anyhow!("time out of range: {s}"))
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.0 / 60, self.0 % 60)
    }
}

impl FromStr for TimeOfDay {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TimeOfDay::parse(s)
    }
}

impl Serialize for TimeOfDay {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for TimeOfDay {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TimeOfDay::parse(&s).map_err(serde::de::Error::custom)
    }
}

/// A half-open `[start, end)` interval of wall-clock time on one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Slot {
    pub start: TimeOfDay,
    pub end: TimeOfDay,
}

impl Slot {
    pub fn new(start: TimeOfDay, end: TimeOfDay) -> Self {
        Self { start, end }
    }

    pub fn duration_minutes(&self) -> i32 {
        self.end.minutes() - self.start.minutes()
    }

    pub fn is_valid(&self) -> bool {
        self.start < self.end
    }

    pub fn overlaps(&self, other: &Slot) -> bool {
        overlaps_minutes(
            self.start.minutes(),
            self.end.minutes(),
            other.start.minutes(),
            other.end.minutes(),
        )
    }

    pub fn contains(&self, other: &Slot) -> bool {
        self.start <= other.start && other.end <= self.end
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

/// Half-open overlap on raw minute offsets. Offsets may leave `0..=1440`
/// once a buffer has been applied.
pub fn overlaps_minutes(a_start: i32, a_end: i32, b_start: i32, b_end: i32) -> bool {
    a_start < b_end && a_end > b_start
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!(t("08:05").minutes(), 485);
        assert_eq!(t("08:05:00").to_string(), "08:05");
        assert_eq!(t("24:00"), TimeOfDay::END_OF_DAY);
        assert_eq!(t("00:00"), TimeOfDay::MIDNIGHT);
    }

    #[test]
    fn test_parse_rejects_out_of_range() {
        assert!(TimeOfDay::parse("25:00").is_err());
        assert!(TimeOfDay::parse("24:30").is_err());
        assert!(TimeOfDay::parse("10:60").is_err());
        assert!(TimeOfDay::parse("10").is_err());
        assert!(TimeOfDay::parse("ab:cd").is_err());
    }

    #[test]
    fn test_slot_serde_uses_hh_mm() {
        let slot = Slot::new(t("10:00"), t("11:30"));
        let json = serde_json::to_string(&slot).unwrap();
        assert_eq!(json, r#"{"start":"10:00","end":"11:30"}"#);
        let back: Slot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, slot);
    }

    #[test]
    fn test_overlap_is_half_open() {
        let a = Slot::new(t("10:00"), t("11:00"));
        assert!(!a.overlaps(&Slot::new(t("11:00"), t("12:00"))));
        assert!(!a.overlaps(&Slot::new(t("09:00"), t("10:00"))));
        assert!(a.overlaps(&Slot::new(t("10:59"), t("12:00"))));
        assert!(a.overlaps(&Slot::new(t("09:00"), t("12:00"))));
    }
}
