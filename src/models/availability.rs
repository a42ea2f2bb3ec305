use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

use super::slot::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleScope {
    Court(i64),
    CourtType(i64),
    Tenant,
}

impl RuleScope {
    /// Lower is more specific.
    pub fn rank(&self) -> u8 {
        match self {
            RuleScope::Court(_) => 0,
            RuleScope::CourtType(_) => 1,
            RuleScope::Tenant => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSchedule {
    Recurring(Weekday),
    SpecificDate(NaiveDate),
}

impl RuleSchedule {
    pub fn rank(&self) -> u8 {
        match self {
            RuleSchedule::SpecificDate(_) => 0,
            RuleSchedule::Recurring(_) => 1,
        }
    }

    pub fn applies_on(&self, date: NaiveDate) -> bool {
        match self {
            RuleSchedule::SpecificDate(d) => *d == date,
            RuleSchedule::Recurring(day) => date.weekday() == *day,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityRule {
    pub id: i64,
    pub tenant_id: i64,
    pub scope: RuleScope,
    pub schedule: RuleSchedule,
    pub window: Slot,
    pub breaks: Vec<Slot>,
    /// `false` marks a blackout (maintenance, closures) rather than an opening.
    pub is_available: bool,
}

impl AvailabilityRule {
    /// Resolution level: specific dates before recurring days, then court
    /// before court type before tenant-wide.
    pub fn level(&self) -> u8 {
        self.schedule.rank() * 3 + self.scope.rank()
    }

    pub fn applies_to(&self, court_id: i64, court_type_id: i64) -> bool {
        match self.scope {
            RuleScope::Court(id) => id == court_id,
            RuleScope::CourtType(id) => id == court_type_id,
            RuleScope::Tenant => true,
        }
    }

    pub fn break_overlaps(&self, slot: &Slot) -> bool {
        self.breaks.iter().any(|b| b.overlaps(slot))
    }
}

/// Break intervals are stored as a JSON array of `{start, end}` objects.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Breaks(pub Vec<Slot>);

impl Breaks {
    pub fn from_json(s: &str) -> anyhow::Result<Self> {
        let breaks: Breaks = serde_json::from_str(s)?;
        for b in &breaks.0 {
            if !b.is_valid() {
                return Err(anyhow::anyhow!("invalid break interval: {b}"));
            }
        }
        Ok(breaks)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Accepts full and three-letter names in any case.
pub fn parse_weekday(s: &str) -> anyhow::Result<Weekday> {
    s.trim()
        .parse::<Weekday>()
        .map_err(|_| anyhow::anyhow!("invalid weekday: {s}"))
}

pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TimeOfDay;

    fn slot(start: &str, end: &str) -> Slot {
        Slot::new(TimeOfDay::parse(start).unwrap(), TimeOfDay::parse(end).unwrap())
    }

    #[test]
    fn test_parse_weekday_names() {
        assert_eq!(parse_weekday("Monday").unwrap(), Weekday::Mon);
        assert_eq!(parse_weekday("sun").unwrap(), Weekday::Sun);
        assert_eq!(parse_weekday("WED").unwrap(), Weekday::Wed);
        assert!(parse_weekday("xyz").is_err());
        assert!(parse_weekday("").is_err());
        assert_eq!(parse_weekday(weekday_name(Weekday::Thu)).unwrap(), Weekday::Thu);
    }

    #[test]
    fn test_breaks_json() {
        let breaks = Breaks::from_json(r#"[{"start":"12:00","end":"13:00"}]"#).unwrap();
        assert_eq!(breaks.0, vec![slot("12:00", "13:00")]);
        assert_eq!(breaks.to_json().unwrap(), r#"[{"start":"12:00","end":"13:00"}]"#);
        assert!(Breaks::from_json(r#"[{"start":"13:00","end":"12:00"}]"#).is_err());
        assert!(Breaks::from_json("not json").is_err());
    }

    #[test]
    fn test_schedule_applies_on() {
        // 2025-06-16 is a Monday
        let monday = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2025, 6, 17).unwrap();
        assert!(RuleSchedule::Recurring(Weekday::Mon).applies_on(monday));
        assert!(!RuleSchedule::Recurring(Weekday::Mon).applies_on(tuesday));
        assert!(RuleSchedule::SpecificDate(tuesday).applies_on(tuesday));
        assert!(!RuleSchedule::SpecificDate(tuesday).applies_on(monday));
    }

    #[test]
    fn test_level_orders_specific_date_first() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 16).unwrap();
        let rule = |scope, schedule| AvailabilityRule {
            id: 1,
            tenant_id: 1,
            scope,
            schedule,
            window: slot("08:00", "22:00"),
            breaks: vec![],
            is_available: true,
        };
        let levels = [
            rule(RuleScope::Court(1), RuleSchedule::SpecificDate(date)).level(),
            rule(RuleScope::CourtType(1), RuleSchedule::SpecificDate(date)).level(),
            rule(RuleScope::Tenant, RuleSchedule::SpecificDate(date)).level(),
            rule(RuleScope::Court(1), RuleSchedule::Recurring(Weekday::Mon)).level(),
            rule(RuleScope::CourtType(1), RuleSchedule::Recurring(Weekday::Mon)).level(),
            rule(RuleScope::Tenant, RuleSchedule::Recurring(Weekday::Mon)).level(),
        ];
        assert_eq!(levels, [0, 1, 2, 3, 4, 5]);
    }
}
