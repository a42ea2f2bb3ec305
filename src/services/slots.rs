use crate::models::{AvailabilityRule, Slot, TimeOfDay};

/// Expands availability windows into fixed-length candidate slots.
///
/// Each available window is walked from its start in `interval_minutes` steps;
/// a slot is kept while it still ends inside the window and does not touch one
/// of the window's breaks. Blackout rules (`is_available == false`) in the same
/// set remove every slot they overlap. Output is sorted by start time.
pub fn generate(rules: &[AvailabilityRule], interval_minutes: i32) -> Vec<Slot> {
    if interval_minutes <= 0 {
        return vec![];
    }

    let blackouts: Vec<Slot> = rules
        .iter()
        .filter(|r| !r.is_available)
        .map(|r| r.window)
        .collect();

    let mut slots = vec![];
    for rule in rules.iter().filter(|r| r.is_available) {
        let window_end = rule.window.end.minutes();
        let mut cursor = rule.window.start.minutes();

        while cursor + interval_minutes <= window_end {
            let (Some(start), Some(end)) = (
                TimeOfDay::from_minutes(cursor),
                TimeOfDay::from_minutes(cursor + interval_minutes),
            ) else {
                break;
            };
            let slot = Slot::new(start, end);
            cursor += interval_minutes;

            if rule.break_overlaps(&slot) || blackouts.iter().any(|b| b.overlaps(&slot)) {
                continue;
            }
            slots.push(slot);
        }
    }

    slots.sort_by_key(|s| (s.start, s.end));
    slots
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RuleSchedule, RuleScope};
    use chrono::Weekday;

    fn t(s: &str) -> TimeOfDay {
        TimeOfDay::parse(s).unwrap()
    }

    fn slot(start: &str, end: &str) -> Slot {
        Slot::new(t(start), t(end))
    }

    fn window(start: &str, end: &str) -> AvailabilityRule {
        AvailabilityRule {
            id: 1,
            tenant_id: 1,
            scope: RuleScope::Court(1),
            schedule: RuleSchedule::Recurring(Weekday::Mon),
            window: slot(start, end),
            breaks: vec![],
            is_available: true,
        }
    }

    #[test]
    fn test_full_day_hourly_slots() {
        let slots = generate(&[window("08:00", "22:00")], 60);
        assert_eq!(slots.len(), 14);
        assert_eq!(slots[0], slot("08:00", "09:00"));
        assert_eq!(slots[13], slot("21:00", "22:00"));
    }

    #[test]
    fn test_partial_trailing_slot_is_dropped() {
        let slots = generate(&[window("08:00", "10:30")], 60);
        assert_eq!(slots, vec![slot("08:00", "09:00"), slot("09:00", "10:00")]);
    }

    #[test]
    fn test_breaks_remove_overlapping_slots() {
        let mut rule = window("08:00", "12:00");
        rule.breaks = vec![slot("09:30", "10:00")];
        let slots = generate(&[rule], 60);
        assert_eq!(
            slots,
            vec![slot("08:00", "09:00"), slot("10:00", "11:00"), slot("11:00", "12:00")]
        );
    }

    #[test]
    fn test_blackout_rule_removes_slots() {
        let mut blackout = window("10:00", "12:00");
        blackout.is_available = false;
        let slots = generate(&[window("08:00", "14:00"), blackout], 60);
        assert_eq!(
            slots,
            vec![
                slot("08:00", "09:00"),
                slot("09:00", "10:00"),
                slot("12:00", "13:00"),
                slot("13:00", "14:00"),
            ]
        );
    }

    #[test]
    fn test_multiple_windows_are_concatenated_in_order() {
        let slots = generate(&[window("18:00", "20:00"), window("08:00", "09:30")], 30);
        let starts: Vec<String> = slots.iter().map(|s| s.start.to_string()).collect();
        assert_eq!(starts, vec!["08:00", "08:30", "09:00", "18:00", "18:30", "19:00", "19:30"]);
    }

    #[test]
    fn test_window_ending_at_midnight() {
        let slots = generate(&[window("22:00", "24:00")], 60);
        assert_eq!(slots, vec![slot("22:00", "23:00"), slot("23:00", "24:00")]);
    }

    #[test]
    fn test_generation_is_deterministic() {
        let mut rule = window("07:00", "23:00");
        rule.breaks = vec![slot("12:00", "12:45")];
        let rules = vec![rule, window("05:00", "06:00")];
        assert_eq!(generate(&rules, 45), generate(&rules, 45));
    }

    #[test]
    fn test_non_positive_interval_yields_nothing() {
        assert!(generate(&[window("08:00", "22:00")], 0).is_empty());
        assert!(generate(&[window("08:00", "22:00")], -30).is_empty());
    }
}
