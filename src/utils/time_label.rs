//! Time labels.
//!
//! An event's time is either a clock time (`09:00`) or a free-form label
//! ("Morning", "After lunch"). Slots compare labels as raw strings; parsing
//! is only used for optional chronological ordering.

use std::cmp::Ordering;

use chrono::NaiveTime;

use crate::models::event::Event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeLabel {
    Clock(NaiveTime),
    Named(String),
}

impl TimeLabel {
    pub fn parse(label: &str) -> Self {
        let trimmed = label.trim();
        ["%H:%M", "%H:%M:%S"]
            .iter()
            .find_map(|format| NaiveTime::parse_from_str(trimmed, format).ok())
            .map(TimeLabel::Clock)
            .unwrap_or_else(|| TimeLabel::Named(label.to_string()))
    }

    pub fn clock(&self) -> Option<NaiveTime> {
        match self {
            TimeLabel::Clock(time) => Some(*time),
            TimeLabel::Named(_) => None,
        }
    }
}

/// Clock times ascending, then named labels in their existing order.
fn chronological(a: &TimeLabel, b: &TimeLabel) -> Ordering {
    match (a.clock(), b.clock()) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Stable chronological sort of a day's events.
pub fn sort_chronologically(events: &mut [Event]) {
    events.sort_by(|a, b| chronological(&TimeLabel::parse(&a.time), &TimeLabel::parse(&b.time)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::day::DayId;
    use crate::models::event::EventId;
    use crate::models::trip::TripId;
    use test_case::test_case;

    fn event(id: i64, time: &str) -> Event {
        Event {
            id: EventId(id),
            day_id: DayId(1),
            trip_id: TripId(1),
            group_id: None,
            time: time.to_string(),
            title: time.to_string(),
            description: None,
            location: None,
            category: Default::default(),
            order_index: id,
            created_at: None,
            updated_at: None,
        }
    }

    #[test_case("09:00", Some((9, 0)))]
    #[test_case("9:30", Some((9, 30)))]
    #[test_case(" 18:45 ", Some((18, 45)))]
    #[test_case("Morning", None)]
    #[test_case("", None)]
    #[test_case("25:00", None)]
    fn test_parse(label: &str, expected: Option<(u32, u32)>) {
        let expected = expected.map(|(h, m)| NaiveTime::from_hms_opt(h, m, 0).unwrap());
        assert_eq!(TimeLabel::parse(label).clock(), expected);
    }

    #[test]
    fn test_named_label_keeps_original_text() {
        assert_eq!(
            TimeLabel::parse("After lunch"),
            TimeLabel::Named("After lunch".to_string())
        );
    }

    #[test]
    fn test_sort_puts_named_labels_last_in_original_order() {
        let mut events = vec![
            event(1, "Evening"),
            event(2, "14:00"),
            event(3, ""),
            event(4, "09:00"),
            event(5, "14:00"),
        ];

        sort_chronologically(&mut events);
        let ids: Vec<i64> = events.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![4, 2, 5, 1, 3]);
    }
}
