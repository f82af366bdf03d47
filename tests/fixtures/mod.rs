// Test fixtures - reusable itinerary records
// Provides consistent trips, rosters and events across test files

#![allow(dead_code)]

use chrono::NaiveDate;
use itinerary::models::day::{Day, DayId};
use itinerary::models::event::{Event, EventCategory, EventId};
use itinerary::models::group::{Group, GroupId};
use itinerary::models::palette::PaletteColor;
use itinerary::models::trip::{Trip, TripId};

pub const TRIP: TripId = TripId(1);

/// Sample trips
pub mod trips {
    use super::*;

    /// Six days in Tokyo, Jan 18-23 2025
    pub fn tokyo() -> Trip {
        Trip {
            id: TRIP,
            title: "Tokyo".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 23).unwrap(),
            created_at: None,
            updated_at: None,
        }
    }
}

/// Sample days
pub mod days {
    use super::*;

    pub fn day(id: i64, day_number: u32, is_split: bool) -> Day {
        Day {
            id: DayId(id),
            trip_id: TRIP,
            day_number,
            date_label: format!("1/{}", 17 + day_number),
            title: format!("Day {}", day_number),
            theme: PaletteColor::Green,
            is_split,
            created_at: None,
            updated_at: None,
        }
    }
}

/// Sample rosters
pub mod groups {
    use super::*;

    pub fn group(id: i64, name: &str, color: PaletteColor) -> Group {
        Group {
            id: GroupId(id),
            trip_id: TRIP,
            name: name.to_string(),
            color,
            order_index: id,
            created_at: None,
            updated_at: None,
        }
    }

    /// Groups A, B, C with the first three palette colors
    pub fn abc() -> Vec<Group> {
        vec![
            group(1, "A", PaletteColor::Pink),
            group(2, "B", PaletteColor::Sky),
            group(3, "C", PaletteColor::Amber),
        ]
    }
}

/// Sample events
pub mod events {
    use super::*;

    pub fn shared(id: i64, day_id: i64, time: &str, title: &str) -> Event {
        event(id, day_id, None, time, title)
    }

    pub fn grouped(id: i64, day_id: i64, group_id: i64, time: &str, title: &str) -> Event {
        event(id, day_id, Some(GroupId(group_id)), time, title)
    }

    pub fn event(id: i64, day_id: i64, group_id: Option<GroupId>, time: &str, title: &str) -> Event {
        Event {
            id: EventId(id),
            day_id: DayId(day_id),
            trip_id: TRIP,
            group_id,
            time: time.to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            category: EventCategory::Sight,
            order_index: id,
            created_at: None,
            updated_at: None,
        }
    }

    pub fn titles(events: &[Event]) -> Vec<&str> {
        events.iter().map(|event| event.title.as_str()).collect()
    }
}
