//! Time-and-group reconciliation.
//!
//! Turns a day's flat event list plus the trip roster into time slots:
//! shared events full-width, group events side by side in roster order.
//! Everything here is pure and synchronous; the result is rebuilt from the
//! records on every read and never stored.

mod aggregate;
mod columns;
mod partition;

pub use aggregate::{clamp_columns, trip_column_count, MAX_TRIP_COLUMNS, MIN_TRIP_COLUMNS};
pub use columns::{organize_columns, OrganizedColumns};
pub use partition::{partition_slots, SlotPartition};

use crate::models::day::Day;
use crate::models::event::Event;
use crate::models::group::Group;
use crate::models::timeline::{DayTimeline, TimeSlot, TripTimeline};
use crate::services::snapshot::TripSnapshot;
use crate::utils::time_label::sort_chronologically;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileOptions {
    /// Order events by clock time before bucketing them.
    pub sort_chronologically: bool,
}

/// Reconcile one day. `events` must already be in display order.
///
/// Events whose group has vanished from the roster are shown with the shared
/// events of their slot, after the ones that were shared to begin with.
pub fn reconcile_day(day: &Day, events: &[Event], roster: &[Group]) -> DayTimeline {
    let slots = partition_slots(events)
        .into_iter()
        .map(|partition| {
            let OrganizedColumns { columns, orphans } =
                organize_columns(partition.grouped, roster);

            let mut shared_events = partition.shared;
            shared_events.extend(orphans);

            TimeSlot {
                time: partition.time,
                shared_events,
                group_columns: columns,
            }
        })
        .collect();

    DayTimeline {
        day: day.clone(),
        slots,
    }
}

/// Reconcile every day of a snapshot and derive the trip-wide column count.
pub fn reconcile_trip(snapshot: &TripSnapshot, options: ReconcileOptions) -> TripTimeline {
    let days: Vec<DayTimeline> = snapshot
        .days
        .iter()
        .map(|day| reconcile_snapshot_day(snapshot, day, options))
        .collect();

    let column_count = trip_column_count(&days);
    log::debug!(
        "Reconciled trip {}: {} days, {} columns",
        snapshot.trip.id,
        days.len(),
        column_count
    );

    TripTimeline { days, column_count }
}

/// Reconcile a single day of a snapshot.
pub fn reconcile_snapshot_day(
    snapshot: &TripSnapshot,
    day: &Day,
    options: ReconcileOptions,
) -> DayTimeline {
    let mut events = snapshot.events_for_day(day.id);
    if options.sort_chronologically {
        sort_chronologically(&mut events);
    }
    reconcile_day(day, &events, &snapshot.groups)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::day::DayId;
    use crate::models::event::EventId;
    use crate::models::group::GroupId;
    use crate::models::palette::PaletteColor;
    use crate::models::trip::{Trip, TripId};
    use chrono::NaiveDate;
    use pretty_assertions::assert_eq;

    fn day(id: i64) -> Day {
        Day {
            id: DayId(id),
            trip_id: TripId(1),
            day_number: id as u32,
            date_label: String::new(),
            title: format!("Day {}", id),
            theme: PaletteColor::Green,
            is_split: true,
            created_at: None,
            updated_at: None,
        }
    }

    fn group(id: i64, name: &str) -> Group {
        Group {
            id: GroupId(id),
            trip_id: TripId(1),
            name: name.to_string(),
            color: PaletteColor::ALL[id as usize % PaletteColor::ALL.len()],
            order_index: id,
            created_at: None,
            updated_at: None,
        }
    }

    fn event(id: i64, day_id: i64, time: &str, group: Option<i64>, title: &str) -> Event {
        Event {
            id: EventId(id),
            day_id: DayId(day_id),
            trip_id: TripId(1),
            group_id: group.map(GroupId),
            time: time.to_string(),
            title: title.to_string(),
            description: None,
            location: None,
            category: Default::default(),
            order_index: id,
            created_at: None,
            updated_at: None,
        }
    }

    fn titles(events: &[Event]) -> Vec<&str> {
        events.iter().map(|e| e.title.as_str()).collect()
    }

    #[test]
    fn test_stale_group_event_is_shown_as_shared() {
        let events = vec![
            event(1, 1, "09:00", None, "Breakfast"),
            event(2, 1, "09:00", Some(42), "Lost"),
            event(3, 1, "09:00", Some(1), "Visit Shrine"),
        ];

        let timeline = reconcile_day(&day(1), &events, &[group(1, "A")]);
        let slot = &timeline.slots[0];
        assert_eq!(titles(&slot.shared_events), vec!["Breakfast", "Lost"]);
        assert_eq!(slot.group_columns.len(), 1);
        assert_eq!(slot.event_count(), 3);
    }

    #[test]
    fn test_reconcile_trip_uses_widest_day() {
        let trip = Trip {
            id: TripId(1),
            title: "Tokyo".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 23).unwrap(),
            created_at: None,
            updated_at: None,
        };
        let groups = vec![group(1, "A"), group(2, "B"), group(3, "C")];
        let events = vec![
            event(1, 1, "10:00", None, "Together"),
            event(2, 2, "10:00", Some(1), "A"),
            event(3, 2, "10:00", Some(2), "B"),
            event(4, 2, "10:00", Some(3), "C"),
        ];
        let snapshot = TripSnapshot::new(trip, groups, vec![day(1), day(2)], events);

        let timeline = reconcile_trip(&snapshot, ReconcileOptions::default());
        assert_eq!(timeline.days.len(), 2);
        assert_eq!(timeline.column_count, 3);
        assert_eq!(timeline.days[0].max_columns(), 0);
    }

    #[test]
    fn test_chronological_option_reorders_slots() {
        let trip = Trip {
            id: TripId(1),
            title: "Tokyo".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            created_at: None,
            updated_at: None,
        };
        let events = vec![
            event(1, 1, "Evening", None, "Night walk"),
            event(2, 1, "14:00", None, "Lunch"),
            event(3, 1, "09:00", None, "Breakfast"),
        ];
        let snapshot = TripSnapshot::new(trip, vec![], vec![day(1)], events);

        let as_entered = reconcile_snapshot_day(&snapshot, &snapshot.days[0], ReconcileOptions::default());
        let sorted = reconcile_snapshot_day(
            &snapshot,
            &snapshot.days[0],
            ReconcileOptions {
                sort_chronologically: true,
            },
        );

        let times = |timeline: &DayTimeline| -> Vec<String> {
            timeline.slots.iter().map(|slot| slot.time.clone()).collect()
        };
        assert_eq!(times(&as_entered), vec!["Evening", "14:00", "09:00"]);
        assert_eq!(times(&sorted), vec!["09:00", "14:00", "Evening"]);
    }
}
