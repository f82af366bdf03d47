//! Immutable trip snapshots and the cell that publishes them.
//!
//! Readers take an `Arc<TripSnapshot>` and keep it for as long as they like.
//! Writers never touch a published snapshot: [`SnapshotCell::update`] clones
//! the current one, edits the clone and swaps it in.

use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::error::{ItineraryError, RecordKind, StoreResult};
use crate::models::day::{Day, DayId};
use crate::models::event::{Event, EventId};
use crate::models::group::{Group, GroupId};
use crate::models::trip::Trip;

/// Everything needed to reconcile a trip, read at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TripSnapshot {
    pub trip: Trip,
    /// Roster order.
    pub groups: Vec<Group>,
    /// Ordered by day number.
    pub days: Vec<Day>,
    pub events: Vec<Event>,
}

impl TripSnapshot {
    pub fn new(trip: Trip, groups: Vec<Group>, days: Vec<Day>, events: Vec<Event>) -> Self {
        let mut snapshot = Self {
            trip,
            groups,
            days,
            events,
        };
        snapshot.sort_days();
        snapshot
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.iter().find(|group| group.id == id)
    }

    pub fn day(&self, id: DayId) -> Option<&Day> {
        self.days.iter().find(|day| day.id == id)
    }

    pub fn event(&self, id: EventId) -> Option<&Event> {
        self.events.iter().find(|event| event.id == id)
    }

    /// A day's events in display order.
    pub fn events_for_day(&self, day_id: DayId) -> Vec<Event> {
        let mut events: Vec<Event> = self
            .events
            .iter()
            .filter(|event| event.day_id == day_id)
            .cloned()
            .collect();
        events.sort_by_key(|event| event.order_index);
        events
    }

    /// Position after the last event of a day.
    pub fn next_order_index(&self, day_id: DayId) -> i64 {
        self.events
            .iter()
            .filter(|event| event.day_id == day_id)
            .map(|event| event.order_index)
            .max()
            .map_or(0, |max| max + 1)
    }

    /// Id for a record that has not been persisted yet. Provisional ids are
    /// negative so they can never collide with a store-assigned one.
    pub fn provisional_id(&self) -> i64 {
        let lowest = self
            .groups
            .iter()
            .map(|group| group.id.0)
            .chain(self.days.iter().map(|day| day.id.0))
            .chain(self.events.iter().map(|event| event.id.0))
            .min()
            .unwrap_or(0);
        lowest.min(0) - 1
    }

    pub fn upsert_day(&mut self, day: Day) {
        match self.days.iter_mut().find(|existing| existing.id == day.id) {
            Some(existing) => *existing = day,
            None => self.days.push(day),
        }
        self.sort_days();
    }

    /// Swap a provisional day for its persisted record, carrying the day's
    /// events over to the new id.
    pub fn confirm_day(&mut self, provisional: DayId, persisted: Day) {
        for event in self.events.iter_mut().filter(|e| e.day_id == provisional) {
            event.day_id = persisted.id;
        }
        self.days.retain(|day| day.id != provisional);
        self.upsert_day(persisted);
    }

    /// Remove a day and every event scheduled on it.
    pub fn remove_day(&mut self, id: DayId) -> StoreResult<Day> {
        let index = self
            .days
            .iter()
            .position(|day| day.id == id)
            .ok_or_else(|| ItineraryError::not_found(RecordKind::Day, id))?;
        self.events.retain(|event| event.day_id != id);
        Ok(self.days.remove(index))
    }

    pub fn upsert_event(&mut self, event: Event) {
        match self.events.iter_mut().find(|existing| existing.id == event.id) {
            Some(existing) => *existing = event,
            None => self.events.push(event),
        }
    }

    pub fn confirm_event(&mut self, provisional: EventId, persisted: Event) {
        self.events.retain(|event| event.id != provisional);
        self.upsert_event(persisted);
    }

    pub fn remove_event(&mut self, id: EventId) -> StoreResult<Event> {
        let index = self
            .events
            .iter()
            .position(|event| event.id == id)
            .ok_or_else(|| ItineraryError::not_found(RecordKind::Event, id))?;
        Ok(self.events.remove(index))
    }

    fn sort_days(&mut self) {
        self.days.sort_by_key(|day| day.day_number);
    }
}

/// Holder of the currently published snapshot.
#[derive(Debug)]
pub struct SnapshotCell {
    current: RwLock<Arc<TripSnapshot>>,
}

impl SnapshotCell {
    pub fn new(snapshot: TripSnapshot) -> Self {
        Self {
            current: RwLock::new(Arc::new(snapshot)),
        }
    }

    /// The snapshot readers should use right now.
    pub fn load(&self) -> Arc<TripSnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    /// Publish a snapshot wholesale, e.g. after a refresh or a rollback.
    pub fn store(&self, snapshot: Arc<TripSnapshot>) {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *guard = snapshot;
    }

    /// Apply an edit to a copy of the current snapshot and publish the copy.
    /// When the edit fails nothing is published.
    pub fn update<T>(
        &self,
        edit: impl FnOnce(&mut TripSnapshot) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = TripSnapshot::clone(&guard);
        let result = edit(&mut next)?;
        *guard = Arc::new(next);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::palette::PaletteColor;
    use crate::models::trip::TripId;
    use chrono::NaiveDate;

    fn trip() -> Trip {
        Trip {
            id: TripId(1),
            title: "Tokyo".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 23).unwrap(),
            created_at: None,
            updated_at: None,
        }
    }

    fn day(id: i64, day_number: u32) -> Day {
        Day {
            id: DayId(id),
            trip_id: TripId(1),
            day_number,
            date_label: String::new(),
            title: format!("Day {}", day_number),
            theme: PaletteColor::Green,
            is_split: false,
            created_at: None,
            updated_at: None,
        }
    }

    fn event(id: i64, day_id: i64, order_index: i64) -> Event {
        Event {
            id: EventId(id),
            day_id: DayId(day_id),
            trip_id: TripId(1),
            group_id: None,
            time: "09:00".to_string(),
            title: format!("Event {}", id),
            description: None,
            location: None,
            category: Default::default(),
            order_index,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_new_sorts_days_by_number() {
        let snapshot = TripSnapshot::new(trip(), vec![], vec![day(1, 3), day(2, 1)], vec![]);
        assert_eq!(snapshot.days[0].id, DayId(2));
    }

    #[test]
    fn test_events_for_day_follow_order_index() {
        let snapshot = TripSnapshot::new(
            trip(),
            vec![],
            vec![day(1, 1), day(2, 2)],
            vec![event(1, 1, 4), event(2, 2, 0), event(3, 1, 1)],
        );

        let ids: Vec<EventId> = snapshot
            .events_for_day(DayId(1))
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, vec![EventId(3), EventId(1)]);
        assert_eq!(snapshot.next_order_index(DayId(1)), 5);
        assert_eq!(snapshot.next_order_index(DayId(9)), 0);
    }

    #[test]
    fn test_provisional_ids_are_negative_and_unique() {
        let mut snapshot = TripSnapshot::new(trip(), vec![], vec![day(1, 1)], vec![]);
        assert_eq!(snapshot.provisional_id(), -1);

        snapshot.upsert_event(event(-1, 1, 0));
        assert_eq!(snapshot.provisional_id(), -2);
    }

    #[test]
    fn test_remove_day_drops_its_events() {
        let mut snapshot = TripSnapshot::new(
            trip(),
            vec![],
            vec![day(1, 1), day(2, 2)],
            vec![event(1, 1, 0), event(2, 2, 0)],
        );

        snapshot.remove_day(DayId(1)).unwrap();
        assert_eq!(snapshot.events.len(), 1);
        assert!(snapshot.remove_day(DayId(1)).unwrap_err().is_not_found());
    }

    #[test]
    fn test_confirm_day_moves_events_to_persisted_id() {
        let mut snapshot = TripSnapshot::new(trip(), vec![], vec![day(-1, 1)], vec![event(-2, -1, 0)]);

        snapshot.confirm_day(DayId(-1), day(10, 1));
        assert_eq!(snapshot.days.len(), 1);
        assert_eq!(snapshot.events[0].day_id, DayId(10));
    }

    #[test]
    fn test_update_publishes_copy_and_keeps_old_readers_intact() {
        let cell = SnapshotCell::new(TripSnapshot::new(trip(), vec![], vec![day(1, 1)], vec![]));
        let before = cell.load();

        cell.update(|snapshot| {
            snapshot.upsert_event(event(1, 1, 0));
            Ok(())
        })
        .unwrap();

        assert!(before.events.is_empty());
        assert_eq!(cell.load().events.len(), 1);
    }

    #[test]
    fn test_failed_update_publishes_nothing() {
        let cell = SnapshotCell::new(TripSnapshot::new(trip(), vec![], vec![day(1, 1)], vec![]));
        let before = cell.load();

        let result = cell.update(|snapshot| {
            snapshot.upsert_event(event(1, 1, 0));
            snapshot.remove_event(EventId(99))
        });

        assert!(result.is_err());
        assert!(Arc::ptr_eq(&before, &cell.load()));
    }
}
