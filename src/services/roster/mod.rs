//! Group roster edits applied to the published snapshot.
//!
//! Every edit goes through [`SnapshotCell::update`], so readers holding an
//! older snapshot are unaffected and the next reconciliation sees roster and
//! events change together.

use std::sync::Arc;

use crate::error::{ItineraryError, RecordKind, StoreResult};
use crate::models::group::{Group, GroupId};
use crate::models::palette::PaletteColor;
use crate::services::snapshot::{SnapshotCell, TripSnapshot};

pub struct RosterManager {
    cell: Arc<SnapshotCell>,
    palette: Vec<PaletteColor>,
}

impl RosterManager {
    /// An empty palette falls back to every palette color.
    pub fn new(cell: Arc<SnapshotCell>, palette: Vec<PaletteColor>) -> Self {
        let palette = if palette.is_empty() {
            PaletteColor::ALL.to_vec()
        } else {
            palette
        };
        Self { cell, palette }
    }

    pub fn roster(&self) -> Vec<Group> {
        self.cell.load().groups.clone()
    }

    /// Color for the group that would be added next to a roster of
    /// `roster_len` groups.
    pub fn color_for(&self, roster_len: usize) -> PaletteColor {
        self.palette[roster_len % self.palette.len()]
    }

    /// Append a group with a provisional id and the next round-robin color.
    pub fn add(&self, name: &str) -> StoreResult<Group> {
        self.cell.update(|snapshot| {
            let group = Group {
                id: GroupId(snapshot.provisional_id()),
                trip_id: snapshot.trip.id,
                name: name.trim().to_string(),
                color: self.color_for(snapshot.groups.len()),
                order_index: next_order_index(snapshot),
                created_at: None,
                updated_at: None,
            };
            group
                .validate()
                .map_err(|e| ItineraryError::validation(RecordKind::Group, e.to_string()))?;

            snapshot.groups.push(group.clone());
            Ok(group)
        })
    }

    pub fn rename(&self, id: GroupId, name: &str) -> StoreResult<Group> {
        self.cell.update(|snapshot| {
            let group = find_mut(snapshot, id)?;
            let mut renamed = group.clone();
            renamed.name = name.trim().to_string();
            renamed
                .validate()
                .map_err(|e| ItineraryError::validation(RecordKind::Group, e.to_string()))?;

            *group = renamed.clone();
            Ok(renamed)
        })
    }

    /// Remove a group and detach every event that referenced it. Returns the
    /// removed group.
    pub fn remove(&self, id: GroupId) -> StoreResult<Group> {
        self.cell.update(|snapshot| {
            let index = snapshot
                .groups
                .iter()
                .position(|group| group.id == id)
                .ok_or_else(|| ItineraryError::not_found(RecordKind::Group, id))?;
            let removed = snapshot.groups.remove(index);

            let mut detached = 0;
            for event in snapshot.events.iter_mut() {
                if event.group_id == Some(id) {
                    event.group_id = None;
                    detached += 1;
                }
            }
            log::debug!("Removed group {} and detached {} event(s)", id, detached);

            Ok(removed)
        })
    }

    /// Replace a group (usually a provisional one) with its persisted record.
    /// Event references follow the id change.
    pub fn confirm(&self, local_id: GroupId, persisted: Group) -> StoreResult<()> {
        self.cell.update(|snapshot| {
            let group = find_mut(snapshot, local_id)?;
            *group = persisted.clone();

            if local_id != persisted.id {
                for event in snapshot.events.iter_mut() {
                    if event.group_id == Some(local_id) {
                        event.group_id = Some(persisted.id);
                    }
                }
            }
            Ok(())
        })
    }
}

fn find_mut(snapshot: &mut TripSnapshot, id: GroupId) -> StoreResult<&mut Group> {
    snapshot
        .groups
        .iter_mut()
        .find(|group| group.id == id)
        .ok_or_else(|| ItineraryError::not_found(RecordKind::Group, id))
}

fn next_order_index(snapshot: &TripSnapshot) -> i64 {
    snapshot
        .groups
        .iter()
        .map(|group| group.order_index)
        .max()
        .map_or(0, |max| max + 1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::day::{Day, DayId};
    use crate::models::event::{Event, EventId};
    use crate::models::trip::{Trip, TripId};
    use chrono::NaiveDate;

    fn snapshot() -> TripSnapshot {
        let trip = Trip {
            id: TripId(1),
            title: "Tokyo".to_string(),
            start_date: NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2025, 1, 23).unwrap(),
            created_at: None,
            updated_at: None,
        };
        let day = Day {
            id: DayId(1),
            trip_id: TripId(1),
            day_number: 1,
            date_label: String::new(),
            title: "Split".to_string(),
            theme: PaletteColor::Green,
            is_split: true,
            created_at: None,
            updated_at: None,
        };
        TripSnapshot::new(trip, vec![], vec![day], vec![])
    }

    fn grouped_event(id: i64, group_id: GroupId) -> Event {
        Event {
            id: EventId(id),
            day_id: DayId(1),
            trip_id: TripId(1),
            group_id: Some(group_id),
            time: "09:00".to_string(),
            title: "Visit Shrine".to_string(),
            description: None,
            location: None,
            category: Default::default(),
            order_index: 0,
            created_at: None,
            updated_at: None,
        }
    }

    fn manager(palette: Vec<PaletteColor>) -> RosterManager {
        RosterManager::new(Arc::new(SnapshotCell::new(snapshot())), palette)
    }

    #[test]
    fn test_add_assigns_round_robin_colors() {
        let palette = vec![
            PaletteColor::Pink,
            PaletteColor::Sky,
            PaletteColor::Amber,
            PaletteColor::Purple,
        ];
        let roster = manager(palette.clone());

        let colors: Vec<PaletteColor> = ["A", "B", "C", "D", "E"]
            .iter()
            .map(|name| roster.add(name).unwrap().color)
            .collect();

        assert_eq!(colors[..4], palette[..]);
        assert_eq!(colors[4], palette[0]);
    }

    #[test]
    fn test_add_uses_provisional_ids_and_creation_order() {
        let roster = manager(vec![]);
        let a = roster.add("A").unwrap();
        let b = roster.add("B").unwrap();

        assert!(a.id.0 < 0 && b.id.0 < 0);
        assert_ne!(a.id, b.id);
        assert_eq!(b.order_index, a.order_index + 1);
        assert_eq!(a.color, PaletteColor::Pink);
    }

    #[test]
    fn test_add_rejects_blank_name_without_publishing() {
        let roster = manager(vec![]);
        assert!(roster.add("   ").is_err());
        assert!(roster.roster().is_empty());
    }

    #[test]
    fn test_rename_missing_group_is_not_found() {
        let roster = manager(vec![]);
        let err = roster.rename(GroupId(7), "New").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_rename_group() {
        let roster = manager(vec![]);
        let group = roster.add("A").unwrap();

        roster.rename(group.id, "Shoppers").unwrap();
        assert_eq!(roster.roster()[0].name, "Shoppers");
    }

    #[test]
    fn test_remove_detaches_events() {
        let cell = Arc::new(SnapshotCell::new(snapshot()));
        let roster = RosterManager::new(Arc::clone(&cell), vec![]);
        let group = roster.add("A").unwrap();
        cell.update(|snapshot| {
            snapshot.upsert_event(grouped_event(5, group.id));
            Ok(())
        })
        .unwrap();

        let before = cell.load();
        roster.remove(group.id).unwrap();
        let after = cell.load();

        assert!(after.groups.is_empty());
        assert_eq!(after.events.len(), 1);
        assert_eq!(after.events[0].group_id, None);
        // Readers of the old snapshot still see the group.
        assert_eq!(before.groups.len(), 1);
        assert_eq!(before.events[0].group_id, Some(group.id));

        assert!(roster.remove(group.id).unwrap_err().is_not_found());
    }

    #[test]
    fn test_confirm_rewrites_event_references() {
        let cell = Arc::new(SnapshotCell::new(snapshot()));
        let roster = RosterManager::new(Arc::clone(&cell), vec![]);
        let provisional = roster.add("A").unwrap();
        cell.update(|snapshot| {
            snapshot.upsert_event(grouped_event(5, provisional.id));
            Ok(())
        })
        .unwrap();

        let mut persisted = provisional.clone();
        persisted.id = GroupId(31);
        roster.confirm(provisional.id, persisted).unwrap();

        let current = cell.load();
        assert_eq!(current.groups[0].id, GroupId(31));
        assert_eq!(current.events[0].group_id, Some(GroupId(31)));
    }
}
