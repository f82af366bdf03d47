//! Laying out a slot's grouped events as per-group columns.

use crate::error::ItineraryError;
use crate::models::event::Event;
use crate::models::group::Group;
use crate::models::timeline::GroupColumn;

/// Result of organizing one slot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct OrganizedColumns {
    /// One column per roster group that has events, in roster order.
    pub columns: Vec<GroupColumn>,
    /// Events whose group is not in the roster, in input order.
    pub orphans: Vec<Event>,
}

/// Build the columns of one slot.
///
/// Groups without events in the slot get no column. Events pointing at a
/// group missing from the roster land in `orphans` and are logged.
pub fn organize_columns(grouped: Vec<Event>, roster: &[Group]) -> OrganizedColumns {
    let mut buckets: Vec<Vec<Event>> = vec![Vec::new(); roster.len()];
    let mut orphans = Vec::new();

    for event in grouped {
        let position = event
            .group_id
            .and_then(|group_id| roster.iter().position(|group| group.id == group_id));

        match (position, event.group_id) {
            (Some(index), _) => buckets[index].push(event),
            (None, Some(group_id)) => {
                log::warn!(
                    "{}; showing it as shared",
                    ItineraryError::DataIntegrity {
                        event_id: event.id,
                        group_id,
                    }
                );
                orphans.push(event);
            }
            // Shared events are not expected here; keep them visible anyway.
            (None, None) => orphans.push(event),
        }
    }

    let columns = roster
        .iter()
        .zip(buckets)
        .filter(|(_, events)| !events.is_empty())
        .map(|(group, events)| GroupColumn {
            group_id: group.id,
            group_name: group.name.clone(),
            color: group.color,
            events,
        })
        .collect();

    OrganizedColumns { columns, orphans }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::day::DayId;
    use crate::models::event::EventId;
    use crate::models::group::GroupId;
    use crate::models::palette::PaletteColor;
    use crate::models::trip::TripId;

    fn group(id: i64, name: &str, color: PaletteColor) -> Group {
        Group {
            id: GroupId(id),
            trip_id: TripId(1),
            name: name.to_string(),
            color,
            order_index: id,
            created_at: None,
            updated_at: None,
        }
    }

    fn event(id: i64, group: i64) -> Event {
        Event {
            id: EventId(id),
            day_id: DayId(1),
            trip_id: TripId(1),
            group_id: Some(GroupId(group)),
            time: "14:00".to_string(),
            title: format!("Event {}", id),
            description: None,
            location: None,
            category: Default::default(),
            order_index: id,
            created_at: None,
            updated_at: None,
        }
    }

    fn roster() -> Vec<Group> {
        vec![
            group(1, "A", PaletteColor::Pink),
            group(2, "B", PaletteColor::Sky),
            group(3, "C", PaletteColor::Amber),
        ]
    }

    #[test]
    fn test_only_groups_with_events_get_columns() {
        let organized = organize_columns(vec![event(10, 3), event(11, 1)], &roster());

        let names: Vec<&str> = organized
            .columns
            .iter()
            .map(|c| c.group_name.as_str())
            .collect();
        assert_eq!(names, vec!["A", "C"]);
        assert_eq!(organized.columns[1].color, PaletteColor::Amber);
        assert!(organized.orphans.is_empty());
    }

    #[test]
    fn test_events_keep_input_order_within_column() {
        let organized = organize_columns(vec![event(5, 2), event(3, 2)], &roster());
        let ids: Vec<i64> = organized.columns[0].events.iter().map(|e| e.id.0).collect();
        assert_eq!(ids, vec![5, 3]);
    }

    #[test]
    fn test_unknown_group_becomes_orphan() {
        let organized = organize_columns(vec![event(1, 99), event(2, 1)], &roster());
        assert_eq!(organized.columns.len(), 1);
        assert_eq!(organized.orphans.len(), 1);
        assert_eq!(organized.orphans[0].id, EventId(1));
    }

    #[test]
    fn test_empty_roster_orphans_everything() {
        let organized = organize_columns(vec![event(1, 1)], &[]);
        assert!(organized.columns.is_empty());
        assert_eq!(organized.orphans.len(), 1);
    }
}
