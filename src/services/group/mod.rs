//! Group service for CRUD operations on traveler groups.
//!
//! Deleting a group detaches its events instead of deleting them; the
//! foreign key carries `ON DELETE SET NULL` as well, but the detach is done
//! explicitly so it also holds on databases created before that constraint.

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{ItineraryError, RecordKind};
use crate::models::group::{Group, GroupDraft, GroupId};
use crate::models::palette::PaletteColor;
use crate::models::trip::TripId;
use crate::services::database::shared::{now_rfc3339, to_local_datetime};

const GROUP_COLUMNS: &str = "id, trip_id, name, color, order_index, created_at, updated_at";

/// Service for managing traveler groups.
pub struct GroupService<'a> {
    conn: &'a Connection,
}

impl<'a> GroupService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, draft: &GroupDraft) -> Result<Group> {
        draft
            .validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Group, e.to_string()))?;

        let now = now_rfc3339();
        self.conn
            .execute(
                "INSERT INTO trip_groups (trip_id, name, color, order_index, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    draft.trip_id.0,
                    draft.name.trim(),
                    draft.color.token(),
                    draft.order_index,
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert group")?;

        let id = GroupId(self.conn.last_insert_rowid());
        self.get(id)?
            .ok_or_else(|| anyhow!("Group {} vanished after insert", id))
    }

    pub fn get(&self, id: GroupId) -> Result<Option<Group>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM trip_groups WHERE id = ?1", GROUP_COLUMNS),
                [id.0],
                map_group_row,
            )
            .optional()
            .context("Failed to fetch group")
    }

    /// The trip's roster, in creation order.
    pub fn list_by_trip(&self, trip_id: TripId) -> Result<Vec<Group>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM trip_groups WHERE trip_id = ?1 ORDER BY order_index ASC, id ASC",
            GROUP_COLUMNS
        ))?;

        let groups = stmt.query_map([trip_id.0], map_group_row)?;
        groups
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to fetch groups")
    }

    pub fn update(&self, group: &Group) -> Result<Group> {
        group
            .validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Group, e.to_string()))?;

        let rows_affected = self
            .conn
            .execute(
                "UPDATE trip_groups SET name = ?1, color = ?2, order_index = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    group.name.trim(),
                    group.color.token(),
                    group.order_index,
                    now_rfc3339(),
                    group.id.0,
                ],
            )
            .context("Failed to update group")?;

        if rows_affected == 0 {
            return Err(ItineraryError::not_found(RecordKind::Group, group.id).into());
        }

        self.get(group.id)?
            .ok_or_else(|| ItineraryError::not_found(RecordKind::Group, group.id).into())
    }

    /// Delete a group by ID, detaching every event that referenced it.
    pub fn delete(&self, id: GroupId) -> Result<()> {
        if self.get(id)?.is_none() {
            return Err(ItineraryError::not_found(RecordKind::Group, id).into());
        }

        let tx = self.conn.unchecked_transaction()?;

        let detached = tx
            .execute(
                "UPDATE events SET group_id = NULL WHERE group_id = ?1",
                params![id.0],
            )
            .context("Failed to detach events from group")?;

        tx.execute("DELETE FROM trip_groups WHERE id = ?1", params![id.0])
            .context("Failed to delete group")?;

        tx.commit().context("Failed to commit group removal")?;

        if detached > 0 {
            log::info!("Detached {} event(s) from removed group {}", detached, id);
        }

        Ok(())
    }
}

fn map_group_row(row: &Row<'_>) -> Result<Group, rusqlite::Error> {
    let color: String = row.get(3)?;

    Ok(Group {
        id: GroupId(row.get(0)?),
        trip_id: TripId(row.get(1)?),
        name: row.get(2)?,
        color: PaletteColor::from_token_or_default(&color),
        order_index: row.get(4)?,
        created_at: Some(to_local_datetime(row.get(5)?)?),
        updated_at: Some(to_local_datetime(row.get(6)?)?),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::day::DayDraft;
    use crate::models::event::Event;
    use crate::models::trip::TripDraft;
    use crate::services::database::Database;
    use crate::services::day::DayService;
    use crate::services::event::EventService;
    use crate::services::trip::TripService;
    use chrono::NaiveDate;

    fn setup() -> (Database, TripId) {
        let db = Database::in_memory().unwrap();
        let trip = TripService::new(db.connection())
            .create(&TripDraft::new(
                "Tokyo",
                NaiveDate::from_ymd_opt(2025, 1, 18).unwrap(),
                NaiveDate::from_ymd_opt(2025, 1, 23).unwrap(),
            ))
            .unwrap();
        (db, trip.id)
    }

    fn draft(trip_id: TripId, name: &str, order_index: i64) -> GroupDraft {
        GroupDraft {
            trip_id,
            name: name.to_string(),
            color: PaletteColor::Sky,
            order_index,
        }
    }

    fn references(db: &Database, id: GroupId) -> i64 {
        db.connection()
            .query_row(
                "SELECT COUNT(*) FROM events WHERE group_id = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_create_group() {
        let (db, trip_id) = setup();
        let service = GroupService::new(db.connection());

        let group = service.create(&draft(trip_id, "  Photo crew ", 0)).unwrap();
        assert_eq!(group.name, "Photo crew");
        assert_eq!(group.color, PaletteColor::Sky);
        assert!(group.created_at.is_some());
    }

    #[test]
    fn test_create_rejects_empty_name() {
        let (db, trip_id) = setup();
        let service = GroupService::new(db.connection());

        let err = ItineraryError::from_storage(service.create(&draft(trip_id, " ", 0)).unwrap_err());
        assert!(matches!(
            err,
            ItineraryError::Validation {
                kind: RecordKind::Group,
                ..
            }
        ));
    }

    #[test]
    fn test_list_follows_order_index() {
        let (db, trip_id) = setup();
        let service = GroupService::new(db.connection());

        service.create(&draft(trip_id, "Second", 1)).unwrap();
        service.create(&draft(trip_id, "First", 0)).unwrap();

        let names: Vec<String> = service
            .list_by_trip(trip_id)
            .unwrap()
            .into_iter()
            .map(|group| group.name)
            .collect();
        assert_eq!(names, vec!["First", "Second"]);
    }

    #[test]
    fn test_rename_group() {
        let (db, trip_id) = setup();
        let service = GroupService::new(db.connection());

        let mut group = service.create(&draft(trip_id, "A", 0)).unwrap();
        group.name = "Shoppers".to_string();
        assert_eq!(service.update(&group).unwrap().name, "Shoppers");
    }

    #[test]
    fn test_update_missing_group_is_not_found() {
        let (db, trip_id) = setup();
        let service = GroupService::new(db.connection());

        let mut group = service.create(&draft(trip_id, "A", 0)).unwrap();
        service.delete(group.id).unwrap();
        group.name = "B".to_string();

        let err = ItineraryError::from_storage(service.update(&group).unwrap_err());
        assert!(err.is_not_found());
    }

    #[test]
    fn test_delete_detaches_events() {
        let (db, trip_id) = setup();
        let groups = GroupService::new(db.connection());
        let events = EventService::new(db.connection());

        let day = DayService::new(db.connection())
            .create(&DayDraft::new(trip_id, "1/19", "Split day").split(true))
            .unwrap();
        let group = groups.create(&draft(trip_id, "A", 0)).unwrap();

        let event = events
            .create(
                &Event::builder()
                    .day(trip_id, day.id)
                    .group(group.id)
                    .time("09:00")
                    .title("Visit Shrine")
                    .build()
                    .unwrap(),
            )
            .unwrap();
        assert_eq!(references(&db, group.id), 1);

        groups.delete(group.id).unwrap();
        assert_eq!(references(&db, group.id), 0);

        let reloaded = events.get(event.id).unwrap().unwrap();
        assert_eq!(reloaded.group_id, None);
        assert_eq!(reloaded.title, "Visit Shrine");
        assert!(groups.get(group.id).unwrap().is_none());
    }

    #[test]
    fn test_delete_missing_group_is_not_found() {
        let (db, _) = setup();
        let service = GroupService::new(db.connection());

        let err = ItineraryError::from_storage(service.delete(GroupId(42)).unwrap_err());
        assert!(err.is_not_found());
    }
}
