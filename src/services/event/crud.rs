use super::shared::{map_event_row, EVENT_COLUMNS};
use super::EventService;
use crate::error::{ItineraryError, RecordKind};
use crate::models::day::DayId;
use crate::models::event::{Event, EventDraft, EventId};
use crate::services::database::shared::now_rfc3339;
use anyhow::{anyhow, Context, Result};
use rusqlite::{params, OptionalExtension};

impl<'a> EventService<'a> {
    /// Create a new event. Without an explicit position it is appended after
    /// the day's last event.
    pub fn create(&self, draft: &EventDraft) -> Result<Event> {
        draft
            .validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Event, e))?;

        let order_index = match draft.order_index {
            Some(order_index) => order_index,
            None => self.next_order_index(draft.day_id)?,
        };

        let now = now_rfc3339();
        self.conn
            .execute(
                "INSERT INTO events (
                    day_id, trip_id, group_id, time, title, description, location,
                    category, order_index, created_at, updated_at
                ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    draft.day_id.0,
                    draft.trip_id.0,
                    draft.group_id.map(|id| id.0),
                    draft.time,
                    draft.title.trim(),
                    draft.description,
                    draft.location,
                    draft.category.token(),
                    order_index,
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert event")?;

        let id = EventId(self.conn.last_insert_rowid());
        self.get(id)?
            .ok_or_else(|| anyhow!("Event {} vanished after insert", id))
    }

    /// Retrieve an event by ID.
    pub fn get(&self, id: EventId) -> Result<Option<Event>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM events WHERE id = ?", EVENT_COLUMNS),
                [id.0],
                map_event_row,
            )
            .optional()
            .context("Failed to fetch event")
    }

    /// Update an existing event and return the stored record.
    pub fn update(&self, event: &Event) -> Result<Event> {
        event
            .validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Event, e))?;

        let rows_affected = self
            .conn
            .execute(
                "UPDATE events SET
                    day_id = ?, group_id = ?, time = ?, title = ?, description = ?,
                    location = ?, category = ?, order_index = ?, updated_at = ?
                 WHERE id = ?",
                params![
                    event.day_id.0,
                    event.group_id.map(|id| id.0),
                    event.time,
                    event.title.trim(),
                    event.description,
                    event.location,
                    event.category.token(),
                    event.order_index,
                    now_rfc3339(),
                    event.id.0,
                ],
            )
            .context("Failed to update event")?;

        if rows_affected == 0 {
            return Err(ItineraryError::not_found(RecordKind::Event, event.id).into());
        }

        self.get(event.id)?
            .ok_or_else(|| ItineraryError::not_found(RecordKind::Event, event.id).into())
    }

    /// Delete an event by ID.
    pub fn delete(&self, id: EventId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM events WHERE id = ?", [id.0])
            .context("Failed to delete event")?;

        if rows_affected == 0 {
            return Err(ItineraryError::not_found(RecordKind::Event, id).into());
        }

        Ok(())
    }

    fn next_order_index(&self, day_id: DayId) -> Result<i64> {
        let max: Option<i64> = self
            .conn
            .query_row(
                "SELECT MAX(order_index) FROM events WHERE day_id = ?",
                [day_id.0],
                |row| row.get(0),
            )
            .context("Failed to compute next event position")?;

        Ok(max.map_or(0, |max| max + 1))
    }
}
