use super::shared::{map_event_row, EVENT_COLUMNS};
use super::EventService;
use crate::models::day::DayId;
use crate::models::event::Event;
use crate::models::trip::TripId;
use anyhow::{Context, Result};

impl<'a> EventService<'a> {
    /// Events of one day in display order.
    pub fn list_by_day(&self, day_id: DayId) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM events
             WHERE day_id = ?
             ORDER BY order_index ASC, id ASC",
            EVENT_COLUMNS
        ))?;

        let events = stmt
            .query_map([day_id.0], map_event_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to fetch events for day")?;

        Ok(events)
    }

    /// Every event of a trip, grouped by day in day order.
    pub fn list_by_trip(&self, trip_id: TripId) -> Result<Vec<Event>> {
        let mut stmt = self.conn.prepare(
            "SELECT e.id, e.day_id, e.trip_id, e.group_id, e.time, e.title, e.description,
                    e.location, e.category, e.order_index, e.created_at, e.updated_at
             FROM events e
             JOIN days d ON d.id = e.day_id
             WHERE e.trip_id = ?
             ORDER BY d.day_number ASC, e.order_index ASC, e.id ASC",
        )?;

        let events = stmt
            .query_map([trip_id.0], map_event_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to fetch events for trip")?;

        Ok(events)
    }
}
