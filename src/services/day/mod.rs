//! Day persistence on SQLite.

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, OptionalExtension, Row};

use crate::error::{ItineraryError, RecordKind};
use crate::models::day::{theme_from_token, Day, DayDraft, DayId};
use crate::models::trip::TripId;
use crate::services::database::shared::{now_rfc3339, to_local_datetime};

const DAY_COLUMNS: &str =
    "id, trip_id, day_number, date_label, title, theme, is_split, created_at, updated_at";

pub struct DayService<'a> {
    conn: &'a Connection,
}

impl<'a> DayService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    /// Insert a day. Without an explicit number it becomes the last day of
    /// its trip.
    pub fn create(&self, draft: &DayDraft) -> Result<Day> {
        draft
            .validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Day, e))?;

        let day_number = match draft.day_number {
            Some(number) => number,
            None => self.next_day_number(draft.trip_id)?,
        };

        let now = now_rfc3339();
        self.conn
            .execute(
                "INSERT INTO days (
                    trip_id, day_number, date_label, title, theme, is_split,
                    created_at, updated_at
                 ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                params![
                    draft.trip_id.0,
                    day_number,
                    draft.date_label,
                    draft.title.trim(),
                    draft.theme.token(),
                    draft.is_split as i32,
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert day")?;

        let id = DayId(self.conn.last_insert_rowid());
        self.get(id)?
            .ok_or_else(|| anyhow!("Day {} vanished after insert", id))
    }

    pub fn get(&self, id: DayId) -> Result<Option<Day>> {
        self.conn
            .query_row(
                &format!("SELECT {} FROM days WHERE id = ?1", DAY_COLUMNS),
                [id.0],
                map_day_row,
            )
            .optional()
            .context("Failed to fetch day")
    }

    /// Days of a trip in display order.
    pub fn list_by_trip(&self, trip_id: TripId) -> Result<Vec<Day>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM days WHERE trip_id = ?1 ORDER BY day_number ASC, id ASC",
            DAY_COLUMNS
        ))?;

        let days = stmt
            .query_map([trip_id.0], map_day_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to fetch days")?;

        Ok(days)
    }

    pub fn next_day_number(&self, trip_id: TripId) -> Result<u32> {
        let max: Option<u32> = self
            .conn
            .query_row(
                "SELECT MAX(day_number) FROM days WHERE trip_id = ?1",
                [trip_id.0],
                |row| row.get(0),
            )
            .context("Failed to compute next day number")?;

        Ok(max.map_or(1, |max| max + 1))
    }

    pub fn update(&self, day: &Day) -> Result<Day> {
        day.validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Day, e))?;

        let rows_affected = self
            .conn
            .execute(
                "UPDATE days SET
                    day_number = ?1, date_label = ?2, title = ?3, theme = ?4,
                    is_split = ?5, updated_at = ?6
                 WHERE id = ?7",
                params![
                    day.day_number,
                    day.date_label,
                    day.title.trim(),
                    day.theme.token(),
                    day.is_split as i32,
                    now_rfc3339(),
                    day.id.0,
                ],
            )
            .context("Failed to update day")?;

        if rows_affected == 0 {
            return Err(ItineraryError::not_found(RecordKind::Day, day.id).into());
        }

        self.get(day.id)?
            .ok_or_else(|| ItineraryError::not_found(RecordKind::Day, day.id).into())
    }

    /// Delete a day and its events. Sibling day numbers are left as they are.
    pub fn delete(&self, id: DayId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM days WHERE id = ?1", [id.0])
            .context("Failed to delete day")?;

        if rows_affected == 0 {
            return Err(ItineraryError::not_found(RecordKind::Day, id).into());
        }

        Ok(())
    }
}

fn map_day_row(row: &Row<'_>) -> Result<Day, rusqlite::Error> {
    let theme: String = row.get(5)?;

    Ok(Day {
        id: DayId(row.get(0)?),
        trip_id: TripId(row.get(1)?),
        day_number: row.get(2)?,
        date_label: row.get(3)?,
        title: row.get(4)?,
        theme: theme_from_token(&theme),
        is_split: row.get::<_, i32>(6)? != 0,
        created_at: Some(to_local_datetime(row.get(7)?)?),
        updated_at: Some(to_local_datetime(row.get(8)?)?),
    })
}
