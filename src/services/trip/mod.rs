//! Trip persistence on SQLite.

use anyhow::{anyhow, Context, Result};
use rusqlite::{params, Connection, Row};

use crate::error::{ItineraryError, RecordKind};
use crate::models::trip::{Trip, TripDraft, TripId};
use crate::services::database::shared::{
    format_date, now_rfc3339, to_local_datetime, to_naive_date,
};

const TRIP_COLUMNS: &str = "id, title, start_date, end_date, created_at, updated_at";

/// Service for managing trips stored in SQLite.
pub struct TripService<'a> {
    conn: &'a Connection,
}

impl<'a> TripService<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    pub fn create(&self, draft: &TripDraft) -> Result<Trip> {
        draft
            .validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Trip, e))?;

        let now = now_rfc3339();
        self.conn
            .execute(
                "INSERT INTO trips (title, start_date, end_date, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    draft.title.trim(),
                    format_date(draft.start_date),
                    format_date(draft.end_date),
                    &now,
                    &now,
                ],
            )
            .context("Failed to insert trip")?;

        let id = TripId(self.conn.last_insert_rowid());
        self.get(id)?
            .ok_or_else(|| anyhow!("Trip {} vanished after insert", id))
    }

    pub fn get(&self, id: TripId) -> Result<Option<Trip>> {
        let result = self.conn.query_row(
            &format!("SELECT {} FROM trips WHERE id = ?1", TRIP_COLUMNS),
            [id.0],
            map_trip_row,
        );

        match result {
            Ok(trip) => Ok(Some(trip)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e).context("Failed to fetch trip"),
        }
    }

    pub fn list_all(&self) -> Result<Vec<Trip>> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {} FROM trips ORDER BY created_at DESC, id DESC",
            TRIP_COLUMNS
        ))?;

        let trips = stmt
            .query_map([], map_trip_row)?
            .collect::<rusqlite::Result<Vec<_>>>()
            .context("Failed to fetch trips")?;

        Ok(trips)
    }

    pub fn update(&self, trip: &Trip) -> Result<Trip> {
        trip.validate()
            .map_err(|e| ItineraryError::validation(RecordKind::Trip, e))?;

        let rows_affected = self
            .conn
            .execute(
                "UPDATE trips SET title = ?1, start_date = ?2, end_date = ?3, updated_at = ?4
                 WHERE id = ?5",
                params![
                    trip.title.trim(),
                    format_date(trip.start_date),
                    format_date(trip.end_date),
                    now_rfc3339(),
                    trip.id.0,
                ],
            )
            .context("Failed to update trip")?;

        if rows_affected == 0 {
            return Err(ItineraryError::not_found(RecordKind::Trip, trip.id).into());
        }

        self.get(trip.id)?
            .ok_or_else(|| ItineraryError::not_found(RecordKind::Trip, trip.id).into())
    }

    /// Delete a trip together with every day, group and event it owns.
    pub fn delete(&self, id: TripId) -> Result<()> {
        let rows_affected = self
            .conn
            .execute("DELETE FROM trips WHERE id = ?1", [id.0])
            .context("Failed to delete trip")?;

        if rows_affected == 0 {
            return Err(ItineraryError::not_found(RecordKind::Trip, id).into());
        }

        Ok(())
    }
}

fn map_trip_row(row: &Row<'_>) -> Result<Trip, rusqlite::Error> {
    Ok(Trip {
        id: TripId(row.get(0)?),
        title: row.get(1)?,
        start_date: to_naive_date(row.get(2)?)?,
        end_date: to_naive_date(row.get(3)?)?,
        created_at: Some(to_local_datetime(row.get(4)?)?),
        updated_at: Some(to_local_datetime(row.get(5)?)?),
    })
}
