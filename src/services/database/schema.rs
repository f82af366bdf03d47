use anyhow::{Context, Result};
use rusqlite::Connection;

use super::migrations;

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    create_trips_table(conn)?;
    create_days_table(conn)?;
    create_groups_table(conn)?;
    create_events_table(conn)?;
    run_migrations(conn)?;
    create_indexes(conn)?;
    Ok(())
}

fn create_trips_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS trips (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL,
            start_date TEXT NOT NULL,
            end_date TEXT NOT NULL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create trips table")?;

    Ok(())
}

fn create_days_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS days (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            day_number INTEGER NOT NULL,
            date_label TEXT NOT NULL DEFAULT '',
            title TEXT NOT NULL,
            theme TEXT NOT NULL DEFAULT 'green',
            is_split INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create days table")?;

    Ok(())
}

fn create_groups_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS trip_groups (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            name TEXT NOT NULL,
            color TEXT NOT NULL DEFAULT 'pink',
            order_index INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create trip_groups table")?;

    Ok(())
}

fn create_events_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            day_id INTEGER NOT NULL REFERENCES days(id) ON DELETE CASCADE,
            trip_id INTEGER NOT NULL REFERENCES trips(id) ON DELETE CASCADE,
            group_id INTEGER REFERENCES trip_groups(id) ON DELETE SET NULL,
            time TEXT,
            title TEXT NOT NULL,
            description TEXT,
            location TEXT,
            category TEXT NOT NULL DEFAULT 'sight',
            order_index INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )
    .context("Failed to create events table")?;

    Ok(())
}

/// Columns added after the first release. `CREATE TABLE IF NOT EXISTS` leaves
/// older files untouched, so they are patched here.
fn run_migrations(conn: &Connection) -> Result<()> {
    migrations::ensure_column(
        conn,
        "days",
        "is_split",
        "ALTER TABLE days ADD COLUMN is_split INTEGER NOT NULL DEFAULT 0",
    )?;

    migrations::ensure_column(
        conn,
        "events",
        "order_index",
        "ALTER TABLE events ADD COLUMN order_index INTEGER NOT NULL DEFAULT 0",
    )?;

    Ok(())
}

fn create_indexes(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_days_trip ON days(trip_id, day_number);
         CREATE INDEX IF NOT EXISTS idx_groups_trip ON trip_groups(trip_id, order_index);
         CREATE INDEX IF NOT EXISTS idx_events_day ON events(day_id, order_index);
         CREATE INDEX IF NOT EXISTS idx_events_group ON events(group_id);",
    )
    .context("Failed to create indexes")?;

    Ok(())
}
