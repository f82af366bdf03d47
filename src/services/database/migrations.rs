use anyhow::{Context, Result};
use rusqlite::Connection;

/// Checks whether a column exists on a table.
pub fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool> {
    let exists: i32 = conn
        .query_row(
            "SELECT COUNT(*) FROM pragma_table_info(?1) WHERE name = ?2",
            [table, column],
            |row| row.get(0),
        )
        .context("Failed to inspect table info")?;

    Ok(exists > 0)
}

/// Adds a column if it does not already exist.
pub fn ensure_column(conn: &Connection, table: &str, column: &str, ddl: &str) -> Result<()> {
    if column_exists(conn, table, column)? {
        return Ok(());
    }

    log::info!("Migrating schema: adding {}.{}", table, column);
    conn.execute(ddl, [])
        .with_context(|| format!("Failed to add {}.{}", table, column))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_column_adds_missing_column_once() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute(
            "CREATE TABLE days (id INTEGER PRIMARY KEY, title TEXT NOT NULL)",
            [],
        )
        .unwrap();

        let ddl = "ALTER TABLE days ADD COLUMN is_split INTEGER NOT NULL DEFAULT 0";
        assert!(!column_exists(&conn, "days", "is_split").unwrap());

        ensure_column(&conn, "days", "is_split", ddl).unwrap();
        assert!(column_exists(&conn, "days", "is_split").unwrap());

        // Second call must be a no-op rather than a duplicate-column error.
        ensure_column(&conn, "days", "is_split", ddl).unwrap();
    }
}
