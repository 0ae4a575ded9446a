use rusqlite::Connection;
use tracing::info;

use crate::Result;

/// Create the schema if absent. Safe to run on every startup.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS activities (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            idea        TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_activities_created
            ON activities(created_at);

        -- Single-row table holding the shared password hash
        CREATE TABLE IF NOT EXISTS auth (
            id              INTEGER PRIMARY KEY CHECK (id = 1),
            password_hash   TEXT NOT NULL
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
