use rusqlite::Connection;
use tracing::warn;

use crate::models::ActivityRow;
use crate::{Database, Result, StoreError};

/// Well-known password seeded on first run. Operators are expected to change it.
pub const DEFAULT_PASSWORD: &str = "password";

impl Database {
    // -- Bootstrap --

    /// Seed the auth record with a hash of [`DEFAULT_PASSWORD`] if none exists.
    /// `hash` is only invoked when seeding. Returns true if the record was created.
    pub fn initialize<F>(&self, hash: F) -> Result<bool>
    where
        F: FnOnce(&str) -> Result<String>,
    {
        self.with_conn(|conn| {
            let existing: Option<String> = conn
                .query_row("SELECT password_hash FROM auth WHERE id = 1", [], |row| {
                    row.get(0)
                })
                .optional()?;
            if existing.is_some() {
                return Ok(false);
            }

            let password_hash = hash(DEFAULT_PASSWORD)?;
            conn.execute(
                "INSERT OR IGNORE INTO auth (id, password_hash) VALUES (1, ?1)",
                [&password_hash],
            )?;

            warn!(
                "No password configured, seeded default password \"{}\". \
                 Change it after first login!",
                DEFAULT_PASSWORD
            );
            Ok(true)
        })
    }

    // -- Activities --

    /// All activities, newest first.
    pub fn list_activities(&self) -> Result<Vec<ActivityRow>> {
        self.with_conn(query_activities)
    }

    /// Store a new activity. The text is trimmed and must not be empty.
    pub fn add_activity(&self, idea: &str) -> Result<ActivityRow> {
        let idea = idea.trim();
        if idea.is_empty() {
            return Err(StoreError::Validation("Idea is required"));
        }

        self.with_conn(|conn| {
            let row = conn.query_row(
                "INSERT INTO activities (idea) VALUES (?1) RETURNING id, idea, created_at",
                [idea],
                map_activity,
            )?;
            Ok(row)
        })
    }

    /// Uniformly random activity, or `NotFound` when the table is empty.
    pub fn random_activity(&self) -> Result<ActivityRow> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT id, idea, created_at FROM activities ORDER BY RANDOM() LIMIT 1",
                [],
                map_activity,
            )
            .optional()?
            .ok_or(StoreError::NotFound)
        })
    }

    /// Delete by id. A missing id is not an error.
    pub fn delete_activity(&self, id: i64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM activities WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn activity_count(&self) -> Result<u64> {
        self.with_conn(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM activities", [], |row| row.get(0))?;
            Ok(count as u64)
        })
    }

    // -- Auth --

    pub fn get_password_hash(&self) -> Result<String> {
        self.with_conn(|conn| {
            conn.query_row("SELECT password_hash FROM auth WHERE id = 1", [], |row| {
                row.get(0)
            })
            .optional()?
            .ok_or(StoreError::NotFound)
        })
    }

    pub fn set_password_hash(&self, password_hash: &str) -> Result<()> {
        self.with_conn(|conn| {
            let updated = conn.execute(
                "UPDATE auth SET password_hash = ?1 WHERE id = 1",
                [password_hash],
            )?;
            if updated == 0 {
                return Err(StoreError::NotFound);
            }
            Ok(())
        })
    }
}

fn query_activities(conn: &Connection) -> Result<Vec<ActivityRow>> {
    // id breaks ties between inserts landing in the same second
    let mut stmt = conn.prepare(
        "SELECT id, idea, created_at FROM activities ORDER BY created_at DESC, id DESC",
    )?;

    let rows = stmt
        .query_map([], map_activity)?
        .collect::<std::result::Result<Vec<_>, _>>()?;

    Ok(rows)
}

fn map_activity(row: &rusqlite::Row<'_>) -> rusqlite::Result<ActivityRow> {
    Ok(ActivityRow {
        id: row.get(0)?,
        idea: row.get(1)?,
        created_at: row.get(2)?,
    })
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
