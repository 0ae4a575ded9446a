/// Database row types. These map directly to SQLite rows and stay
/// independent of the wire types in ideabox-types.

#[derive(Debug, Clone)]
pub struct ActivityRow {
    pub id: i64,
    pub idea: String,
    /// SQLite `datetime('now')` text, `YYYY-MM-DD HH:MM:SS` in UTC.
    pub created_at: String,
}
