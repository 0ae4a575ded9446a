use std::sync::Arc;

use tracing::{debug, info, warn};

use ideabox_db::models::ActivityRow;
use ideabox_db::queries::DEFAULT_PASSWORD;
use ideabox_db::{Database, StoreError};
use ideabox_types::models::Activity;

use crate::error::ApiError;
use crate::password::Passwords;
use crate::session::{Session, SessionStore, generate_token};

/// Minimum length accepted by change-password, in UTF-16 code units.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Proof that a request carried a live session token. Only
/// [`Gateway::require_auth`] hands these out, and every protected
/// operation takes one.
#[derive(Debug, Clone)]
pub struct Authorized {
    token: String,
}

impl Authorized {
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Credential checks, session lifecycle and the protected store operations.
///
/// All methods block (SQLite and Argon2); async callers should go through
/// `spawn_blocking`.
pub struct Gateway {
    db: Database,
    sessions: Arc<dyn SessionStore>,
    passwords: Passwords,
}

impl Gateway {
    pub fn new(db: Database, sessions: Arc<dyn SessionStore>, passwords: Passwords) -> Self {
        Self {
            db,
            sessions,
            passwords,
        }
    }

    /// Seed the default password on first run, and complain while it is still in use.
    pub fn bootstrap(&self) -> ideabox_db::Result<()> {
        let seeded = self.db.initialize(|password| {
            self.passwords
                .hash(password)
                .map_err(|e| StoreError::Hash(e.to_string()))
        })?;

        let still_default = seeded || {
            let hash = self.db.get_password_hash()?;
            self.passwords
                .verify(DEFAULT_PASSWORD, &hash)
                .map_err(|e| StoreError::Hash(e.to_string()))?
        };
        if still_default {
            warn!(
                "Default password is \"{}\" - please change it after first login!",
                DEFAULT_PASSWORD
            );
        }

        info!("{} activities stored", self.db.activity_count()?);
        Ok(())
    }

    // -- Sessions --

    /// Verify the shared password and open a new session. Returns its token.
    pub fn login(&self, password: Option<&str>) -> Result<String, ApiError> {
        let password = password
            .filter(|p| !p.is_empty())
            .ok_or(ApiError::Validation("Password required"))?;

        let hash = self
            .db
            .get_password_hash()
            .map_err(|e| ApiError::internal("Login failed", e))?;

        let valid = self
            .passwords
            .verify(password, &hash)
            .map_err(|e| ApiError::internal("Login failed", e))?;
        if !valid {
            warn!("Rejected login attempt with invalid password");
            return Err(ApiError::Unauthorized("Invalid password"));
        }

        let token = generate_token();
        self.sessions.set(token.clone(), Session::new());
        debug!("Session opened");
        Ok(token)
    }

    /// Drop the session for `token`. Unknown or missing tokens are ignored.
    pub fn logout(&self, token: Option<&str>) {
        if let Some(token) = token {
            if self.sessions.delete(token).is_some() {
                debug!("Session closed");
            }
        }
    }

    pub fn check_auth(&self, token: Option<&str>) -> bool {
        token.is_some_and(|t| self.sessions.get(t).is_some())
    }

    pub fn require_auth(&self, token: Option<&str>) -> Result<Authorized, ApiError> {
        match token {
            Some(token) if self.check_auth(Some(token)) => Ok(Authorized {
                token: token.to_string(),
            }),
            _ => Err(ApiError::Unauthorized("Unauthorized")),
        }
    }

    /// Replace the shared password. Existing sessions stay valid.
    pub fn change_password(
        &self,
        _auth: &Authorized,
        new_password: Option<&str>,
    ) -> Result<(), ApiError> {
        let new_password = new_password
            .filter(|p| p.encode_utf16().count() >= MIN_PASSWORD_LEN)
            .ok_or(ApiError::Validation("Password must be at least 4 characters"))?;

        let hash = self
            .passwords
            .hash(new_password)
            .map_err(|e| ApiError::internal("Failed to update password", e))?;

        self.db
            .set_password_hash(&hash)
            .map_err(ApiError::from_store("Failed to update password"))?;

        info!("Password changed");
        Ok(())
    }

    // -- Activities --

    pub fn list_activities(&self, _auth: &Authorized) -> Result<Vec<Activity>, ApiError> {
        let rows = self
            .db
            .list_activities()
            .map_err(ApiError::from_store("Failed to fetch activities"))?;
        rows.into_iter()
            .map(|row| to_activity(row, "Failed to fetch activities"))
            .collect()
    }

    pub fn add_activity(
        &self,
        _auth: &Authorized,
        idea: Option<&str>,
    ) -> Result<Activity, ApiError> {
        // Checked here as well as in the store so a blank idea never takes the DB lock
        let idea = idea
            .map(str::trim)
            .filter(|i| !i.is_empty())
            .ok_or(ApiError::Validation("Idea is required"))?;

        let row = self
            .db
            .add_activity(idea)
            .map_err(ApiError::from_store("Failed to add activity"))?;
        to_activity(row, "Failed to add activity")
    }

    pub fn random_activity(&self, _auth: &Authorized) -> Result<Activity, ApiError> {
        match self.db.random_activity() {
            Ok(row) => to_activity(row, "Failed to fetch random activity"),
            Err(StoreError::NotFound) => Err(ApiError::NotFound("No activities found")),
            Err(e) => Err(ApiError::internal("Failed to fetch random activity", e)),
        }
    }

    /// Succeeds whether or not `id` existed.
    pub fn delete_activity(&self, _auth: &Authorized, id: i64) -> Result<(), ApiError> {
        self.db
            .delete_activity(id)
            .map_err(ApiError::from_store("Failed to delete activity"))
    }
}

/// A timestamp that fails to parse is a corrupt row, reported as `context`.
fn to_activity(row: ActivityRow, context: &'static str) -> Result<Activity, ApiError> {
    let created_at = row
        .created_at
        .parse::<chrono::DateTime<chrono::Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            chrono::NaiveDateTime::parse_from_str(&row.created_at, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .map_err(|e| {
            ApiError::internal(
                context,
                format!("corrupt created_at '{}' on activity {}: {}", row.created_at, row.id, e),
            )
        })?;

    Ok(Activity {
        id: row.id,
        idea: row.idea,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemorySessionStore;
    use argon2::{Algorithm, Argon2, Params, Version};

    fn gateway() -> Gateway {
        let params = Params::new(Params::MIN_M_COST, 1, 1, None).unwrap();
        let passwords = Passwords::new(Argon2::new(Algorithm::Argon2id, Version::V0x13, params));
        let gateway = Gateway::new(
            Database::open_in_memory().unwrap(),
            Arc::new(MemorySessionStore::new()),
            passwords,
        );
        gateway.bootstrap().unwrap();
        gateway
    }

    fn login(gateway: &Gateway) -> Authorized {
        let token = gateway.login(Some("password")).unwrap();
        gateway.require_auth(Some(&token)).unwrap()
    }

    #[test]
    fn default_password_works_after_bootstrap() {
        let gateway = gateway();
        let token = gateway.login(Some("password")).unwrap();
        assert!(gateway.check_auth(Some(&token)));
    }

    #[test]
    fn bootstrap_is_idempotent() {
        let gateway = gateway();
        gateway.bootstrap().unwrap();
        assert!(gateway.login(Some("password")).is_ok());
    }

    #[test]
    fn login_rejects_wrong_and_missing_password() {
        let gateway = gateway();
        assert!(matches!(
            gateway.login(Some("wrong")),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(matches!(gateway.login(None), Err(ApiError::Validation(_))));
        assert!(matches!(gateway.login(Some("")), Err(ApiError::Validation(_))));
    }

    #[test]
    fn each_login_issues_distinct_token() {
        let gateway = gateway();
        let a = gateway.login(Some("password")).unwrap();
        let b = gateway.login(Some("password")).unwrap();
        assert_ne!(a, b);
        assert!(gateway.check_auth(Some(&a)));
        assert!(gateway.check_auth(Some(&b)));
    }

    #[test]
    fn check_auth_requires_live_token() {
        let gateway = gateway();
        assert!(!gateway.check_auth(None));
        assert!(!gateway.check_auth(Some("")));
        assert!(!gateway.check_auth(Some("deadbeef")));
        assert!(matches!(
            gateway.require_auth(Some("deadbeef")),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn logout_revokes_token_and_never_fails() {
        let gateway = gateway();
        let auth = login(&gateway);
        let token = auth.token().to_string();

        gateway.logout(Some(&token));
        assert!(!gateway.check_auth(Some(&token)));
        assert!(matches!(
            gateway.require_auth(Some(&token)),
            Err(ApiError::Unauthorized(_))
        ));

        // Repeated or tokenless logout is harmless
        gateway.logout(Some(&token));
        gateway.logout(None);
    }

    #[test]
    fn change_password_swaps_credentials() {
        let gateway = gateway();
        let auth = login(&gateway);

        gateway.change_password(&auth, Some("newpass")).unwrap();

        assert!(matches!(
            gateway.login(Some("password")),
            Err(ApiError::Unauthorized(_))
        ));
        assert!(gateway.login(Some("newpass")).is_ok());
        // The session used for the change is still live
        assert!(gateway.check_auth(Some(auth.token())));
    }

    #[test]
    fn change_password_enforces_min_length() {
        let gateway = gateway();
        let auth = login(&gateway);

        for short in [None, Some(""), Some("abc")] {
            assert!(matches!(
                gateway.change_password(&auth, short),
                Err(ApiError::Validation(_))
            ));
        }
        assert!(gateway.login(Some("password")).is_ok());

        gateway.change_password(&auth, Some("abcd")).unwrap();
        assert!(gateway.login(Some("abcd")).is_ok());
    }

    #[test]
    fn change_password_counts_utf16_units() {
        let gateway = gateway();
        let auth = login(&gateway);

        // One astral-plane char is two UTF-16 units
        assert!(matches!(
            gateway.change_password(&auth, Some("\u{1F600}")),
            Err(ApiError::Validation(_))
        ));

        gateway.change_password(&auth, Some("\u{1F600}\u{1F600}")).unwrap();
        assert!(gateway.login(Some("\u{1F600}\u{1F600}")).is_ok());
    }

    #[test]
    fn juggling_scenario() {
        let gateway = gateway();
        let auth = login(&gateway);

        let added = gateway.add_activity(&auth, Some("Learn juggling")).unwrap();
        assert_eq!(added.id, 1);
        assert_eq!(added.idea, "Learn juggling");

        let list = gateway.list_activities(&auth).unwrap();
        assert_eq!(list, vec![added.clone()]);

        gateway.delete_activity(&auth, added.id).unwrap();
        assert!(gateway.list_activities(&auth).unwrap().is_empty());
    }

    #[test]
    fn add_activity_validates_and_trims() {
        let gateway = gateway();
        let auth = login(&gateway);

        for blank in [None, Some(""), Some("   ")] {
            assert!(matches!(
                gateway.add_activity(&auth, blank),
                Err(ApiError::Validation("Idea is required"))
            ));
        }

        let added = gateway.add_activity(&auth, Some("  Fly a kite ")).unwrap();
        assert_eq!(added.idea, "Fly a kite");
    }

    #[test]
    fn random_activity_not_found_then_member() {
        let gateway = gateway();
        let auth = login(&gateway);

        assert!(matches!(
            gateway.random_activity(&auth),
            Err(ApiError::NotFound(_))
        ));

        let a = gateway.add_activity(&auth, Some("Read")).unwrap();
        let b = gateway.add_activity(&auth, Some("Swim")).unwrap();
        let pick = gateway.random_activity(&auth).unwrap();
        assert!(pick == a || pick == b);
    }

    #[test]
    fn delete_missing_leaves_set_unchanged() {
        let gateway = gateway();
        let auth = login(&gateway);
        gateway.add_activity(&auth, Some("Garden")).unwrap();

        gateway.delete_activity(&auth, 999).unwrap();
        assert_eq!(gateway.list_activities(&auth).unwrap().len(), 1);
    }

    #[test]
    fn timestamps_parse_from_sqlite_format() {
        let activity = to_activity(
            ActivityRow {
                id: 7,
                idea: "Stargaze".into(),
                created_at: "2026-10-19 21:15:00".into(),
            },
            "ctx",
        )
        .unwrap();
        assert_eq!(activity.created_at.to_rfc3339(), "2026-10-19T21:15:00+00:00");
    }

    #[test]
    fn corrupt_timestamp_is_internal_error() {
        let result = to_activity(
            ActivityRow {
                id: 8,
                idea: "Kayak".into(),
                created_at: "yesterday-ish".into(),
            },
            "Failed to fetch activities",
        );
        assert!(matches!(
            result,
            Err(ApiError::Internal("Failed to fetch activities"))
        ));
    }

    #[test]
    fn corrupt_row_fails_listing() {
        let gateway = gateway();
        let auth = login(&gateway);
        gateway.add_activity(&auth, Some("Sail")).unwrap();
        gateway
            .db
            .with_conn(|conn| {
                conn.execute("UPDATE activities SET created_at = 'garbage'", [])?;
                Ok(())
            })
            .unwrap();

        assert!(matches!(
            gateway.list_activities(&auth),
            Err(ApiError::Internal(_))
        ));
    }
}
