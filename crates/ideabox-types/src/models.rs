use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A stored activity idea. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activity {
    pub id: i64,
    pub idea: String,
    pub created_at: DateTime<Utc>,
}
