use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Fields accepted when creating a user.
///
/// Both are optional on purpose: an absent value is bound as `NULL` and the
/// table's `NOT NULL` constraints reject it at insert time.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewUser {
    pub username: Option<String>,
    pub email: Option<String>,
}

impl NewUser {
    pub fn new(username: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            email: Some(email.into()),
        }
    }
}
