use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

#[derive(
    Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize, sqlx::Type,
)]
#[sqlx(transparent)]
pub struct UserId(pub uuid::Uuid);

impl UserId {
    pub fn fresh() -> Self {
        UserId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(UserId)
    }
}

/// An order-normalized friendship edge. A friendship between two users is a
/// single pair regardless of which side initiated it, so both directions of
/// the relation derive from one stored row.
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct UserPair(UserId, UserId);

impl UserPair {
    pub fn new(a: UserId, b: UserId) -> Self {
        if a < b { Self(a, b) } else { Self(b, a) }
    }

    pub fn min(&self) -> UserId {
        self.0
    }

    pub fn max(&self) -> UserId {
        self.1
    }
}

/// A stored user with its friendship adjacency resolved to ids.
///
/// The popularity score is deliberately absent here: it is derived state,
/// recomputed on every read that needs it (see `domain_model::score`).
#[derive(Debug, Clone)]
pub struct User {
    pub id: UserId,
    pub username: String,
    pub age: u32,
    pub hobbies: HashSet<String>,
    pub friends: HashSet<UserId>,
    pub created_at: DateTime<Utc>,
}

/// Input for user creation. Id and creation timestamp are assigned by the
/// service, never taken from the caller.
#[derive(Debug, Clone)]
pub struct UserDraft {
    pub username: String,
    pub age: u32,
    pub hobbies: Option<HashSet<String>>,
}

/// Input for user update. Replaces username, age and hobbies; friends and
/// created_at are not touchable through this shape.
#[derive(Debug, Clone)]
pub struct UserPatch {
    pub username: String,
    pub age: u32,
    pub hobbies: Option<HashSet<String>>,
}

/// The external-facing projection of a user: friend ids only, never nested
/// user objects, plus a freshly computed popularity score.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    pub username: String,
    pub age: u32,
    pub hobbies: HashSet<String>,
    pub popularity_score: f64,
    pub friend_ids: HashSet<UserId>,
}
