use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A directory record. `id` is the storage key, assigned at insert and never
/// user-supplied. `uid` is the externally visible sequential identifier,
/// immutable after creation. `friends` holds friend uids, not names, so the
/// relationship survives a rename; display names are resolved at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,
    pub uid: i64,
    pub name: String,
    pub age: i32,
    pub friends: Vec<i64>,
}

/// Create payload. uid and the storage key are assigned by the service;
/// the friend list always starts empty.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub age: i32,
}

/// Whole-record replacement payload. A `uid` in the payload is accepted but
/// ignored: uid is immutable and excluded from the replacement set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<i64>,
    pub name: String,
    pub age: i32,
    #[serde(default)]
    pub friends: Vec<i64>,
}

/// Ephemeral request to link two existing users; not persisted.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FriendRequest {
    pub source_id: i64,
    pub target_id: i64,
}
