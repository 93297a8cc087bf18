use std::collections::HashMap;

use async_trait::async_trait;

use crate::database::models::{UpdateUser, User};
use crate::database::StoreError;

/// Document-collection operations the directory core needs from a backend:
/// exact-match lookup, insert, whole-record replace, delete-by-filter, an
/// atomic increment-and-fetch counter, and an atomic two-sided array append.
///
/// Backends: [`postgres::PgUserStore`](crate::database::postgres::PgUserStore)
/// for production, [`memory::MemoryStore`](crate::database::memory::MemoryStore)
/// for local development and tests. The handle is injected into each component
/// at construction time; there is no process-wide singleton.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Atomically increment the named counter and return the new value,
    /// creating it at 1 if absent. Safe under concurrent callers.
    async fn counter_next(&self, key: &str) -> Result<i64, StoreError>;

    async fn insert(&self, user: &User) -> Result<(), StoreError>;

    /// Exact-match lookup on uid. `Ok(None)` means no record; errors are
    /// genuine store failures.
    async fn find_by_uid(&self, uid: i64) -> Result<Option<User>, StoreError>;

    /// Unordered full scan. An empty store yields an empty Vec, not an error.
    async fn find_all(&self) -> Result<Vec<User>, StoreError>;

    /// Replace name/age/friends of the record matching `uid`. Returns the
    /// number of matched records; uid itself is never part of the update.
    async fn replace(&self, uid: i64, update: &UpdateUser) -> Result<u64, StoreError>;

    /// Delete the record matching `uid`, returning the number removed.
    async fn delete_by_uid(&self, uid: i64) -> Result<u64, StoreError>;

    /// Append each uid to the other's friend list, both-or-neither. If either
    /// record cannot be updated the whole edge is rolled back and
    /// `StoreError::Conflict` is returned; an asymmetric graph state is never
    /// committed.
    async fn append_friend_edge(&self, source_uid: i64, target_uid: i64)
        -> Result<(), StoreError>;

    /// Display names for the given uids. Missing uids are simply absent from
    /// the map.
    async fn names_for(&self, uids: &[i64]) -> Result<HashMap<i64, String>, StoreError>;

    /// Connectivity probe for health reporting.
    async fn ping(&self) -> Result<(), StoreError>;
}
