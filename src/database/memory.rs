use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::database::models::{UpdateUser, User};
use crate::database::store::UserStore;
use crate::database::StoreError;

/// In-memory backend: one mutex over the whole collection, so every trait
/// operation is atomic by construction. Used for local development
/// (`ROSTER_STORE=memory`) and hermetic tests; data does not survive restart.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    counters: HashMap<String, i64>,
    users: Vec<User>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn counter_next(&self, key: &str) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().await;
        let seq = inner.counters.entry(key.to_string()).or_insert(0);
        *seq += 1;
        Ok(*seq)
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;
        if inner.users.iter().any(|u| u.uid == user.uid) {
            return Err(StoreError::Conflict(format!(
                "duplicate uid {} on insert",
                user.uid
            )));
        }
        inner.users.push(user.clone());
        Ok(())
    }

    async fn find_by_uid(&self, uid: i64) -> Result<Option<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.iter().find(|u| u.uid == uid).cloned())
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner.users.clone())
    }

    async fn replace(&self, uid: i64, update: &UpdateUser) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        match inner.users.iter_mut().find(|u| u.uid == uid) {
            Some(user) => {
                user.name = update.name.clone();
                user.age = update.age;
                user.friends = update.friends.clone();
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn delete_by_uid(&self, uid: i64) -> Result<u64, StoreError> {
        let mut inner = self.inner.lock().await;
        let before = inner.users.len();
        inner.users.retain(|u| u.uid != uid);
        Ok((before - inner.users.len()) as u64)
    }

    async fn append_friend_edge(
        &self,
        source_uid: i64,
        target_uid: i64,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().await;

        // Verify both sides before touching either, mirroring the transaction
        // semantics of the Postgres backend.
        for uid in [source_uid, target_uid] {
            if !inner.users.iter().any(|u| u.uid == uid) {
                return Err(StoreError::Conflict(format!(
                    "user {} was removed while linking friends",
                    uid
                )));
            }
        }

        for (uid, friend_uid) in [(source_uid, target_uid), (target_uid, source_uid)] {
            if let Some(user) = inner.users.iter_mut().find(|u| u.uid == uid) {
                user.friends.push(friend_uid);
            }
        }
        Ok(())
    }

    async fn names_for(&self, uids: &[i64]) -> Result<HashMap<i64, String>, StoreError> {
        let inner = self.inner.lock().await;
        Ok(inner
            .users
            .iter()
            .filter(|u| uids.contains(&u.uid))
            .map(|u| (u.uid, u.name.clone()))
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
