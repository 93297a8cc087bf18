use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use crate::database::allocator::UidAllocator;
use crate::database::models::{NewUser, UpdateUser, User};
use crate::database::store::UserStore;
use crate::database::{Deadline, StoreError};

/// CRUD over user records keyed by uid. The store handle and allocator are
/// injected at construction; each request gets its own deadline.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn UserStore>,
    allocator: UidAllocator,
}

impl UserRepository {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        let allocator = UidAllocator::new(store.clone());
        Self { store, allocator }
    }

    /// Allocate a uid, persist the record with an empty friend list, and
    /// return it as stored. If allocation fails, nothing is written.
    pub async fn create(&self, deadline: Deadline, new: NewUser) -> Result<User, StoreError> {
        deadline
            .run(async {
                let uid = self.allocator.next().await?;
                let user = User {
                    id: Uuid::new_v4(),
                    uid,
                    name: new.name,
                    age: new.age,
                    friends: Vec::new(),
                };
                self.store.insert(&user).await?;

                info!(uid, id = %user.id, "created user");
                Ok(user)
            })
            .await
    }

    /// Exact-match lookup on uid.
    pub async fn find_by_uid(&self, deadline: Deadline, uid: i64) -> Result<User, StoreError> {
        deadline
            .run(async {
                self.store
                    .find_by_uid(uid)
                    .await?
                    .ok_or_else(|| StoreError::NotFound(format!("user {} not found", uid)))
            })
            .await
    }

    /// Unordered full scan; an empty store is an empty Vec, not an error.
    pub async fn find_all(&self, deadline: Deadline) -> Result<Vec<User>, StoreError> {
        deadline
            .run(async {
                let users = self.store.find_all().await?;
                info!(count = users.len(), "listed users");
                Ok(users)
            })
            .await
    }

    /// Whole-record replace of everything except uid, which is immutable and
    /// ignored even when present in the payload.
    pub async fn update(
        &self,
        deadline: Deadline,
        update: UpdateUser,
        uid: i64,
    ) -> Result<(), StoreError> {
        deadline
            .run(async {
                if update.uid.is_some_and(|payload_uid| payload_uid != uid) {
                    warn!(uid, payload_uid = ?update.uid, "ignoring uid in update payload");
                }

                let matched = self.store.replace(uid, &update).await?;
                if matched == 0 {
                    return Err(StoreError::NotFound(format!("user {} not found", uid)));
                }

                info!(uid, "updated user");
                Ok(())
            })
            .await
    }

    /// Remove the record matching uid.
    pub async fn delete(&self, deadline: Deadline, uid: i64) -> Result<(), StoreError> {
        deadline
            .run(async {
                let removed = self.store.delete_by_uid(uid).await?;
                if removed == 0 {
                    return Err(StoreError::NotFound(format!("user {} not found", uid)));
                }

                info!(uid, "deleted user");
                Ok(())
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;

    fn repo() -> UserRepository {
        UserRepository::new(Arc::new(MemoryStore::new()))
    }

    fn new_user(name: &str, age: i32) -> NewUser {
        NewUser {
            name: name.to_string(),
            age,
        }
    }

    #[tokio::test]
    async fn create_then_find_returns_matching_record() {
        let repo = repo();
        let created = repo
            .create(Deadline::default(), new_user("Ann", 30))
            .await
            .unwrap();
        assert_eq!(created.uid, 1);
        assert!(created.friends.is_empty());

        let found = repo.find_by_uid(Deadline::default(), created.uid).await.unwrap();
        assert_eq!(found.name, "Ann");
        assert_eq!(found.age, 30);
    }

    #[tokio::test]
    async fn concurrent_creates_get_distinct_uids() {
        let repo = repo();

        let mut handles = Vec::new();
        for i in 0..16 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.create(Deadline::default(), new_user(&format!("u{}", i), i))
                    .await
                    .unwrap()
                    .uid
            }));
        }

        let mut uids = Vec::new();
        for handle in handles {
            uids.push(handle.await.unwrap());
        }
        uids.sort_unstable();
        uids.dedup();
        assert_eq!(uids.len(), 16);
    }

    #[tokio::test]
    async fn find_all_on_empty_store_is_empty_not_error() {
        let repo = repo();
        let users = repo.find_all(Deadline::default()).await.unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn update_never_changes_uid() {
        let repo = repo();
        let created = repo
            .create(Deadline::default(), new_user("Ann", 30))
            .await
            .unwrap();

        // Payload claims a different uid; it must be ignored.
        let update = UpdateUser {
            uid: Some(999),
            name: "Anna".to_string(),
            age: 31,
            friends: vec![],
        };
        repo.update(Deadline::default(), update, created.uid)
            .await
            .unwrap();

        let found = repo.find_by_uid(Deadline::default(), created.uid).await.unwrap();
        assert_eq!(found.uid, created.uid);
        assert_eq!(found.name, "Anna");
        assert_eq!(found.age, 31);

        let missing = repo.find_by_uid(Deadline::default(), 999).await;
        assert!(matches!(missing, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn update_missing_user_is_not_found() {
        let repo = repo();
        let update = UpdateUser {
            uid: None,
            name: "ghost".to_string(),
            age: 0,
            friends: vec![],
        };
        let result = repo.update(Deadline::default(), update, 42).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_then_find_is_not_found() {
        let repo = repo();
        let created = repo
            .create(Deadline::default(), new_user("Bob", 31))
            .await
            .unwrap();

        repo.delete(Deadline::default(), created.uid).await.unwrap();

        let result = repo.find_by_uid(Deadline::default(), created.uid).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        let again = repo.delete(Deadline::default(), created.uid).await;
        assert!(matches!(again, Err(StoreError::NotFound(_))));
    }
}
