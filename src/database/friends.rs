use std::sync::Arc;

use tracing::info;

use crate::database::models::{FriendRequest, User};
use crate::database::store::UserStore;
use crate::database::{Deadline, StoreError};

/// Maintains the symmetric friend edge between two user records.
#[derive(Clone)]
pub struct FriendGraph {
    store: Arc<dyn UserStore>,
}

impl FriendGraph {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Link two users. Both sides are resolved before anything is written; a
    /// missing side aborts with NotFound and mutates nothing. The two list
    /// appends are applied both-or-neither by the store, and any failure is
    /// surfaced to the caller. Returns both users as resolved (pre-append
    /// snapshots).
    pub async fn make_friend(
        &self,
        deadline: Deadline,
        req: FriendRequest,
    ) -> Result<(User, User), StoreError> {
        deadline
            .run(async {
                let (source, target) = tokio::try_join!(
                    self.resolve(req.source_id),
                    self.resolve(req.target_id),
                )?;

                self.store
                    .append_friend_edge(source.uid, target.uid)
                    .await?;

                info!(source = source.uid, target = target.uid, "linked friends");
                Ok((source, target))
            })
            .await
    }

    /// Display names of a user's friends, resolved from stored uids at read
    /// time and in list order. Friends whose record has since been deleted
    /// are skipped.
    pub async fn friends_of(&self, deadline: Deadline, uid: i64) -> Result<Vec<String>, StoreError> {
        deadline
            .run(async {
                let user = self.resolve(uid).await?;
                if user.friends.is_empty() {
                    return Ok(Vec::new());
                }

                let names = self.store.names_for(&user.friends).await?;
                Ok(user
                    .friends
                    .iter()
                    .filter_map(|friend_uid| names.get(friend_uid).cloned())
                    .collect())
            })
            .await
    }

    async fn resolve(&self, uid: i64) -> Result<User, StoreError> {
        self.store
            .find_by_uid(uid)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("user {} not found", uid)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::models::{NewUser, UpdateUser};
    use crate::database::repository::UserRepository;

    fn setup() -> (UserRepository, FriendGraph) {
        let store: Arc<dyn UserStore> = Arc::new(MemoryStore::new());
        (UserRepository::new(store.clone()), FriendGraph::new(store))
    }

    async fn create(repo: &UserRepository, name: &str, age: i32) -> User {
        repo.create(
            Deadline::default(),
            NewUser {
                name: name.to_string(),
                age,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn make_friend_is_symmetric() {
        let (repo, graph) = setup();
        let ann = create(&repo, "Ann", 30).await;
        let bob = create(&repo, "Bob", 31).await;
        assert_eq!((ann.uid, bob.uid), (1, 2));

        let (source, target) = graph
            .make_friend(
                Deadline::default(),
                FriendRequest {
                    source_id: 1,
                    target_id: 2,
                },
            )
            .await
            .unwrap();
        assert_eq!(source.name, "Ann");
        assert_eq!(target.name, "Bob");

        assert_eq!(graph.friends_of(Deadline::default(), 1).await.unwrap(), ["Bob"]);
        assert_eq!(graph.friends_of(Deadline::default(), 2).await.unwrap(), ["Ann"]);
    }

    #[tokio::test]
    async fn make_friend_with_missing_side_writes_nothing() {
        let (repo, graph) = setup();
        let ann = create(&repo, "Ann", 30).await;

        let result = graph
            .make_friend(
                Deadline::default(),
                FriendRequest {
                    source_id: ann.uid,
                    target_id: 99,
                },
            )
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));

        // Existing side untouched.
        let friends = graph.friends_of(Deadline::default(), ann.uid).await.unwrap();
        assert!(friends.is_empty());
    }

    #[tokio::test]
    async fn friends_of_missing_user_is_not_found() {
        let (_repo, graph) = setup();
        let result = graph.friends_of(Deadline::default(), 7).await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn new_user_has_no_placeholder_entry() {
        let (repo, graph) = setup();
        let ann = create(&repo, "Ann", 30).await;
        assert!(graph
            .friends_of(Deadline::default(), ann.uid)
            .await
            .unwrap()
            .is_empty());
    }

    #[tokio::test]
    async fn friendship_survives_a_rename() {
        let (repo, graph) = setup();
        let ann = create(&repo, "Ann", 30).await;
        let bob = create(&repo, "Bob", 31).await;

        graph
            .make_friend(
                Deadline::default(),
                FriendRequest {
                    source_id: ann.uid,
                    target_id: bob.uid,
                },
            )
            .await
            .unwrap();

        // Rename Bob; Ann's friend list resolves to the new name.
        repo.update(
            Deadline::default(),
            UpdateUser {
                uid: None,
                name: "Robert".to_string(),
                age: 31,
                friends: vec![ann.uid],
            },
            bob.uid,
        )
        .await
        .unwrap();

        assert_eq!(
            graph.friends_of(Deadline::default(), ann.uid).await.unwrap(),
            ["Robert"]
        );
    }

    #[tokio::test]
    async fn deleted_friend_drops_out_of_listing() {
        let (repo, graph) = setup();
        let ann = create(&repo, "Ann", 30).await;
        let bob = create(&repo, "Bob", 31).await;

        graph
            .make_friend(
                Deadline::default(),
                FriendRequest {
                    source_id: ann.uid,
                    target_id: bob.uid,
                },
            )
            .await
            .unwrap();
        repo.delete(Deadline::default(), bob.uid).await.unwrap();

        assert!(graph
            .friends_of(Deadline::default(), ann.uid)
            .await
            .unwrap()
            .is_empty());
    }
}
