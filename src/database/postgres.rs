use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgPool, Row};
use tracing::{debug, warn};

use crate::database::models::{UpdateUser, User};
use crate::database::store::UserStore;
use crate::database::StoreError;

/// Postgres backend for the user collection. All statements bind at runtime;
/// the counter increment is a single atomic upsert, and the two-sided friend
/// append runs inside one transaction.
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn counter_next(&self, key: &str) -> Result<i64, StoreError> {
        // Single-statement increment-and-fetch: atomic at the storage layer,
        // so no application-level locking is needed for allocation.
        let seq: i64 = sqlx::query_scalar(
            "INSERT INTO counters (id, seq) VALUES ($1, 1)
             ON CONFLICT (id) DO UPDATE SET seq = counters.seq + 1
             RETURNING seq",
        )
        .bind(key)
        .fetch_one(&self.pool)
        .await?;

        Ok(seq)
    }

    async fn insert(&self, user: &User) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO users (id, uid, name, age, friends)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(user.id)
        .bind(user.uid)
        .bind(&user.name)
        .bind(user.age)
        .bind(&user.friends)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_uid(&self, uid: i64) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, uid, name, age, friends FROM users WHERE uid = $1",
        )
        .bind(uid)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_all(&self) -> Result<Vec<User>, StoreError> {
        // Zero rows is a normal empty result; only sqlx failures become errors.
        let users = sqlx::query_as::<_, User>("SELECT id, uid, name, age, friends FROM users")
            .fetch_all(&self.pool)
            .await?;

        Ok(users)
    }

    async fn replace(&self, uid: i64, update: &UpdateUser) -> Result<u64, StoreError> {
        // uid is deliberately absent from the SET list.
        let result = sqlx::query(
            "UPDATE users SET name = $2, age = $3, friends = $4 WHERE uid = $1",
        )
        .bind(uid)
        .bind(&update.name)
        .bind(update.age)
        .bind(&update.friends)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn delete_by_uid(&self, uid: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE uid = $1")
            .bind(uid)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn append_friend_edge(
        &self,
        source_uid: i64,
        target_uid: i64,
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        for (uid, friend_uid) in [(source_uid, target_uid), (target_uid, source_uid)] {
            let result =
                sqlx::query("UPDATE users SET friends = array_append(friends, $2) WHERE uid = $1")
                    .bind(uid)
                    .bind(friend_uid)
                    .execute(&mut *tx)
                    .await?;

            if result.rows_affected() == 0 {
                // The row vanished between resolve and append. Dropping the
                // transaction rolls back the side that did match, so the graph
                // stays symmetric.
                warn!(uid, "user disappeared during friend update, rolling back");
                return Err(StoreError::Conflict(format!(
                    "user {} was removed while linking friends",
                    uid
                )));
            }
        }

        tx.commit().await?;
        debug!(source_uid, target_uid, "committed friend edge");
        Ok(())
    }

    async fn names_for(&self, uids: &[i64]) -> Result<HashMap<i64, String>, StoreError> {
        let rows = sqlx::query("SELECT uid, name FROM users WHERE uid = ANY($1)")
            .bind(uids)
            .fetch_all(&self.pool)
            .await?;

        let mut names = HashMap::with_capacity(rows.len());
        for row in rows {
            names.insert(row.try_get::<i64, _>("uid")?, row.try_get::<String, _>("name")?);
        }
        Ok(names)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
