pub mod allocator;
pub mod friends;
pub mod manager;
pub mod memory;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod store;

pub use manager::Database;
pub use store::UserStore;

use std::time::Duration;

use thiserror::Error;

/// Errors surfaced by the storage layer. Every store failure reaches the
/// caller as one of these; nothing is retried or swallowed inside the core.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    /// The uid counter was unavailable or its row could not be decoded.
    #[error("Uid allocation failed: {0}")]
    Allocation(String),

    /// A multi-record friend update could not be applied on both sides.
    /// The write has been rolled back; neither side was committed.
    #[error("Friend update conflict: {0}")]
    Conflict(String),

    /// The caller's deadline expired while the operation was in flight.
    #[error("Operation cancelled by deadline")]
    Cancelled,

    #[error(transparent)]
    Storage(#[from] sqlx::Error),
}

/// Caller-supplied deadline threaded through every repository and graph
/// operation. `Deadline::default()` never expires.
#[derive(Debug, Clone, Copy, Default)]
pub struct Deadline {
    at: Option<tokio::time::Instant>,
}

impl Deadline {
    /// Deadline `timeout` from now; `None` means no deadline.
    pub fn after(timeout: Option<Duration>) -> Self {
        Self {
            at: timeout.map(|t| tokio::time::Instant::now() + t),
        }
    }

    /// Run a store operation under this deadline. The future is dropped at
    /// expiry, so an in-flight store call does not keep running.
    pub async fn run<T, F>(&self, fut: F) -> Result<T, StoreError>
    where
        F: std::future::Future<Output = Result<T, StoreError>>,
    {
        match self.at {
            None => fut.await,
            Some(at) => match tokio::time::timeout_at(at, fut).await {
                Ok(result) => result,
                Err(_) => Err(StoreError::Cancelled),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn no_deadline_runs_to_completion() {
        let result = Deadline::default()
            .run(async { Ok::<_, StoreError>(42) })
            .await;
        assert_eq!(result.unwrap(), 42);
    }

    #[tokio::test]
    async fn expired_deadline_cancels() {
        let deadline = Deadline::after(Some(Duration::from_millis(10)));
        let result = deadline
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, StoreError>(())
            })
            .await;
        assert!(matches!(result, Err(StoreError::Cancelled)));
    }
}
