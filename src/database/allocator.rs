use std::sync::Arc;

use tracing::debug;

use crate::database::store::UserStore;
use crate::database::StoreError;

/// Well-known counter record backing uid allocation.
const COUNTER_KEY: &str = "uid";

/// Hands out unique, strictly increasing integer uids from the store's atomic
/// counter. Values are not necessarily contiguous under failure: a seq burned
/// by an aborted create is never reissued.
#[derive(Clone)]
pub struct UidAllocator {
    store: Arc<dyn UserStore>,
}

impl UidAllocator {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    /// Next uid. Concurrency-safe: the backing increment-and-fetch is atomic
    /// at the storage layer, so no two calls ever observe the same value.
    pub async fn next(&self) -> Result<i64, StoreError> {
        let seq = match self.store.counter_next(COUNTER_KEY).await {
            Ok(seq) => seq,
            Err(StoreError::Cancelled) => return Err(StoreError::Cancelled),
            Err(e) => return Err(StoreError::Allocation(e.to_string())),
        };

        debug!(uid = seq, "allocated uid");
        Ok(seq)
    }
}
