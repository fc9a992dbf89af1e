//! In-memory result store.
//!
//! Thread-safe reference implementation of `ResultStore`, intended for
//! embedded usage and tests. Durable backends live behind the same trait
//! in the surrounding system.

use std::collections::HashMap;
use std::sync::RwLock;

use chrono::Utc;

use crate::consensus::InferenceResult;
use crate::hit::HitSetDigest;
use crate::store::traits::{InsertOutcome, ResultStore, StoreError, StoredResult};

fn lock_err(context: &'static str) -> StoreError {
    StoreError::BackendError(format!("poisoned lock: {context}"))
}

#[derive(Debug, Default)]
struct StoreState {
    by_id: HashMap<String, StoredResult>,
    // append order, for snapshots
    order: Vec<String>,
}

/// Thread-safe in-memory result store.
#[derive(Debug, Default)]
pub struct InMemoryResultStore {
    state: RwLock<StoreState>,
}

impl InMemoryResultStore {
    /// Creates a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultStore for InMemoryResultStore {
    fn try_insert(
        &self,
        result: InferenceResult,
        input_digest: HitSetDigest,
    ) -> Result<InsertOutcome, StoreError> {
        let mut state = self.state.write().map_err(|_| lock_err("try_insert"))?;
        if state.by_id.contains_key(&result.input_id) {
            return Ok(InsertOutcome::AlreadyPresent);
        }
        let input_id = result.input_id.clone();
        state.order.push(input_id.clone());
        state.by_id.insert(
            input_id,
            StoredResult {
                result,
                recorded_at: Utc::now(),
                input_digest,
            },
        );
        Ok(InsertOutcome::Inserted)
    }

    fn get(&self, input_id: &str) -> Result<Option<StoredResult>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("get"))?;
        Ok(state.by_id.get(input_id).cloned())
    }

    fn contains(&self, input_id: &str) -> Result<bool, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("contains"))?;
        Ok(state.by_id.contains_key(input_id))
    }

    fn len(&self) -> Result<usize, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("len"))?;
        Ok(state.by_id.len())
    }

    fn snapshot(&self) -> Result<Vec<StoredResult>, StoreError> {
        let state = self.state.read().map_err(|_| lock_err("snapshot"))?;
        Ok(state
            .order
            .iter()
            .filter_map(|id| state.by_id.get(id).cloned())
            .collect())
    }
}
