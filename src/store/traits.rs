//! Abstract result-store trait.
//!
//! The store holds the append-only table of inference results, keyed
//! uniquely by input identifier. It is opened before a batch run, passed
//! explicitly into the engine, consulted and updated per identifier, and
//! never lives as ambient process state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consensus::InferenceResult;
use crate::hit::HitSetDigest;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Backend error.
    #[error("Result store backend error: {0}")]
    BackendError(String),
}

/// Outcome of a single-decision insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The record was appended.
    Inserted,

    /// A record for the same input identifier already existed; nothing
    /// was written.
    AlreadyPresent,
}

/// A stored inference result with its audit envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredResult {
    /// The inference record.
    pub result: InferenceResult,

    /// When the record was appended (transaction time).
    pub recorded_at: DateTime<Utc>,

    /// Fingerprint of the hit set that produced the record.
    pub input_digest: HitSetDigest,
}

/// Storage trait for inference results.
///
/// # At-most-once semantics
/// "Record exists" and "append new record" must be one logical decision:
/// concurrent runs for the same input identifier must never both append.
/// `try_insert` is that decision; implementations must make it atomic.
pub trait ResultStore: Send + Sync {
    /// Append `result` iff no record exists for its input identifier.
    fn try_insert(
        &self,
        result: InferenceResult,
        input_digest: HitSetDigest,
    ) -> Result<InsertOutcome, StoreError>;

    /// Get the stored record for an identifier.
    fn get(&self, input_id: &str) -> Result<Option<StoredResult>, StoreError>;

    /// Whether a record exists for an identifier.
    fn contains(&self, input_id: &str) -> Result<bool, StoreError>;

    /// Number of stored records.
    fn len(&self) -> Result<usize, StoreError>;

    /// All stored records, in append order.
    fn snapshot(&self) -> Result<Vec<StoredResult>, StoreError>;
}
