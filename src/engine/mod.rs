//! Consensus inference engine.
//!
//! The engine is a synchronous, deterministic executor: one call takes one
//! identifier's hit set through normalization, frequency analysis, and
//! overlap scoring, then records the result against a pluggable store. No
//! step suspends, blocks on I/O mid-algorithm, or reads the clock.

/// Thread-based batch runtime over independent identifiers.
pub mod runtime;

use std::sync::Arc;

use tracing::{debug, info};

use crate::consensus::InferenceResult;
use crate::error::{InferenceError, ValidationError};
use crate::header::SequenceMap;
use crate::hit::{HitRecord, HitSetDigest};
use crate::normalize;
use crate::overlap::OverlapScorer;
use crate::store::{InsertOutcome, ResultStore};
use crate::substring::{SubstringTable, MAX_SUBSTRING_LEN, MIN_SUBSTRING_LEN};

/// Tunable parameters of the consensus algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Shortest substring length analyzed.
    pub min_substring_len: usize,

    /// Longest substring length analyzed (inclusive).
    pub max_substring_len: usize,

    /// Minimum fraction of descriptions that must contain a candidate.
    pub min_support: f64,

    /// Exponent applied to candidate length in the weight term.
    pub weight_exponent: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            min_substring_len: MIN_SUBSTRING_LEN,
            max_substring_len: MAX_SUBSTRING_LEN,
            min_support: 0.10,
            weight_exponent: 0.25,
        }
    }
}

impl EngineConfig {
    /// Checks internal consistency of the configured length range.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidLengthRange` if the minimum length
    /// exceeds the maximum.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.min_substring_len > self.max_substring_len {
            return Err(ValidationError::InvalidLengthRange {
                min: self.min_substring_len,
                max: self.max_substring_len,
            });
        }
        Ok(())
    }
}

/// Result of one engine call.
#[derive(Debug, Clone, PartialEq)]
pub enum InferenceOutcome {
    /// A new result was inferred and appended to the store.
    Inferred(InferenceResult),

    /// A result for this identifier already existed; nothing was written.
    AlreadyProcessed {
        /// The identifier that was skipped.
        input_id: String,
    },
}

/// Consensus inference engine over a shared result store.
#[derive(Clone)]
pub struct InferenceEngine {
    store: Arc<dyn ResultStore>,
    config: EngineConfig,
}

impl std::fmt::Debug for InferenceEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InferenceEngine")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl InferenceEngine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new(store: Arc<dyn ResultStore>) -> Self {
        Self {
            store,
            config: EngineConfig::default(),
        }
    }

    /// Creates an engine with a custom configuration.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::InvalidLengthRange` for an inconsistent
    /// length range.
    pub fn with_config(
        store: Arc<dyn ResultStore>,
        config: EngineConfig,
    ) -> Result<Self, ValidationError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The shared result store.
    #[must_use]
    pub fn store(&self) -> &Arc<dyn ResultStore> {
        &self.store
    }

    /// Runs consensus inference for one identifier.
    ///
    /// Returns `AlreadyProcessed` without recomputation when the store
    /// already holds a record for `input_id`. Otherwise the hit set is
    /// normalized, analyzed, and scored, and the resulting record is
    /// appended — or one of the `InferenceError` kinds reports why no
    /// record could be produced. Output is all-or-nothing.
    pub fn infer(
        &self,
        input_id: &str,
        hits: &[HitRecord],
        sequences: &SequenceMap,
    ) -> Result<InferenceOutcome, InferenceError> {
        if hits.is_empty() {
            return Err(InferenceError::EmptyInput);
        }

        if self.store.contains(input_id)? {
            debug!(input_id, "function already determined, skipping");
            return Ok(InferenceOutcome::AlreadyProcessed {
                input_id: input_id.to_string(),
            });
        }

        let confident: Vec<&HitRecord> = hits.iter().filter(|hit| hit.is_confident()).collect();
        if confident.is_empty() {
            return Err(InferenceError::NoConfidentHits);
        }

        let pool = normalize::filter_pool(confident.iter().copied());
        if pool.is_empty() {
            return Err(InferenceError::NoInformativeDescriptions);
        }
        debug!(
            input_id,
            hits = hits.len(),
            pool = pool.len(),
            "normalized description pool"
        );

        let table = SubstringTable::build(
            &pool,
            self.config.min_substring_len,
            self.config.max_substring_len,
        );
        let candidate = OverlapScorer::new(
            &table,
            &pool,
            self.config.min_support,
            self.config.weight_exponent,
        )
        .select()
        .ok_or(InferenceError::NoCandidateFound)?;

        let sequence = sequences
            .get(input_id)
            .ok_or_else(|| InferenceError::MissingSequenceRecord {
                input_id: input_id.to_string(),
            })?;

        let result = InferenceResult {
            input_id: input_id.to_string(),
            inferred_function: candidate.substring.clone(),
            coverage_pct: candidate.coverage_pct,
            mean_similarity: candidate.mean_similarity,
            sequence: sequence.to_string(),
        };

        // A concurrent run may have appended between the early check and
        // here; the store's single decision keeps the table duplicate-free.
        match self.store.try_insert(result.clone(), HitSetDigest::of(hits))? {
            InsertOutcome::Inserted => {
                info!(
                    input_id,
                    function = %result.inferred_function,
                    coverage_pct = result.coverage_pct,
                    mean_similarity = result.mean_similarity,
                    "consensus function inferred"
                );
                Ok(InferenceOutcome::Inferred(result))
            }
            InsertOutcome::AlreadyPresent => Ok(InferenceOutcome::AlreadyProcessed {
                input_id: input_id.to_string(),
            }),
        }
    }
}
