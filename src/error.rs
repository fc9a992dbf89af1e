//! Error types for profunc.
//!
//! All errors are strongly typed using thiserror. Degenerate outcomes of a
//! single inference run (empty input, no confident hits, and so on) are
//! ordinary `InferenceError` variants so callers can pattern match on them
//! and map each to its own sentinel in the surrounding batch system.

use thiserror::Error;

use crate::header::HeaderError;
use crate::store::StoreError;

/// Validation errors raised while constructing boundary records.
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Confidence value {value} is out of range [0.0, 1.0]")]
    ConfidenceOutOfRange {
        value: f64,
    },

    #[error("Hit description cannot be empty")]
    EmptyDescription,

    #[error("Input identifier cannot be empty")]
    EmptyInputId,

    #[error("Substring length range is invalid: min {min} > max {max}")]
    InvalidLengthRange {
        min: usize,
        max: usize,
    },
}

/// Per-identifier inference failures.
///
/// None of these is fatal to a batch run: each identifier fails in
/// isolation and the remaining identifiers keep processing.
#[derive(Debug, Error)]
pub enum InferenceError {
    /// The input hit table has zero rows.
    #[error("Input hit table is empty")]
    EmptyInput,

    /// No hit carries the maximum match confidence.
    #[error("No hit reached full match confidence")]
    NoConfidentHits,

    /// Normalization removed every description.
    #[error("No informative descriptions remain after normalization")]
    NoInformativeDescriptions,

    /// The pairwise selection rule never triggered.
    #[error("No substring pair satisfied the selection rule")]
    NoCandidateFound,

    /// The caller supplied no sequence for this identifier.
    ///
    /// This is a contract violation and is surfaced loudly rather than
    /// skipped: the output record cannot be assembled without it.
    #[error("No sequence record supplied for input '{input_id}'")]
    MissingSequenceRecord {
        input_id: String,
    },

    /// The result store failed.
    #[error("Result store error: {0}")]
    Store(#[from] StoreError),
}

impl InferenceError {
    /// Returns true for the expected degenerate outcomes of noisy input,
    /// as opposed to caller contract violations and backend faults.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(
            self,
            Self::EmptyInput
                | Self::NoConfidentHits
                | Self::NoInformativeDescriptions
                | Self::NoCandidateFound
        )
    }
}

/// Top-level error type for profunc.
#[derive(Debug, Error)]
pub enum ProfuncError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Inference error: {0}")]
    Inference(#[from] InferenceError),

    #[error("Header error: {0}")]
    Header(#[from] HeaderError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl ProfuncError {
    /// Returns true if this is a validation error.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// Returns true if this is an inference error.
    #[must_use]
    pub const fn is_inference(&self) -> bool {
        matches!(self, Self::Inference(_))
    }

    /// Returns true for expected degenerate inference outcomes.
    #[must_use]
    pub const fn is_degenerate(&self) -> bool {
        matches!(self, Self::Inference(e) if e.is_degenerate())
    }
}

/// Result type alias for profunc operations.
pub type ProfuncResult<T> = Result<T, ProfuncError>;
