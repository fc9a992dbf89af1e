//! # profunc — consensus protein function inference
//!
//! profunc infers a functional label for a protein from the noisy
//! free-text descriptions returned by a structural-similarity search.
//! Rather than trusting any single hit, it statistically discovers the
//! recurring, information-bearing substring across descriptions.
//!
//! ## Pipeline
//!
//! - **Normalization**: vendor boilerplate and placeholder phrases are
//!   stripped from full-confidence hits ([`normalize`]).
//! - **Frequency analysis**: for each substring length, the dominant
//!   substring and its coverage are tabulated ([`substring`]).
//! - **Overlap scoring**: candidate substrings are compared pairwise
//!   across lengths, and the most specific well-supported candidate is
//!   selected ([`overlap`]).
//! - **Consensus**: the final record is assembled and appended to a
//!   result store at most once per input identifier ([`engine`]).
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use profunc::{HitRecord, InferenceEngine, InMemoryResultStore, SequenceMap};
//!
//! let hits = vec![
//!     HitRecord::new("Serine protease", "AF-P0C1U8-F1", 1.0, 0.91)?,
//!     HitRecord::new("Cysteine protease", "AF-Q9X2V8-F1", 1.0, 0.87)?,
//! ];
//! let mut sequences = SequenceMap::new();
//! sequences.insert("WP_0123", "MKTAYIAKQR");
//!
//! let engine = InferenceEngine::new(Arc::new(InMemoryResultStore::new()));
//! let outcome = engine.infer("WP_0123", &hits, &sequences)?;
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod consensus;
pub mod engine;
pub mod error;
pub mod header;
pub mod hit;
pub mod normalize;
pub mod overlap;
pub mod store;
pub mod substring;

// Re-export primary types at crate root for convenience
pub use consensus::{compare_with_annotations, AnnotatedRecord, ComparisonRow, InferenceResult};
pub use engine::runtime::{BatchConfig, BatchJob, BatchReport, BatchRunner, JobOutcome, RunId};
pub use engine::{EngineConfig, InferenceEngine, InferenceOutcome};
pub use error::{InferenceError, ProfuncError, ProfuncResult, ValidationError};
pub use header::{parse_fasta, FastaRecord, FieldSelector, HeaderError, SequenceMap};
pub use hit::{FilteredEntry, HitRecord, HitSetDigest, FULL_CONFIDENCE};
pub use overlap::{overlap, Candidate, OverlapScorer};
pub use store::{InMemoryResultStore, InsertOutcome, ResultStore, StoreError, StoredResult};
pub use substring::{
    SlidingWindows, SubstringStat, SubstringTable, MAX_SUBSTRING_LEN, MIN_SUBSTRING_LEN,
};
