//! Hit records returned by the structural-similarity search.
//!
//! A hit pairs a free-text description of the matched reference entry with
//! the search tool's match confidence and a structural similarity score.
//! Hits are ephemeral: they are built from the external search table,
//! consumed within one inference run, and never mutated.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// The match confidence that marks a hit as reliable enough to analyze.
///
/// The search tool reports calibrated probabilities; in practice top hits
/// are `{0, 1}`-valued and only full-confidence hits enter the pool.
pub const FULL_CONFIDENCE: f64 = 1.0;

/// One structural-search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRecord {
    /// Free-text description of the matched reference entry.
    pub description: String,

    /// Identifier of the matched reference entry.
    pub match_id: String,

    /// The search tool's reported match probability, in [0.0, 1.0].
    confidence: f64,

    /// Structural similarity score for this match.
    pub similarity: f64,
}

impl HitRecord {
    /// Creates a new hit record with validation.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError::ConfidenceOutOfRange` if `confidence` is
    /// not in [0.0, 1.0], and `ValidationError::EmptyDescription` if the
    /// description is empty or whitespace-only.
    pub fn new(
        description: impl Into<String>,
        match_id: impl Into<String>,
        confidence: f64,
        similarity: f64,
    ) -> Result<Self, ValidationError> {
        if !(0.0..=1.0).contains(&confidence) {
            return Err(ValidationError::ConfidenceOutOfRange { value: confidence });
        }
        let description = description.into();
        if description.trim().is_empty() {
            return Err(ValidationError::EmptyDescription);
        }
        Ok(Self {
            description,
            match_id: match_id.into(),
            confidence,
            similarity,
        })
    }

    /// The reported match probability.
    #[must_use]
    pub const fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Whether this hit carries full match confidence.
    #[must_use]
    pub fn is_confident(&self) -> bool {
        self.confidence >= FULL_CONFIDENCE
    }
}

/// A hit reduced to its analyzable parts after normalization.
///
/// Invariant: `description` is non-empty. Original casing is preserved;
/// the normalizer only uses lower-cased copies for its exclusion checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilteredEntry {
    /// Cleaned description text.
    pub description: String,

    /// Structural similarity score carried over from the hit.
    pub similarity: f64,
}

impl FilteredEntry {
    /// Creates a filtered entry. The normalizer guarantees non-emptiness.
    #[must_use]
    pub fn new(description: impl Into<String>, similarity: f64) -> Self {
        Self {
            description: description.into(),
            similarity,
        }
    }
}

/// Content fingerprint of a hit set.
///
/// Equal hit slices produce equal digests independent of process or heap
/// layout, so a stored result can be audited against the exact input that
/// produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HitSetDigest([u8; 32]);

impl HitSetDigest {
    /// Computes the digest of a hit slice.
    ///
    /// Fields are hashed length-prefixed, in record order, so the digest
    /// is unambiguous under concatenation.
    #[must_use]
    pub fn of(hits: &[HitRecord]) -> Self {
        let mut hasher = blake3::Hasher::new();
        for hit in hits {
            hasher.update(&(hit.description.len() as u64).to_le_bytes());
            hasher.update(hit.description.as_bytes());
            hasher.update(&(hit.match_id.len() as u64).to_le_bytes());
            hasher.update(hit.match_id.as_bytes());
            hasher.update(&hit.confidence.to_le_bytes());
            hasher.update(&hit.similarity.to_le_bytes());
        }
        Self(*hasher.finalize().as_bytes())
    }

    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Display for HitSetDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(description: &str, confidence: f64, similarity: f64) -> HitRecord {
        HitRecord::new(description, "AF-P0001-F1", confidence, similarity).unwrap()
    }

    #[test]
    fn test_confidence_validation() {
        assert!(HitRecord::new("protease", "m1", 1.5, 0.9).is_err());
        assert!(HitRecord::new("protease", "m1", -0.1, 0.9).is_err());
        assert!(HitRecord::new("protease", "m1", 1.0, 0.9).is_ok());
    }

    #[test]
    fn test_empty_description_rejected() {
        let err = HitRecord::new("   ", "m1", 1.0, 0.9).unwrap_err();
        assert!(matches!(err, ValidationError::EmptyDescription));
    }

    #[test]
    fn test_is_confident() {
        assert!(hit("protease", 1.0, 0.9).is_confident());
        assert!(!hit("protease", 0.99, 0.9).is_confident());
    }

    #[test]
    fn test_digest_is_content_addressed() {
        let a = vec![hit("protease", 1.0, 0.9), hit("kinase", 1.0, 0.8)];
        let b = vec![hit("protease", 1.0, 0.9), hit("kinase", 1.0, 0.8)];
        assert_eq!(HitSetDigest::of(&a), HitSetDigest::of(&b));
    }

    #[test]
    fn test_digest_orders_and_separates_fields() {
        let a = vec![hit("protease", 1.0, 0.9), hit("kinase", 1.0, 0.8)];
        let reordered = vec![hit("kinase", 1.0, 0.8), hit("protease", 1.0, 0.9)];
        assert_ne!(HitSetDigest::of(&a), HitSetDigest::of(&reordered));

        // Length prefixes keep adjacent fields from bleeding together.
        let c = vec![hit("ab", 1.0, 0.9)];
        let d = vec![hit("a", 1.0, 0.9)];
        assert_ne!(HitSetDigest::of(&c), HitSetDigest::of(&d));
    }

    #[test]
    fn test_digest_display_is_hex() {
        let digest = HitSetDigest::of(&[hit("protease", 1.0, 0.9)]);
        let text = digest.to_string();
        assert_eq!(text.len(), 64);
        assert!(text.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(digest.as_bytes().len(), 32);
    }
}
