//! Consensus inference records and comparison against prior annotations.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

/// The final inference record for one input identifier.
///
/// Produced at most once per `input_id`; the result store enforces the
/// at-most-once invariant. Emission is all-or-nothing: no partial record
/// exists for a failed run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InferenceResult {
    /// Identifier of the input sequence.
    pub input_id: String,

    /// The inferred functional label.
    pub inferred_function: String,

    /// Percentage of pool descriptions supporting the label, in [0, 100].
    pub coverage_pct: f64,

    /// Mean structural similarity over the supporting descriptions.
    pub mean_similarity: f64,

    /// The input's amino-acid sequence, carried through for downstream use.
    pub sequence: String,
}

/// A curated annotation for an input identifier, as parsed from the
/// original submission headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedRecord {
    /// Identifier of the input sequence.
    pub input_id: String,

    /// The curator-supplied functional annotation.
    pub function: String,
}

/// One row of the annotation/inference comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    /// Identifier of the input sequence.
    pub input_id: String,

    /// Curated annotation, when one exists for this identifier.
    pub annotated_function: Option<String>,

    /// The inferred functional label.
    pub inferred_function: String,

    /// Coverage of the inferred label, in [0, 100].
    pub coverage_pct: f64,

    /// Mean similarity of the inferred label's supporting descriptions.
    pub mean_similarity: f64,
}

/// Joins curated annotations onto inferred results by identifier.
///
/// Every inferred result yields a row (annotations without an inference
/// do not); duplicate identifiers on either side collapse to their first
/// occurrence. Lookups are hash-keyed rather than scanned.
#[must_use]
pub fn compare_with_annotations(
    annotated: &[AnnotatedRecord],
    inferred: &[InferenceResult],
) -> Vec<ComparisonRow> {
    let mut annotations: HashMap<&str, &str> = HashMap::new();
    for record in annotated {
        annotations
            .entry(record.input_id.as_str())
            .or_insert(record.function.as_str());
    }

    let mut seen: HashSet<&str> = HashSet::new();
    let mut rows = Vec::with_capacity(inferred.len());
    for result in inferred {
        if !seen.insert(result.input_id.as_str()) {
            continue;
        }
        rows.push(ComparisonRow {
            input_id: result.input_id.clone(),
            annotated_function: annotations
                .get(result.input_id.as_str())
                .map(|f| (*f).to_string()),
            inferred_function: result.inferred_function.clone(),
            coverage_pct: result.coverage_pct,
            mean_similarity: result.mean_similarity,
        });
    }
    rows
}
