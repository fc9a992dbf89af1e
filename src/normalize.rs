//! Description cleanup ahead of substring analysis.
//!
//! Raw search hits repeat vendor boilerplate and generic placeholder
//! phrases that would otherwise dominate the frequency tally. This module
//! strips the boilerplate, drops descriptions that carry no signal, and
//! hands the survivors to the analyzer with their similarity scores.

use std::sync::OnceLock;

use regex::Regex;

use crate::hit::{FilteredEntry, HitRecord};

/// Descriptions equal to one of these (case-insensitive, after trimming)
/// carry no functional signal and are dropped outright.
const PLACEHOLDER_DESCRIPTIONS: &[&str] = &["uncharacterized protein", "uncharacterized", "na"];

/// Literal tokens removed wherever they occur, in this order.
const STRIP_TOKENS: &[&str] = &["uncharacterized", " protein", "putative", "domain-containing"];

/// Vendor model-version tag prefixed to reference descriptions.
const MODEL_TAG_PATTERN: &str = r"(?i)AF.*-F1-model_v4 ";

static MODEL_TAG: OnceLock<Regex> = OnceLock::new();

fn model_tag() -> &'static Regex {
    MODEL_TAG.get_or_init(|| Regex::new(MODEL_TAG_PATTERN).expect("model tag pattern is valid"))
}

/// Removes every ASCII case-insensitive occurrence of `needle`.
///
/// The needle must be ASCII; matched regions are therefore ASCII too, so
/// splicing around them never lands inside a multi-byte character.
fn strip_all_ignore_ascii_case(haystack: &str, needle: &str) -> String {
    debug_assert!(needle.is_ascii() && !needle.is_empty());
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;
    while !rest.is_empty() {
        if rest.len() >= needle.len()
            && rest.as_bytes()[..needle.len()].eq_ignore_ascii_case(needle.as_bytes())
        {
            rest = &rest[needle.len()..];
            continue;
        }
        let mut chars = rest.chars();
        match chars.next() {
            Some(c) => {
                out.push(c);
                rest = chars.as_str();
            }
            None => break,
        }
    }
    out
}

/// Cleans one raw description.
///
/// Returns `None` when the description is a generic placeholder or becomes
/// empty after stripping. Original casing of the surviving text is kept.
#[must_use]
pub fn clean_description(raw: &str) -> Option<String> {
    let without_tag = model_tag().replace(raw, "");
    let trimmed = without_tag.trim();

    if PLACEHOLDER_DESCRIPTIONS
        .iter()
        .any(|p| trimmed.eq_ignore_ascii_case(p))
    {
        return None;
    }

    let mut cleaned = trimmed.to_string();
    for token in STRIP_TOKENS {
        cleaned = strip_all_ignore_ascii_case(&cleaned, token);
    }

    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

/// Builds the filtered pool from full-confidence hits.
///
/// Input order is preserved: the analyzer's tie-break depends on it.
pub fn filter_pool<'a>(hits: impl IntoIterator<Item = &'a HitRecord>) -> Vec<FilteredEntry> {
    hits.into_iter()
        .filter_map(|hit| {
            clean_description(&hit.description)
                .map(|description| FilteredEntry::new(description, hit.similarity))
        })
        .collect()
}
