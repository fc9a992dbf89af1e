//! Per-length substring frequency analysis.
//!
//! For each length in the configured range, every contiguous character
//! window of that length across the filtered pool is tallied, and the most
//! frequent window becomes that length's row in the table. The table reads
//! as a specificity/frequency trade-off: short winners are near-universal,
//! long winners are specific but rarer.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::hit::FilteredEntry;

/// Shortest substring length examined.
pub const MIN_SUBSTRING_LEN: usize = 3;

/// Longest substring length examined (inclusive).
pub const MAX_SUBSTRING_LEN: usize = 59;

/// Lazy iterator over every contiguous window of `len` characters.
///
/// Windows step one character at a time and overlap; duplicates within one
/// description are yielded separately. Yields nothing when the text is
/// shorter than the window or the window length is zero.
#[derive(Debug, Clone)]
pub struct SlidingWindows<'a> {
    text: &'a str,
    start: usize,
    end: Option<usize>,
}

fn next_char_boundary(text: &str, idx: usize) -> Option<usize> {
    text[idx..].chars().next().map(|c| idx + c.len_utf8())
}

impl<'a> SlidingWindows<'a> {
    /// Creates a window iterator over `text`.
    #[must_use]
    pub fn new(text: &'a str, len: usize) -> Self {
        let mut end = if len == 0 { None } else { Some(0) };
        for _ in 0..len {
            end = end.and_then(|e| next_char_boundary(text, e));
        }
        Self {
            text,
            start: 0,
            end,
        }
    }
}

impl<'a> Iterator for SlidingWindows<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let end = self.end?;
        let window = &self.text[self.start..end];
        self.start = next_char_boundary(self.text, self.start)?;
        self.end = next_char_boundary(self.text, end);
        Some(window)
    }
}

/// One row of the frequency table: the dominant substring at one length.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubstringStat {
    /// Window length in characters.
    pub length: usize,

    /// The most frequent substring of this length.
    pub substring: String,

    /// Total occurrences across all descriptions (a description containing
    /// the substring twice contributes 2).
    pub count: usize,

    /// Percentage of descriptions containing the substring at least once,
    /// in [0, 100].
    pub coverage_pct: f64,
}

/// Ordered frequency table, one row per length with at least one window.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SubstringTable {
    rows: Vec<SubstringStat>,
}

impl SubstringTable {
    /// Builds the table for lengths `min_len..=max_len` over the pool.
    ///
    /// Lengths longer than every description are omitted, so the table has
    /// at most `max_len - min_len + 1` rows, ordered by ascending length.
    #[must_use]
    pub fn build(pool: &[FilteredEntry], min_len: usize, max_len: usize) -> Self {
        let mut rows = Vec::new();
        for length in min_len..=max_len {
            if let Some(stat) = dominant_substring(pool, length) {
                rows.push(stat);
            }
        }
        Self { rows }
    }

    /// The rows, ordered by ascending length.
    #[must_use]
    pub fn rows(&self) -> &[SubstringStat] {
        &self.rows
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The longest winner whose coverage exceeds `pct`.
    #[must_use]
    pub fn longest_with_coverage_above(&self, pct: f64) -> Option<&SubstringStat> {
        self.rows.iter().rev().find(|row| row.coverage_pct > pct)
    }
}

/// Finds the most frequent window of one length, or `None` if no
/// description is long enough.
///
/// Ties on count break toward the window generated first (descriptions in
/// input order, left to right within each description).
fn dominant_substring(pool: &[FilteredEntry], length: usize) -> Option<SubstringStat> {
    // count and first-seen rank per distinct window
    let mut tally: HashMap<&str, (usize, usize)> = HashMap::new();
    let mut rank = 0usize;
    for entry in pool {
        for window in SlidingWindows::new(&entry.description, length) {
            let slot = tally.entry(window).or_insert((0, rank));
            slot.0 += 1;
            rank += 1;
        }
    }

    let (winner, count) = tally
        .iter()
        .max_by_key(|&(_, &(count, first_seen))| (count, std::cmp::Reverse(first_seen)))
        .map(|(&window, &(count, _))| (window, count))?;

    let containing = pool
        .iter()
        .filter(|entry| entry.description.contains(winner))
        .count();
    #[allow(clippy::cast_precision_loss)]
    let coverage_pct = containing as f64 / pool.len() as f64 * 100.0;

    Some(SubstringStat {
        length,
        substring: winner.to_string(),
        count,
        coverage_pct,
    })
}
