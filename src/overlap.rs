//! Pairwise overlap scoring and consensus candidate selection.
//!
//! Winners at different lengths often key in on the same semantic token:
//! if one length's winner is `tease` and a longer length's is `protease`,
//! the high overlap between them signals that both are converging on the
//! same label. The scorer walks every shorter/longer row pair, weights the
//! longer member by its support and length, and keeps the pair whose
//! overlap and score both improve on the best seen so far.

use serde::{Deserialize, Serialize};

use crate::hit::FilteredEntry;
use crate::substring::SubstringTable;

/// Maximum number of sequential overlapping characters between two
/// substrings.
///
/// If `shorter` occurs verbatim inside `longer` the overlap is the full
/// length of `shorter`. Otherwise, for every start offset in `longer`, the
/// leading characters of `shorter` are matched against `longer` from that
/// offset, and the longest such run wins.
#[must_use]
pub fn overlap(shorter: &str, longer: &str) -> usize {
    if shorter.is_empty() {
        return 0;
    }
    if longer.contains(shorter) {
        return shorter.chars().count();
    }

    let s: Vec<char> = shorter.chars().collect();
    let l: Vec<char> = longer.chars().collect();
    let mut best = 0;
    for start in 0..l.len() {
        let mut run = 0;
        while start + run < l.len() && run < s.len() && s[run] == l[start + run] {
            run += 1;
        }
        best = best.max(run);
    }
    best
}

/// The selected consensus candidate with its supporting statistics.
///
/// `substring` is always the longer member of the winning pair; the
/// shorter member is kept only as corroborating evidence of convergence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    /// The inferred functional label (longer member of the winning pair).
    pub substring: String,

    /// The shorter member of the winning pair.
    pub evidence: String,

    /// Character overlap between the pair members.
    pub overlap: usize,

    /// Weighted score of the winning pair.
    pub score: f64,

    /// Percentage of pool descriptions containing `substring`, in [0, 100].
    pub coverage_pct: f64,

    /// Mean similarity over the pool entries containing `substring`.
    pub mean_similarity: f64,
}

/// Pairwise scorer over a frequency table and its source pool.
#[derive(Debug)]
pub struct OverlapScorer<'a> {
    table: &'a SubstringTable,
    pool: &'a [FilteredEntry],
    min_support: f64,
    weight_exponent: f64,
}

impl<'a> OverlapScorer<'a> {
    /// Creates a scorer with the given support threshold and length
    /// exponent.
    #[must_use]
    pub fn new(
        table: &'a SubstringTable,
        pool: &'a [FilteredEntry],
        min_support: f64,
        weight_exponent: f64,
    ) -> Self {
        Self {
            table,
            pool,
            min_support,
            weight_exponent,
        }
    }

    /// Runs the greedy single pass over all `(shorter, longer)` row pairs.
    ///
    /// A pair replaces the current best only when its overlap exceeds the
    /// best overlap, its score exceeds the best score, and the longer
    /// member's support clears the minimum threshold. Returns `None` when
    /// no pair ever qualifies.
    #[must_use]
    pub fn select(&self) -> Option<Candidate> {
        let rows = self.table.rows();
        let mut best: Option<Candidate> = None;
        let mut best_overlap = 0usize;
        let mut best_score = 0.0f64;

        for i in 0..rows.len().saturating_sub(1) {
            for j in (i + 1)..rows.len() {
                let longer = &rows[j];

                // Support of the next-longer winner normalizes the weight;
                // the last row has nothing longer and is left unnormalized.
                let denom = if j + 1 < rows.len() {
                    self.containing_fraction(&rows[j + 1].substring)
                } else {
                    1.0
                };

                let pair_overlap = overlap(&rows[i].substring, &longer.substring);
                let support = self.containing_fraction(&longer.substring);
                let mean_similarity = self.mean_similarity(&longer.substring);

                #[allow(clippy::cast_precision_loss)]
                let weight = (longer.length as f64).powf(self.weight_exponent) * support / denom;
                let score = weight * mean_similarity;

                if pair_overlap > best_overlap && score > best_score && support > self.min_support {
                    best_overlap = pair_overlap;
                    best_score = score;
                    best = Some(Candidate {
                        substring: longer.substring.clone(),
                        evidence: rows[i].substring.clone(),
                        overlap: pair_overlap,
                        score,
                        coverage_pct: support * 100.0,
                        mean_similarity,
                    });
                }
            }
        }

        best
    }

    /// Fraction of pool descriptions containing `substring`.
    fn containing_fraction(&self, substring: &str) -> f64 {
        let containing = self
            .pool
            .iter()
            .filter(|entry| entry.description.contains(substring))
            .count();
        #[allow(clippy::cast_precision_loss)]
        let fraction = containing as f64 / self.pool.len() as f64;
        fraction
    }

    /// Mean similarity over pool entries containing `substring`, or 0.0
    /// when none do (such a substring can never clear the support gate).
    fn mean_similarity(&self, substring: &str) -> f64 {
        let mut sum = 0.0;
        let mut n = 0usize;
        for entry in self.pool {
            if entry.description.contains(substring) {
                sum += entry.similarity;
                n += 1;
            }
        }
        if n == 0 {
            0.0
        } else {
            #[allow(clippy::cast_precision_loss)]
            let mean = sum / n as f64;
            mean
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hit::FilteredEntry;
    use crate::substring::{SubstringTable, MAX_SUBSTRING_LEN, MIN_SUBSTRING_LEN};

    const MIN_SUPPORT: f64 = 0.10;
    const WEIGHT_EXPONENT: f64 = 0.25;

    fn pool(entries: &[(&str, f64)]) -> Vec<FilteredEntry> {
        entries
            .iter()
            .map(|&(description, similarity)| FilteredEntry::new(description, similarity))
            .collect()
    }

    fn select(pool: &[FilteredEntry]) -> Option<Candidate> {
        let table = SubstringTable::build(pool, MIN_SUBSTRING_LEN, MAX_SUBSTRING_LEN);
        OverlapScorer::new(&table, pool, MIN_SUPPORT, WEIGHT_EXPONENT).select()
    }

    #[test]
    fn test_overlap_reflexive() {
        for s in ["protease", "a", "ABC transporter", "αβγ"] {
            assert_eq!(overlap(s, s), s.chars().count());
        }
    }

    #[test]
    fn test_overlap_containment() {
        assert_eq!(overlap("tease", "protease"), 5);
        assert_eq!(overlap("rot", "protease"), 3);
    }

    #[test]
    fn test_overlap_prefix_run() {
        // "teased" is not inside "protease", but its first five characters
        // align with "protease" at offset 3.
        assert_eq!(overlap("teased", "protease"), 5);
        assert_eq!(overlap("xyz", "protease"), 0);
        assert_eq!(overlap("", "protease"), 0);
    }

    #[test]
    fn test_overlap_counts_characters() {
        assert_eq!(overlap("βγ", "αβγδ"), 2);
    }

    #[test]
    fn test_select_converges_on_shared_token() {
        let entries = pool(&[
            ("Serine protease", 0.9),
            ("Cysteine protease", 0.8),
            ("Aspartic protease", 0.85),
        ]);
        let candidate = select(&entries).unwrap();
        assert!(candidate.substring.contains("protease"));
        assert!(candidate.coverage_pct > 10.0);
        assert!(candidate.overlap > 0);
        assert!(candidate.score > 0.0);
    }

    #[test]
    fn test_select_reports_longer_member() {
        let entries = pool(&[("Serine protease", 0.9), ("Cysteine protease", 0.8)]);
        let candidate = select(&entries).unwrap();
        assert!(candidate.substring.chars().count() > candidate.evidence.chars().count());
        assert!(candidate.substring.contains(&candidate.evidence) || candidate.overlap > 0);
    }

    #[test]
    fn test_low_support_never_selected() {
        // Nineteen fillers with pairwise-disjoint alphabets push every
        // shared substring of the two protease entries to 2/21 < 10%
        // support; every filler substring sits at 1/21. Nothing clears the
        // gate, so no pair may be selected no matter how well it scores.
        let mut entries = vec![("Serine protease", 0.99), ("Cysteine protease", 0.98)];
        for filler in [
            "bbbb", "dddd", "ffff", "gggg", "hhhh", "jjjj", "kkkk", "llll", "mmmm", "qqqq",
            "uuuu", "vvvv", "wwww", "xxxx", "zzzz", "BBBB", "DDDD", "FFFF", "GGGG",
        ] {
            entries.push((filler, 0.2));
        }
        let entries = pool(&entries);
        assert!(select(&entries).is_none());
    }

    #[test]
    fn test_mean_similarity_of_winner_only() {
        let entries = pool(&[
            ("Zinc metalloprotease", 0.9),
            ("Zinc metalloprotease", 0.7),
            ("TonB-dependent receptor", 0.1),
        ]);
        let candidate = select(&entries).unwrap();
        assert!(candidate.substring.len() > 3);
        // Only the two metalloprotease rows contain the winner.
        assert!((candidate.mean_similarity - 0.8).abs() < 1e-9);
    }

    #[test]
    fn test_no_candidate_on_tiny_table() {
        // A single row yields no (i, j) pair at all.
        let entries = pool(&[("abc", 0.9)]);
        assert!(select(&entries).is_none());
    }

    #[test]
    fn test_select_is_deterministic() {
        let entries = pool(&[
            ("ABC transporter permease", 0.9),
            ("ABC transporter ATP-binding", 0.8),
            ("ABC transporter permease", 0.95),
        ]);
        let first = select(&entries).unwrap();
        for _ in 0..5 {
            assert_eq!(select(&entries).unwrap(), first);
        }
    }
}
