//! FASTA header parsing and per-input sequence lookup.
//!
//! Submission headers look like
//! `>WP_0123_456 Escherichia_coli_K12 ABC transporter permease`:
//! the first whitespace-separated field is the identifier and, by
//! convention, everything from the third field onward is the curated
//! functional annotation. Where a submitter deviates from that layout the
//! annotation field is selected either by word position or by a regex
//! capture, decided once per run rather than per record.

use std::collections::HashMap;
use std::fmt;

use regex::Regex;
use thiserror::Error;

use crate::consensus::AnnotatedRecord;

/// Errors raised while parsing headers or extracting annotation fields.
#[derive(Debug, Error)]
pub enum HeaderError {
    /// A record started without a `>` header line.
    #[error("Sequence data found before any header line")]
    MissingHeader,

    /// A header line carried no identifier field.
    #[error("Header line has no identifier field")]
    EmptyHeader,

    /// The field selector spec is neither an index nor a valid pattern.
    #[error("Invalid annotation field pattern: {reason}")]
    InvalidFieldPattern {
        reason: String,
    },

    /// A positional selector pointed past the end of a header.
    #[error("Header '{header}' has no field at position {position}")]
    FieldIndexOutOfRange {
        header: String,
        position: usize,
    },

    /// A pattern selector matched nothing (or had no capture group).
    #[error("Pattern '{pattern}' did not capture a field in header '{header}'")]
    FieldPatternUnmatched {
        pattern: String,
        header: String,
    },
}

/// How the functional annotation is located inside a header line.
///
/// Selected once at configuration time, then applied uniformly to every
/// record.
#[derive(Debug, Clone)]
pub enum FieldSelector {
    /// All fields from the given 1-based position onward, joined by
    /// single spaces.
    FromWord(usize),

    /// The single field at the given 1-based position.
    ByIndex(usize),

    /// The first capture group of the pattern, applied to the sanitized
    /// header line.
    ByPattern(Regex),
}

impl Default for FieldSelector {
    fn default() -> Self {
        Self::FromWord(3)
    }
}

impl fmt::Display for FieldSelector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FromWord(n) => write!(f, "from word {n}"),
            Self::ByIndex(n) => write!(f, "word {n}"),
            Self::ByPattern(re) => write!(f, "pattern /{}/", re.as_str()),
        }
    }
}

impl FieldSelector {
    /// Parses a user-supplied selector spec: an integer selects that word,
    /// anything else is compiled as a regex pattern.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError::InvalidFieldPattern` when the spec is not an
    /// index and fails to compile as a regex.
    pub fn parse(spec: &str) -> Result<Self, HeaderError> {
        if let Ok(position) = spec.trim().parse::<usize>() {
            return Ok(Self::ByIndex(position));
        }
        let pattern = Regex::new(spec).map_err(|e| HeaderError::InvalidFieldPattern {
            reason: e.to_string(),
        })?;
        Ok(Self::ByPattern(pattern))
    }

    /// Extracts the annotation from a sanitized header line.
    fn extract(&self, header: &str) -> Result<String, HeaderError> {
        let words: Vec<&str> = header.split_whitespace().collect();
        match self {
            // The tail convention tolerates short headers: a header with
            // no annotation fields yields an empty annotation.
            Self::FromWord(position) => {
                let start = (position.saturating_sub(1)).min(words.len());
                Ok(words[start..].join(" "))
            }
            Self::ByIndex(position) => {
                let idx = position.saturating_sub(1);
                words
                    .get(idx)
                    .map(|w| (*w).to_string())
                    .ok_or_else(|| HeaderError::FieldIndexOutOfRange {
                        header: header.to_string(),
                        position: *position,
                    })
            }
            Self::ByPattern(pattern) => pattern
                .captures(header)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().to_string())
                .ok_or_else(|| HeaderError::FieldPatternUnmatched {
                    pattern: pattern.as_str().to_string(),
                    header: header.to_string(),
                }),
        }
    }
}

/// One parsed FASTA record.
#[derive(Debug, Clone, PartialEq)]
pub struct FastaRecord {
    /// Sanitized identifier (first header field).
    pub id: String,

    /// Extracted functional annotation.
    pub annotation: String,

    /// Concatenated sequence lines.
    pub sequence: String,
}

impl FastaRecord {
    /// The record's curated annotation as a comparison-ready record.
    #[must_use]
    pub fn to_annotated(&self) -> AnnotatedRecord {
        AnnotatedRecord {
            input_id: self.id.clone(),
            function: self.annotation.clone(),
        }
    }
}

/// Characters that break downstream tooling are rewritten before the
/// header is split into fields.
fn sanitize_header(line: &str) -> String {
    line.replace('|', "_").replace(['(', ')'], "-")
}

/// Parses FASTA text into records, extracting each header's annotation
/// with the given selector.
///
/// # Errors
///
/// Fails on sequence data before the first header, on headers without an
/// identifier field, and on selector misses (see `HeaderError`).
pub fn parse_fasta(text: &str, selector: &FieldSelector) -> Result<Vec<FastaRecord>, HeaderError> {
    let mut records = Vec::new();
    let mut current: Option<(String, String, String)> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(header) = line.strip_prefix('>') {
            if let Some((id, annotation, sequence)) = current.take() {
                records.push(FastaRecord {
                    id,
                    annotation,
                    sequence,
                });
            }
            let sanitized = sanitize_header(header);
            let id = sanitized
                .split_whitespace()
                .next()
                .ok_or(HeaderError::EmptyHeader)?
                .to_string();
            let annotation = selector.extract(&sanitized)?;
            current = Some((id, annotation, String::new()));
        } else {
            match current.as_mut() {
                Some((_, _, sequence)) => sequence.push_str(line),
                None => return Err(HeaderError::MissingHeader),
            }
        }
    }

    if let Some((id, annotation, sequence)) = current.take() {
        records.push(FastaRecord {
            id,
            annotation,
            sequence,
        });
    }
    Ok(records)
}

/// Lookup from input identifier to amino-acid sequence.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SequenceMap {
    by_id: HashMap<String, String>,
}

impl SequenceMap {
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the map from parsed FASTA records. The first record wins on
    /// duplicate identifiers.
    #[must_use]
    pub fn from_records(records: &[FastaRecord]) -> Self {
        let mut map = Self::new();
        for record in records {
            map.by_id
                .entry(record.id.clone())
                .or_insert_with(|| record.sequence.clone());
        }
        map
    }

    /// Adds one identifier/sequence pair, replacing any existing entry.
    pub fn insert(&mut self, id: impl Into<String>, sequence: impl Into<String>) {
        self.by_id.insert(id.into(), sequence.into());
    }

    /// Looks up the sequence for an identifier.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&str> {
        self.by_id.get(id).map(String::as_str)
    }

    /// Number of stored sequences.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    /// Whether the map holds no sequences.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FASTA: &str = "\
>ABC12_1234 Escherichia_coli_K12 ABC transporter permease
MKTAYIAKQR
QISFVKSHFS
>XYZ99|77 Bacillus_subtilis(168) Serine protease
MSIQHFRVAL
";

    #[test]
    fn test_parse_default_selector() {
        let records = parse_fasta(FASTA, &FieldSelector::default()).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].id, "ABC12_1234");
        assert_eq!(records[0].annotation, "ABC transporter permease");
        assert_eq!(records[0].sequence, "MKTAYIAKQRQISFVKSHFS");

        // '|' and parentheses are sanitized before field splitting.
        assert_eq!(records[1].id, "XYZ99_77");
        assert_eq!(records[1].annotation, "Serine protease");
    }

    #[test]
    fn test_by_index_selector() {
        let selector = FieldSelector::parse("2").unwrap();
        assert!(matches!(selector, FieldSelector::ByIndex(2)));
        let records = parse_fasta(FASTA, &selector).unwrap();
        assert_eq!(records[0].annotation, "Escherichia_coli_K12");
    }

    #[test]
    fn test_by_pattern_selector() {
        let selector = FieldSelector::parse(r"transporter (\w+)").unwrap();
        let records =
            parse_fasta(">A1 x ABC transporter permease\nMKT\n", &selector).unwrap();
        assert_eq!(records[0].annotation, "permease");
    }

    #[test]
    fn test_pattern_miss_is_an_error() {
        let selector = FieldSelector::parse(r"kinase (\w+)").unwrap();
        let err = parse_fasta(">A1 x ABC transporter permease\nMKT\n", &selector).unwrap_err();
        assert!(matches!(err, HeaderError::FieldPatternUnmatched { .. }));
    }

    #[test]
    fn test_tail_selector_tolerates_short_headers() {
        let records = parse_fasta(">A1 organism\nMKT\n", &FieldSelector::default()).unwrap();
        assert_eq!(records[0].annotation, "");
        assert_eq!(records[0].sequence, "MKT");
    }

    #[test]
    fn test_index_out_of_range_is_an_error() {
        let selector = FieldSelector::parse("9").unwrap();
        let err = parse_fasta(">A1 x y\nMKT\n", &selector).unwrap_err();
        assert!(matches!(
            err,
            HeaderError::FieldIndexOutOfRange { position: 9, .. }
        ));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let err = FieldSelector::parse("(unclosed").unwrap_err();
        assert!(matches!(err, HeaderError::InvalidFieldPattern { .. }));
    }

    #[test]
    fn test_sequence_before_header_rejected() {
        let err = parse_fasta("MKTAYIAKQR\n>A1 x y\n", &FieldSelector::default()).unwrap_err();
        assert!(matches!(err, HeaderError::MissingHeader));
    }

    #[test]
    fn test_sequence_map_lookup() {
        let records = parse_fasta(FASTA, &FieldSelector::default()).unwrap();
        let map = SequenceMap::from_records(&records);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("ABC12_1234"), Some("MKTAYIAKQRQISFVKSHFS"));
        assert_eq!(map.get("missing"), None);
    }

    #[test]
    fn test_to_annotated() {
        let records = parse_fasta(FASTA, &FieldSelector::default()).unwrap();
        let annotated = records[0].to_annotated();
        assert_eq!(annotated.input_id, "ABC12_1234");
        assert_eq!(annotated.function, "ABC transporter permease");
    }
}
