//
// fold.rs
//
// Persisted fold regions and their line-oriented text codec
//

use thiserror::Error;

use crate::position::{Position, Range};

/// Placeholder shown for a collapsed region restored from persistence.
///
/// The encoder never writes placeholder text and the decoder always produces
/// this sentinel: only fold geometry round-trips. This asymmetry is
/// deliberate and must not be "fixed" silently.
pub const FOLD_PLACEHOLDER: &str = "...";

/// A foldable region of text, independent of syntactic scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub start_row: u32,
    pub start_column: u32,
    pub end_row: u32,
    pub end_column: u32,
    pub placeholder: String,
}

impl Fold {
    pub fn new(
        start_row: u32,
        start_column: u32,
        end_row: u32,
        end_column: u32,
        placeholder: impl Into<String>,
    ) -> Self {
        Self {
            start_row,
            start_column,
            end_row,
            end_column,
            placeholder: placeholder.into(),
        }
    }

    pub fn start(&self) -> Position {
        Position::new(self.start_row, self.start_column)
    }

    pub fn end(&self) -> Position {
        Position::new(self.end_row, self.end_column)
    }

    pub fn range(&self) -> Range {
        Range::new(self.start(), self.end())
    }
}

/// Errors from decoding a persisted fold list.
///
/// A malformed record aborts the whole decode: the side-car is
/// machine-written, so one bad record means the property as a whole is
/// untrustworthy. `record` is 1-based.
#[derive(Debug, Error)]
pub enum FoldDecodeError {
    #[error("fold record {record}: expected 4 fields, found {found} in {line:?}")]
    FieldCount {
        record: usize,
        found: usize,
        line: String,
    },
    #[error("fold record {record}: field {field:?} is not an integer")]
    BadInteger {
        record: usize,
        field: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Serialize folds as `startRow|startColumn|endRow|endColumn|` records, one
/// per line, in input order. Placeholder text is not written.
pub fn encode_folds(folds: &[Fold]) -> String {
    let mut out = String::new();
    for fold in folds {
        out.push_str(&format!(
            "{}|{}|{}|{}|\n",
            fold.start_row, fold.start_column, fold.end_row, fold.end_column
        ));
    }
    out
}

/// Parse a persisted fold list. Empty lines are skipped; each remaining
/// line must carry four integer fields. Placeholders are not read back:
/// every decoded fold gets [`FOLD_PLACEHOLDER`].
pub fn decode_folds(text: &str) -> Result<Vec<Fold>, FoldDecodeError> {
    let mut folds = Vec::new();
    let mut record = 0usize;
    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        record += 1;
        let fields: Vec<&str> = line.split('|').collect();
        // A well-formed record has a trailing separator, so splitting yields
        // an empty fifth field; anything shorter is missing data.
        if fields.len() < 4 {
            return Err(FoldDecodeError::FieldCount {
                record,
                found: fields.len(),
                line: line.to_string(),
            });
        }
        let mut parsed = [0u32; 4];
        for (slot, field) in parsed.iter_mut().zip(&fields[..4]) {
            *slot = field.parse().map_err(|source| FoldDecodeError::BadInteger {
                record,
                field: field.to_string(),
                source,
            })?;
        }
        folds.push(Fold::new(
            parsed[0],
            parsed[1],
            parsed[2],
            parsed[3],
            FOLD_PLACEHOLDER,
        ));
    }
    Ok(folds)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
