//! Binary NLR / non-NLR predictions from the external Random-Forest
//! classifier.
//!
//! The table is tab-delimited with a header row; only the `query` and
//! `predicted` columns are read, any other columns are ignored.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::path::Path;
use std::str::FromStr;

use csv::ReaderBuilder;
use nlrcraft_core::{normalize_id, NlrError, Result};
use serde::Deserialize;

/// Classifier verdict for one protein.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Prediction {
    Nlr,
    NonNlr,
}

impl FromStr for Prediction {
    type Err = NlrError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "NLR" => Ok(Prediction::Nlr),
            "non-NLR" => Ok(Prediction::NonNlr),
            other => Err(NlrError::Parse(format!("unknown prediction '{}'", other))),
        }
    }
}

impl fmt::Display for Prediction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Prediction::Nlr => write!(f, "NLR"),
            Prediction::NonNlr => write!(f, "non-NLR"),
        }
    }
}

#[derive(Debug, Deserialize)]
struct PredictionRow {
    query: String,
    predicted: String,
}

/// Read a prediction table keyed by normalised protein id.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the header lacks the
/// `query` / `predicted` columns. Rows that fail to deserialize or carry an
/// unknown verdict are skipped.
pub fn read_predictions(path: impl AsRef<Path>) -> Result<HashMap<String, Prediction>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut reader = ReaderBuilder::new()
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .map_err(|e| NlrError::Parse(format!("{}: {}", path.display(), e)))?;
    for column in ["query", "predicted"] {
        if !headers.iter().any(|h| h == column) {
            return Err(NlrError::Parse(format!(
                "{}: missing '{}' column",
                path.display(),
                column
            )));
        }
    }

    let mut predictions = HashMap::new();
    let mut skipped = 0usize;
    for row in reader.deserialize::<PredictionRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                log::debug!("{}: skipped prediction row: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };
        match row.predicted.parse::<Prediction>() {
            Ok(p) => {
                predictions.insert(normalize_id(&row.query).to_string(), p);
            }
            Err(e) => {
                log::debug!("{}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }

    if skipped > 0 {
        log::warn!("{}: skipped {} malformed prediction row(s)", path.display(), skipped);
    }
    Ok(predictions)
}
