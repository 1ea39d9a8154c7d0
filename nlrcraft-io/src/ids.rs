//! Protein id lists: one id per line.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nlrcraft_core::{normalize_id, NlrError, Result};

/// Read an id list. Ids are trimmed and normalised; blank lines and repeats
/// are skipped, file order is kept.
pub fn read_id_list(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| NlrError::io_at(path, e))?;
    let reader = BufReader::new(file);
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for line in reader.lines() {
        let line = line.map_err(|e| NlrError::io_at(path, e))?;
        let id = normalize_id(&line);
        if id.is_empty() {
            continue;
        }
        if seen.insert(id.to_string()) {
            ids.push(id.to_string());
        }
    }

    Ok(ids)
}

/// Write ids one per line.
pub fn write_id_list<S: AsRef<str>>(path: impl AsRef<Path>, ids: &[S]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut out = BufWriter::new(file);
    for id in ids {
        writeln!(out, "{}", id.as_ref())?;
    }
    out.flush()?;
    Ok(())
}
