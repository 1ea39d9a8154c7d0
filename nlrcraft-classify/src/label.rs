//! Per-protein domain labels and the label table.

use std::collections::HashMap;
use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nlrcraft_core::{NlrError, Result, Summarizable};

use crate::family::DomainFamily;

/// Domain-presence call for one protein.
///
/// Written as `NA`, `T`, `N`, `TN` and `Na`. Any other text read from a
/// label file is kept verbatim as [`DomainLabel::Other`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DomainLabel {
    /// `NA`: no confident domain hit.
    #[default]
    NoDomain,
    /// `T`: TIR domain present.
    Tir,
    /// `N`: NB-ARC domain present.
    NbArc,
    /// `TN`: both present.
    TirNbArc,
    /// `Na`: NB-ARC hit, but the protein was rejected as a non-NLR homolog.
    NbArcRejected,
    /// Unrecognised label text.
    Other(String),
}

impl DomainLabel {
    /// Label after one more qualifying hit of `family`. Labels only ever move
    /// up: `NA -> T|N`, `T + NB-ARC -> TN`, `N + TIR -> TN`; anything else is
    /// unchanged.
    pub fn upgrade(&self, family: DomainFamily) -> DomainLabel {
        match (self, family) {
            (DomainLabel::NoDomain, DomainFamily::Tir) => DomainLabel::Tir,
            (DomainLabel::NoDomain, DomainFamily::NbArc) => DomainLabel::NbArc,
            (DomainLabel::Tir, DomainFamily::NbArc) | (DomainLabel::NbArc, DomainFamily::Tir) => {
                DomainLabel::TirNbArc
            }
            (label, _) => label.clone(),
        }
    }

    /// Label of a protein the external classifier rejected: `N -> Na`,
    /// `TN -> T`, all others unchanged.
    pub fn downgrade(&self) -> DomainLabel {
        match self {
            DomainLabel::NbArc => DomainLabel::NbArcRejected,
            DomainLabel::TirNbArc => DomainLabel::Tir,
            other => other.clone(),
        }
    }

    /// Parse label text; never fails.
    pub fn parse(s: &str) -> DomainLabel {
        match s {
            "NA" => DomainLabel::NoDomain,
            "T" => DomainLabel::Tir,
            "N" => DomainLabel::NbArc,
            "TN" => DomainLabel::TirNbArc,
            "Na" => DomainLabel::NbArcRejected,
            other => DomainLabel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DomainLabel::NoDomain => "NA",
            DomainLabel::Tir => "T",
            DomainLabel::NbArc => "N",
            DomainLabel::TirNbArc => "TN",
            DomainLabel::NbArcRejected => "Na",
            DomainLabel::Other(s) => s,
        }
    }

    /// Rank along the upgrade order, used to check monotonicity.
    pub(crate) fn rank(&self) -> u8 {
        match self {
            DomainLabel::NoDomain => 0,
            DomainLabel::Tir | DomainLabel::NbArc => 1,
            DomainLabel::TirNbArc => 2,
            DomainLabel::NbArcRejected | DomainLabel::Other(_) => 0,
        }
    }
}

impl fmt::Display for DomainLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Protein id to label mapping that keeps insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    rows: Vec<(String, DomainLabel)>,
    index: HashMap<String, usize>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with every id labelled `NA`.
    pub fn with_ids<S: AsRef<str>>(ids: &[S]) -> Self {
        let mut table = Self::new();
        for id in ids {
            table.set(id.as_ref(), DomainLabel::NoDomain);
        }
        table
    }

    /// Insert or replace the label of `id`; a new id goes last.
    pub fn set(&mut self, id: &str, label: DomainLabel) {
        match self.index.get(id) {
            Some(&i) => self.rows[i].1 = label,
            None => {
                self.index.insert(id.to_string(), self.rows.len());
                self.rows.push((id.to_string(), label));
            }
        }
    }

    pub fn get(&self, id: &str) -> Option<&DomainLabel> {
        self.index.get(id).map(|&i| &self.rows[i].1)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &DomainLabel)> {
        self.rows.iter().map(|(id, label)| (id.as_str(), label))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of proteins carrying `label`.
    pub fn count(&self, label: &DomainLabel) -> usize {
        self.rows.iter().filter(|(_, l)| l == label).count()
    }
}

impl Summarizable for LabelTable {
    fn summary(&self) -> String {
        format!(
            "{} protein(s): TN={} T={} N={} Na={} NA={}",
            self.len(),
            self.count(&DomainLabel::TirNbArc),
            self.count(&DomainLabel::Tir),
            self.count(&DomainLabel::NbArc),
            self.count(&DomainLabel::NbArcRejected),
            self.count(&DomainLabel::NoDomain),
        )
    }
}

/// Read a headerless `query\tlabel` table. Rows with fewer than two
/// tab-separated fields are skipped.
pub fn read_label_table(path: impl AsRef<Path>) -> Result<LabelTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut table = LabelTable::new();
    for line in BufReader::new(file).lines() {
        let line = line.map_err(|e| NlrError::io_at(path, e))?;
        let fields: Vec<&str> = line.trim_end_matches(['\r', '\n']).split('\t').collect();
        if fields.len() < 2 || fields[0].is_empty() {
            continue;
        }
        table.set(fields[0], DomainLabel::parse(fields[1]));
    }
    Ok(table)
}

/// Write a headerless `query\tlabel` table in table order.
pub fn write_label_table(path: impl AsRef<Path>, table: &LabelTable) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut out = BufWriter::new(file);
    for (id, label) in table.iter() {
        writeln!(out, "{}\t{}", id, label)?;
    }
    out.flush()?;
    Ok(())
}
