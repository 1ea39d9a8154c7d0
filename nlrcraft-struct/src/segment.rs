//! Splitting a structure into N-terminal, NBS and C-terminal regions.
//!
//! Every atom line lands in exactly one region, decided by its residue
//! number against a real-residue [`ResidueSpan`]: before the span is
//! N-terminal, inside it (inclusive) is NBS, after it is C-terminal.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use nlrcraft_core::{NlrError, Result};

use crate::residue_map::ResidueSpan;
use crate::types::{AtomLine, StructureRecord};

/// One of the three regions a structure is split into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Region {
    NTerminal,
    Nbs,
    CTerminal,
}

impl Region {
    pub const ALL: [Region; 3] = [Region::NTerminal, Region::Nbs, Region::CTerminal];

    /// Output subdirectory name for the region.
    pub fn dir_name(&self) -> &'static str {
        match self {
            Region::NTerminal => "N_terminal",
            Region::Nbs => "NBS",
            Region::CTerminal => "C_terminal",
        }
    }

    /// Region a residue number belongs to relative to `span`.
    pub fn of(res_seq: i32, span: ResidueSpan) -> Region {
        if res_seq < span.start {
            Region::NTerminal
        } else if res_seq <= span.end {
            Region::Nbs
        } else {
            Region::CTerminal
        }
    }
}

/// Atom lines of one structure partitioned by region, file order kept
/// within each region.
#[derive(Debug, Clone, Default)]
pub struct Segments<'a> {
    pub n_terminal: Vec<&'a AtomLine>,
    pub nbs: Vec<&'a AtomLine>,
    pub c_terminal: Vec<&'a AtomLine>,
}

impl<'a> Segments<'a> {
    /// Lines of one region.
    pub fn region(&self, region: Region) -> &[&'a AtomLine] {
        match region {
            Region::NTerminal => &self.n_terminal,
            Region::Nbs => &self.nbs,
            Region::CTerminal => &self.c_terminal,
        }
    }

    /// Total number of lines across the three regions.
    pub fn len(&self) -> usize {
        self.n_terminal.len() + self.nbs.len() + self.c_terminal.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write each non-empty region to `<out_dir>/<region dir>/<id>.pdb`.
    /// Empty regions produce no file. Returns the paths written.
    pub fn write(&self, out_dir: &Path, id: &str) -> Result<Vec<PathBuf>> {
        let mut written = Vec::new();
        for region in Region::ALL {
            let lines = self.region(region);
            if lines.is_empty() {
                continue;
            }
            let path = out_dir.join(region.dir_name()).join(format!("{}.pdb", id));
            let file = File::create(&path).map_err(|e| NlrError::io_at(&path, e))?;
            let mut out = BufWriter::new(file);
            for line in lines {
                writeln!(out, "{}", line.text)?;
            }
            out.flush()?;
            written.push(path);
        }
        Ok(written)
    }
}

/// Partition the atom lines of `record` around `span`.
pub fn segment(record: &StructureRecord, span: ResidueSpan) -> Segments<'_> {
    let mut segments = Segments::default();
    for line in &record.lines {
        match Region::of(line.res_seq, span) {
            Region::NTerminal => segments.n_terminal.push(line),
            Region::Nbs => segments.nbs.push(line),
            Region::CTerminal => segments.c_terminal.push(line),
        }
    }
    segments
}

/// Create the three region subdirectories under `out_dir`.
pub fn create_region_dirs(out_dir: &Path) -> Result<()> {
    for region in Region::ALL {
        let dir = out_dir.join(region.dir_name());
        fs::create_dir_all(&dir).map_err(|e| NlrError::io_at(&dir, e))?;
    }
    Ok(())
}
