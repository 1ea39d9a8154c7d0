//! pLDDT confidence filtering and scoring of predicted structures.
//!
//! Predicted models store per-residue confidence (pLDDT, 0-100) in the
//! B-factor column. Low-confidence regions are removed before structural
//! alignment: a residue survives only if its alpha carbon's pLDDT reaches the
//! cutoff. Residue numbering is left untouched, so filtered files are gapped.

use std::fs;
use std::path::{Path, PathBuf};

use nlrcraft_core::{NlrError, Result};

use crate::mmcif::parse_mmcif_atoms;
use crate::pdb::{format_atom_line, parse_pdb_atoms};
use crate::types::{group_residues, Atom};

/// On-disk structure formats accepted as filter input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    Pdb,
    Mmcif,
}

impl StructureFormat {
    /// Detect the format from the file extension (`.pdb` or `.cif`).
    pub fn from_path(path: &Path) -> Option<Self> {
        match path.extension()?.to_str()? {
            "pdb" => Some(StructureFormat::Pdb),
            "cif" => Some(StructureFormat::Mmcif),
            _ => None,
        }
    }
}

/// Read all atoms of the first model of a `.pdb` or `.cif` file.
pub fn read_atoms(path: impl AsRef<Path>) -> Result<Vec<Atom>> {
    let path = path.as_ref();
    let format = StructureFormat::from_path(path).ok_or_else(|| {
        NlrError::InvalidInput(format!(
            "{}: unsupported structure format, only .pdb and .cif are accepted",
            path.display()
        ))
    })?;
    let contents = fs::read_to_string(path).map_err(|e| NlrError::io_at(path, e))?;
    let atoms = match format {
        StructureFormat::Pdb => parse_pdb_atoms(&contents),
        StructureFormat::Mmcif => parse_mmcif_atoms(&contents),
    };
    atoms.map_err(|e| NlrError::Parse(format!("{}: {}", path.display(), e)))
}

/// Atoms of every residue whose alpha carbon has pLDDT `>= cutoff`.
/// Residues without an alpha carbon are dropped.
pub fn filter_low_plddt(atoms: &[Atom], cutoff: f64) -> Vec<&Atom> {
    group_residues(atoms)
        .into_iter()
        .filter(|r| r.plddt().map_or(false, |p| p >= cutoff))
        .flat_map(|r| r.atoms)
        .collect()
}

/// Mean B-factor over all atoms, `None` when there are none.
pub fn mean_plddt(atoms: &[Atom]) -> Option<f64> {
    if atoms.is_empty() {
        return None;
    }
    Some(atoms.iter().map(|a| a.temp_factor).sum::<f64>() / atoms.len() as f64)
}

/// Filter one structure file and write the kept atoms as PDB.
///
/// The output extension is always replaced by `.pdb`; the written path is
/// returned.
pub fn filter_structure_file(input: &Path, output: &Path, cutoff: f64) -> Result<PathBuf> {
    let atoms = read_atoms(input)?;
    let kept = filter_low_plddt(&atoms, cutoff);

    let output = output.with_extension("pdb");
    let mut text = String::new();
    for atom in &kept {
        text.push_str(&format_atom_line(atom));
        text.push('\n');
    }
    text.push_str("END\n");
    fs::write(&output, text).map_err(|e| NlrError::io_at(&output, e))?;

    log::debug!(
        "{}: kept {} of {} atom(s) at pLDDT >= {}",
        input.display(),
        kept.len(),
        atoms.len(),
        cutoff
    );
    Ok(output)
}

/// Outcome of filtering a directory of structures.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    /// Files written.
    pub processed: Vec<PathBuf>,
    /// Inputs that failed, with the error message.
    pub failed: Vec<(PathBuf, String)>,
    /// Directory entries that were not `.pdb` / `.cif` files.
    pub skipped: Vec<PathBuf>,
}

type TaskOutcome = (PathBuf, Result<PathBuf>);

#[cfg(feature = "parallel")]
fn run_tasks<F>(tasks: &[PathBuf], parallel: bool, f: F) -> Vec<TaskOutcome>
where
    F: Fn(&PathBuf) -> TaskOutcome + Sync + Send,
{
    use rayon::prelude::*;
    if parallel {
        tasks.par_iter().map(f).collect()
    } else {
        tasks.iter().map(f).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn run_tasks<F>(tasks: &[PathBuf], _parallel: bool, f: F) -> Vec<TaskOutcome>
where
    F: Fn(&PathBuf) -> TaskOutcome,
{
    tasks.iter().map(f).collect()
}

/// Filter every `.pdb` / `.cif` file of `input_dir` into `output_dir`.
///
/// Files are independent tasks: a failing file is logged and recorded in
/// the report without stopping the others. Only an unreadable input
/// directory or an uncreatable output directory is an error.
pub fn filter_directory(
    input_dir: &Path,
    output_dir: &Path,
    cutoff: f64,
    parallel: bool,
) -> Result<BatchReport> {
    fs::create_dir_all(output_dir).map_err(|e| NlrError::io_at(output_dir, e))?;

    let mut report = BatchReport::default();
    let mut tasks = Vec::new();
    for entry in fs::read_dir(input_dir).map_err(|e| NlrError::io_at(input_dir, e))? {
        let path = entry.map_err(|e| NlrError::io_at(input_dir, e))?.path();
        if path.is_file() && StructureFormat::from_path(&path).is_some() {
            tasks.push(path);
        } else {
            log::debug!("skipping non-structure entry {}", path.display());
            report.skipped.push(path);
        }
    }
    tasks.sort();

    let outcomes = run_tasks(&tasks, parallel, |input| {
        let name = input.file_name().map(PathBuf::from).unwrap_or_default();
        log::debug!("processing {}", input.display());
        (input.clone(), filter_structure_file(input, &output_dir.join(name), cutoff))
    });

    for (input, outcome) in outcomes {
        match outcome {
            Ok(written) => report.processed.push(written),
            Err(e) => {
                log::warn!("pLDDT filter failed for {}: {}", input.display(), e);
                report.failed.push((input, e.to_string()));
            }
        }
    }

    log::info!(
        "pLDDT filter (cutoff {}): {} written, {} failed, {} skipped -> {}",
        cutoff,
        report.processed.len(),
        report.failed.len(),
        report.skipped.len(),
        output_dir.display()
    );
    Ok(report)
}
