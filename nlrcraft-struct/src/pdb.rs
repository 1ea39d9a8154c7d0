//! PDB format reading and writing.
//!
//! Two views of a PDB file are offered. [`parse_structure_record`] keeps the
//! `ATOM` lines verbatim, keyed by residue number, for segmentation.
//! [`parse_pdb_atoms`] parses ATOM and HETATM records of the first MODEL
//! into [`Atom`]s for confidence filtering.

use std::fs;
use std::path::Path;

use nlrcraft_core::{NlrError, Result};

use crate::types::{Atom, AtomLine, Point3D, StructureRecord};

/// Build a [`StructureRecord`] from PDB text.
///
/// Only lines starting with `ATOM` are considered. Lines whose residue number
/// (columns 23-26) does not parse are skipped.
pub fn parse_structure_record(id: &str, input: &str) -> StructureRecord {
    let lines = input
        .lines()
        .filter(|line| line.starts_with("ATOM"))
        .filter_map(|line| {
            let res_seq = parse_residue_seq(line).ok()?;
            Some(AtomLine {
                res_seq,
                text: line.to_string(),
            })
        })
        .collect();
    StructureRecord {
        id: id.to_string(),
        lines,
    }
}

/// Read a [`StructureRecord`] from a PDB file; the id is the file stem.
pub fn read_structure_record(path: impl AsRef<Path>) -> Result<StructureRecord> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path).map_err(|e| NlrError::io_at(path, e))?;
    let id = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(parse_structure_record(&id, &contents))
}

/// Parse ATOM and HETATM records of the first model.
///
/// # Errors
///
/// Returns an error if no atom records are found or if a record is
/// malformed (too short, unparseable serial, residue number or coordinates).
pub fn parse_pdb_atoms(input: &str) -> Result<Vec<Atom>> {
    let mut atoms = Vec::new();
    let mut seen_model = false;

    for line in input.lines() {
        if line.starts_with("ENDMDL") {
            break; // only first model
        }
        if line.starts_with("MODEL") {
            if seen_model {
                break;
            }
            seen_model = true;
            continue;
        }

        let is_atom = line.starts_with("ATOM  ");
        let is_hetatm = line.starts_with("HETATM");
        if is_atom || is_hetatm {
            atoms.push(parse_atom_record(line, is_hetatm)?);
        }
    }

    if atoms.is_empty() {
        return Err(NlrError::Parse("no ATOM records found".into()));
    }
    Ok(atoms)
}

/// Render an atom as a fixed-column PDB record.
///
/// Atoms read from PDB text are written back unchanged.
pub fn format_atom_line(atom: &Atom) -> String {
    if let Some(line) = &atom.source_line {
        return line.clone();
    }
    let record = if atom.is_hetatm { "HETATM" } else { "ATOM" };
    // Names shorter than four characters start in column 14.
    let name = if atom.name.len() < 4 {
        format!(" {:<3}", atom.name)
    } else {
        atom.name.clone()
    };
    format!(
        "{:<6}{:>5} {:<4}{}{:>3} {}{:>4}{}   {:>8.3}{:>8.3}{:>8.3}{:>6.2}{:>6.2}          {:>2}",
        record,
        atom.serial % 100_000,
        name,
        atom.alt_loc.unwrap_or(' '),
        atom.res_name,
        atom.chain_id,
        atom.res_seq,
        atom.i_code.unwrap_or(' '),
        atom.coords.x,
        atom.coords.y,
        atom.coords.z,
        atom.occupancy,
        atom.temp_factor,
        atom.element.as_deref().unwrap_or(""),
    )
}

fn parse_atom_record(line: &str, is_hetatm: bool) -> Result<Atom> {
    // PDB format is fixed-width columns. We need at least 54 chars for coords.
    if line.len() < 54 {
        return Err(NlrError::Parse(format!(
            "ATOM record too short ({} chars): {}",
            line.len(),
            line
        )));
    }

    let serial = safe_slice(line, 6, 11)
        .trim()
        .parse::<u32>()
        .map_err(|e| NlrError::Parse(format!("bad atom serial: {}", e)))?;

    let coord = |start: usize, end: usize, axis: &str| -> Result<f64> {
        safe_slice(line, start, end)
            .trim()
            .parse::<f64>()
            .map_err(|e| NlrError::Parse(format!("bad {} coordinate: {}", axis, e)))
    };
    let x = coord(30, 38, "x")?;
    let y = coord(38, 46, "y")?;
    let z = coord(46, 54, "z")?;

    let occupancy = safe_slice(line, 54, 60).trim().parse::<f64>().unwrap_or(1.0);
    let temp_factor = safe_slice(line, 60, 66).trim().parse::<f64>().unwrap_or(0.0);

    let element = {
        let e = safe_slice(line, 76, 78).trim();
        if e.is_empty() {
            None
        } else {
            Some(e.to_string())
        }
    };

    Ok(Atom {
        serial,
        name: safe_slice(line, 12, 16).trim().to_string(),
        alt_loc: blank_to_none(safe_slice(line, 16, 17)),
        res_name: safe_slice(line, 17, 20).trim().to_string(),
        chain_id: safe_slice(line, 21, 22).chars().next().unwrap_or(' '),
        res_seq: parse_residue_seq(line)?,
        i_code: blank_to_none(safe_slice(line, 26, 27)),
        coords: Point3D::new(x, y, z),
        occupancy,
        temp_factor,
        element,
        is_hetatm,
        source_line: Some(line.to_string()),
    })
}

fn blank_to_none(s: &str) -> Option<char> {
    match s.chars().next() {
        Some(' ') | None => None,
        Some(c) => Some(c),
    }
}

fn parse_residue_seq(line: &str) -> Result<i32> {
    safe_slice(line, 22, 26)
        .trim()
        .parse::<i32>()
        .map_err(|e| NlrError::Parse(format!("bad residue seq number: {}", e)))
}

/// Safe substring that handles short lines gracefully.
fn safe_slice(s: &str, start: usize, end: usize) -> &str {
    let len = s.len();
    if start >= len {
        return "";
    }
    let actual_end = end.min(len);
    // PDB files are ASCII; fall back to empty on a non-boundary slice.
    s.get(start..actual_end).unwrap_or("")
}
