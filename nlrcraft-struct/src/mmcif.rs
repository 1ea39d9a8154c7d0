//! mmCIF/PDBx atom reader.
//!
//! Predicted models (AlphaFold, ESMFold, ...) are often distributed as mmCIF.
//! Only the `_atom_site.` loop is read; each row becomes an [`Atom`] so the
//! structure can be confidence-filtered and written back as PDB.
//!
//! Author-assigned numbering (`auth_seq_id`, `auth_asym_id`) is preferred
//! over the label columns, matching what a PDB export of the model carries.
//!
//! # Example
//!
//! ```
//! use nlrcraft_struct::mmcif::parse_mmcif_atoms;
//!
//! let mmcif_text = "\
//! data_P1
//! #
//! loop_
//! _atom_site.group_PDB
//! _atom_site.id
//! _atom_site.type_symbol
//! _atom_site.label_atom_id
//! _atom_site.label_comp_id
//! _atom_site.label_asym_id
//! _atom_site.label_seq_id
//! _atom_site.Cartn_x
//! _atom_site.Cartn_y
//! _atom_site.Cartn_z
//! _atom_site.occupancy
//! _atom_site.B_iso_or_equiv
//! ATOM 1 N N ALA A 1 1.000 2.000 3.000 1.00 91.00
//! ATOM 2 C CA ALA A 1 2.000 2.000 3.000 1.00 92.00
//! #
//! ";
//!
//! let atoms = parse_mmcif_atoms(mmcif_text).unwrap();
//! assert_eq!(atoms.len(), 2);
//! assert_eq!(atoms[1].temp_factor, 92.0);
//! ```

use std::collections::BTreeMap;

use nlrcraft_core::{NlrError, Result};

use crate::types::{Atom, Point3D};

type Row = BTreeMap<String, String>;

/// Parse the `_atom_site.` loop of an mmCIF document into atoms.
///
/// When `pdbx_PDB_model_num` is present only rows of the first model are
/// returned.
///
/// # Errors
///
/// Returns an error if no `_atom_site.` loop is found, if required fields are
/// missing, or if coordinate values cannot be parsed.
pub fn parse_mmcif_atoms(input: &str) -> Result<Vec<Atom>> {
    let lines: Vec<&str> = input.lines().collect();
    let rows = find_and_parse_atom_site_loop(&lines)?;
    if rows.is_empty() {
        return Err(NlrError::Parse("no _atom_site. records found in mmCIF".into()));
    }

    let first_model = rows[0].get("_atom_site.pdbx_PDB_model_num").cloned();
    let mut atoms = Vec::with_capacity(rows.len());
    for (idx, row) in rows.iter().enumerate() {
        if first_model.is_some() && row.get("_atom_site.pdbx_PDB_model_num") != first_model.as_ref() {
            continue;
        }
        atoms.push(atom_from_row(row, idx)?);
    }
    Ok(atoms)
}

/// Parse a `loop_` construct into a list of records (field-name to value maps).
///
/// The input `lines` should start right after the `loop_` keyword line, with
/// field names (`_category.field`) followed by data rows. Parsing stops at
/// a line starting with `#`, `loop_`, or `data_`.
pub fn parse_mmcif_loop(lines: &[&str]) -> Vec<Row> {
    let mut field_names: Vec<String> = Vec::new();
    let mut records: Vec<Row> = Vec::new();
    let mut reading_fields = true;

    for line in lines {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.starts_with('#') {
            if !field_names.is_empty() && !reading_fields {
                break;
            }
            continue;
        }
        if trimmed.starts_with("loop_") || trimmed.starts_with("data_") {
            break;
        }

        if reading_fields {
            if trimmed.starts_with('_') {
                field_names.push(trimmed.to_string());
                continue;
            }
            reading_fields = false;
        }

        let tokens = tokenize_mmcif_line(trimmed);
        if tokens.len() < field_names.len() {
            continue;
        }
        records.push(field_names.iter().cloned().zip(tokens).collect());
    }

    records
}

fn find_and_parse_atom_site_loop(lines: &[&str]) -> Result<Vec<Row>> {
    for (i, line) in lines.iter().enumerate() {
        if line.trim() != "loop_" {
            continue;
        }
        let next = lines[i + 1..]
            .iter()
            .position(|l| {
                let t = l.trim();
                !t.is_empty() && !t.starts_with('#')
            })
            .map(|off| i + 1 + off);
        if let Some(j) = next {
            if lines[j].trim().starts_with("_atom_site.") {
                return Ok(parse_mmcif_loop(&lines[j..]));
            }
        }
    }

    Err(NlrError::Parse("no _atom_site. loop found in mmCIF data".into()))
}

/// Tokenize a single mmCIF data line, respecting single- and double-quoted strings.
fn tokenize_mmcif_line(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let chars: Vec<char> = line.chars().collect();
    let len = chars.len();
    let mut i = 0;

    while i < len {
        if chars[i].is_whitespace() {
            i += 1;
            continue;
        }

        if chars[i] == '\'' || chars[i] == '"' {
            let quote = chars[i];
            i += 1;
            let start = i;
            while i < len && chars[i] != quote {
                i += 1;
            }
            tokens.push(chars[start..i].iter().collect());
            if i < len {
                i += 1; // closing quote
            }
            continue;
        }

        let start = i;
        while i < len && !chars[i].is_whitespace() {
            i += 1;
        }
        tokens.push(chars[start..i].iter().collect());
    }

    tokens
}

fn atom_from_row(row: &Row, idx: usize) -> Result<Atom> {
    let group = row
        .get("_atom_site.group_PDB")
        .map(|s| s.as_str())
        .unwrap_or("ATOM");

    let seq_field = if present(row, "_atom_site.auth_seq_id") {
        "_atom_site.auth_seq_id"
    } else {
        "_atom_site.label_seq_id"
    };
    let asym_field = if present(row, "_atom_site.auth_asym_id") {
        "_atom_site.auth_asym_id"
    } else {
        "_atom_site.label_asym_id"
    };

    let atom_name = get_field_str(row, "_atom_site.label_atom_id", idx)?;
    let asym_id = get_field_str(row, asym_field, idx)?;

    Ok(Atom {
        serial: get_field_parsed(row, "_atom_site.id", idx)?,
        name: atom_name,
        alt_loc: row
            .get("_atom_site.label_alt_id")
            .and_then(|s| s.chars().next())
            .filter(|c| *c != '.' && *c != '?'),
        res_name: get_field_str(row, "_atom_site.label_comp_id", idx)?,
        chain_id: asym_id.chars().next().unwrap_or('A'),
        res_seq: get_field_parsed(row, seq_field, idx)?,
        i_code: row
            .get("_atom_site.pdbx_PDB_ins_code")
            .and_then(|s| s.chars().next())
            .filter(|c| *c != '.' && *c != '?'),
        coords: Point3D::new(
            get_field_parsed(row, "_atom_site.Cartn_x", idx)?,
            get_field_parsed(row, "_atom_site.Cartn_y", idx)?,
            get_field_parsed(row, "_atom_site.Cartn_z", idx)?,
        ),
        occupancy: get_field_f64_opt(row, "_atom_site.occupancy").unwrap_or(1.0),
        temp_factor: get_field_f64_opt(row, "_atom_site.B_iso_or_equiv").unwrap_or(0.0),
        element: row
            .get("_atom_site.type_symbol")
            .filter(|s| s.as_str() != "." && s.as_str() != "?")
            .cloned(),
        is_hetatm: group == "HETATM",
        source_line: None,
    })
}

// ---- Field extraction helpers ----

fn present(row: &Row, field: &str) -> bool {
    row.get(field)
        .map_or(false, |s| s.as_str() != "." && s.as_str() != "?")
}

fn get_field_str(row: &Row, field: &str, idx: usize) -> Result<String> {
    row.get(field)
        .filter(|s| s.as_str() != "." && s.as_str() != "?")
        .cloned()
        .ok_or_else(|| NlrError::Parse(format!("missing field {} in _atom_site row {}", field, idx)))
}

fn get_field_parsed<T>(row: &Row, field: &str, idx: usize) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    let s = get_field_str(row, field, idx)?;
    s.parse::<T>().map_err(|e| {
        NlrError::Parse(format!("bad {} value '{}' in row {}: {}", field, s, idx, e))
    })
}

fn get_field_f64_opt(row: &Row, field: &str) -> Option<f64> {
    row.get(field)
        .filter(|s| s.as_str() != "." && s.as_str() != "?")
        .and_then(|s| s.parse::<f64>().ok())
}
