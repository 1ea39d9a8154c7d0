//! Core types for predicted protein structures.

use nlrcraft_core::Summarizable;

/// A point in 3D Cartesian space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point3D {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3D {
    /// Create a new point.
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }
}

/// A single parsed atom.
///
/// For predicted structures the temperature factor column holds the
/// per-residue pLDDT confidence.
#[derive(Debug, Clone, PartialEq)]
pub struct Atom {
    /// Atom serial number.
    pub serial: u32,
    /// Atom name (e.g. "CA", "N", "CB"), trimmed.
    pub name: String,
    /// Alternate location indicator.
    pub alt_loc: Option<char>,
    /// Three-letter residue name.
    pub res_name: String,
    pub chain_id: char,
    /// Residue sequence number as written in the file.
    pub res_seq: i32,
    /// Insertion code.
    pub i_code: Option<char>,
    /// 3D coordinates in Angstroms.
    pub coords: Point3D,
    pub occupancy: f64,
    /// Temperature factor (B-factor), i.e. pLDDT for predicted models.
    pub temp_factor: f64,
    pub element: Option<String>,
    /// Whether this is a HETATM record.
    pub is_hetatm: bool,
    /// The original PDB line when the atom was read from PDB text.
    pub source_line: Option<String>,
}

impl Atom {
    /// Whether this is an alpha carbon.
    pub fn is_alpha_carbon(&self) -> bool {
        self.name.trim() == "CA"
    }
}

/// Atoms of one residue, in file order.
#[derive(Debug, Clone)]
pub struct Residue<'a> {
    pub chain_id: char,
    pub seq_num: i32,
    pub i_code: Option<char>,
    pub atoms: Vec<&'a Atom>,
}

impl<'a> Residue<'a> {
    /// The alpha carbon, if present.
    pub fn alpha_carbon(&self) -> Option<&'a Atom> {
        self.atoms.iter().copied().find(|a| a.is_alpha_carbon())
    }

    /// Residue pLDDT, read from the alpha carbon's B-factor.
    pub fn plddt(&self) -> Option<f64> {
        self.alpha_carbon().map(|a| a.temp_factor)
    }
}

/// Group consecutive atoms sharing chain, sequence number and insertion
/// code into residues.
pub fn group_residues(atoms: &[Atom]) -> Vec<Residue<'_>> {
    let mut residues: Vec<Residue<'_>> = Vec::new();
    for atom in atoms {
        match residues.last_mut() {
            Some(r)
                if r.chain_id == atom.chain_id
                    && r.seq_num == atom.res_seq
                    && r.i_code == atom.i_code =>
            {
                r.atoms.push(atom);
            }
            _ => residues.push(Residue {
                chain_id: atom.chain_id,
                seq_num: atom.res_seq,
                i_code: atom.i_code,
                atoms: vec![atom],
            }),
        }
    }
    residues
}

/// One `ATOM` line of a structure file together with its residue number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomLine {
    pub res_seq: i32,
    /// The line as read, without its trailing newline.
    pub text: String,
}

/// The atom lines of a structure file in file order.
///
/// Residue numbers are non-decreasing but may skip values where
/// low-confidence residues were filtered out.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructureRecord {
    /// Protein id, usually the file stem.
    pub id: String,
    pub lines: Vec<AtomLine>,
}

impl StructureRecord {
    /// Number of atom lines.
    pub fn atom_count(&self) -> usize {
        self.lines.len()
    }

    /// Residue numbers of every atom line, in file order.
    pub fn residue_numbers(&self) -> impl Iterator<Item = i32> + '_ {
        self.lines.iter().map(|l| l.res_seq)
    }
}

impl Summarizable for StructureRecord {
    fn summary(&self) -> String {
        let mut distinct: Vec<i32> = self.residue_numbers().collect();
        distinct.dedup();
        format!(
            "Structure {}: {} atom line(s), {} residue(s)",
            self.id,
            self.atom_count(),
            distinct.len()
        )
    }
}
