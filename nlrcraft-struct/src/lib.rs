//! Predicted protein structures for the NLRcraft pipeline.
//!
//! - **PDB / mmCIF reading**: [`pdb`] and [`mmcif`]
//! - **pLDDT filtering**: drop low-confidence residues in [`plddt`]
//! - **Coordinate mapping**: alignment ordinals to residue numbers in [`residue_map`]
//! - **Segmentation**: N-terminal / NBS / C-terminal split in [`segment`]
//!
//! # Quick start
//!
//! ```
//! use nlrcraft_struct::{parse_structure_record, segment, ResidueLookup};
//!
//! let pdb_text = "\
//! ATOM      1  CA  ALA A  10       1.000   2.000   3.000  1.00 90.00           C
//! ATOM      2  CA  GLY A  12       2.000   2.000   3.000  1.00 90.00           C
//! ATOM      3  CA  VAL A  15       3.000   2.000   3.000  1.00 90.00           C
//! ";
//!
//! let record = parse_structure_record("P1", pdb_text);
//! let lookup = ResidueLookup::from_record(&record);
//! let span = lookup.map_span(2, 3).span().unwrap();
//! let parts = segment(&record, span);
//! assert_eq!(parts.n_terminal.len(), 1);
//! assert_eq!(parts.nbs.len(), 2);
//! ```

pub mod mmcif;
pub mod pdb;
pub mod plddt;
pub mod residue_map;
pub mod segment;
pub mod types;

pub use pdb::{parse_pdb_atoms, parse_structure_record, read_structure_record};
pub use plddt::{filter_directory, filter_low_plddt, filter_structure_file, mean_plddt, BatchReport};
pub use residue_map::{ResidueLookup, ResidueSpan, SpanMapping};
pub use segment::{create_region_dirs, segment, Region, Segments};
pub use types::{Atom, AtomLine, Point3D, StructureRecord};
