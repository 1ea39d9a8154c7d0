//! NLR identification logic over structural-alignment hits.
//!
//! - **Domain labelling**: [`DomainClassifier`] turns qualifying TIR and
//!   NB-ARC hits into `NA` / `T` / `N` / `TN` labels
//! - **False-positive removal**: [`resolve_false_positives`] downgrades
//!   proteins an external classifier rejects
//! - **NB-ARC location**: [`select_best_hits`] keeps the best NB-ARC hit per
//!   confirmed protein
//! - **Representatives**: [`select_representatives`] picks the
//!   highest-pLDDT member of each cluster

pub mod best_hit;
pub mod classifier;
pub mod false_positive;
pub mod family;
pub mod label;
pub mod representative;

pub use best_hit::{select_best_hits, to_nbs_positions, BestHit};
pub use classifier::{Classification, Cutoffs, DomainClassifier};
pub use false_positive::{resolve_false_positives, Resolution};
pub use family::{DomainFamily, FamilyTable, PFAM_NBARC, PFAM_TIR, PFAM_TIR2};
pub use label::{read_label_table, write_label_table, DomainLabel, LabelTable};
pub use representative::select_representatives;
