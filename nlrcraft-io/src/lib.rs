//! Text formats exchanged between NLRcraft pipeline stages.
//!
//! Supported formats:
//! - **Foldseek hits**: 19-column structural-alignment table, see [`foldseek`]
//! - **Id lists**: one protein id per line, see [`ids`]
//! - **Classifier predictions**: `query` / `predicted` TSV, see [`predictions`]
//! - **NBS positions and coordinate report**: see [`positions`]
//! - **Clusters and pLDDT scores**: see [`clusters`]

pub mod clusters;
pub mod foldseek;
pub mod ids;
pub mod positions;
pub mod predictions;

// Re-exports for convenience.

pub use clusters::{
    read_clusters, read_plddt_scores, write_plddt_scores, write_representatives, Cluster,
    RepresentativeRow,
};
pub use foldseek::{
    parse_alignment_line, parse_alignments, write_alignments, AlignmentRecord, AlignmentTable,
    FOLDSEEK_FIELD_COUNT,
};
pub use ids::{read_id_list, write_id_list};
pub use positions::{
    read_nbs_positions, write_coordinate_report, write_nbs_positions, CoordinateRow,
    NbsPosition,
};
pub use predictions::{read_predictions, Prediction};
