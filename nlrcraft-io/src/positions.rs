//! NBS position tables and the coordinate-mapping report.
//!
//! The position table carries, per protein, the 1-based span of the best
//! NB-ARC hit in filtered-structure (alignment) coordinates. The report adds
//! the real PDB residue numbers that span maps to.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nlrcraft_core::{normalize_id, NlrError, Result};

/// Header written at the top of an NBS position table.
pub const NBS_POSITION_HEADER: &str = "query\tqstart\tqend";

/// Header written at the top of the coordinate report.
pub const COORDINATE_REPORT_HEADER: &str = "id\tqstart\tqend\tpdb_start\tpdb_end";

/// Aligned NB-ARC span for one protein, in filtered-structure ordinals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NbsPosition {
    pub id: String,
    pub qstart: u64,
    pub qend: u64,
}

/// One row of the coordinate report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinateRow {
    pub id: String,
    pub qstart: u64,
    pub qend: u64,
    pub pdb_start: i32,
    pub pdb_end: i32,
}

/// Parse one position row: exactly three whitespace-separated fields with
/// integer start and end.
pub fn parse_nbs_line(line: &str) -> Option<NbsPosition> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != 3 {
        return None;
    }
    Some(NbsPosition {
        id: normalize_id(fields[0]).to_string(),
        qstart: fields[1].parse().ok()?,
        qend: fields[2].parse().ok()?,
    })
}

/// Read an NBS position table. The header row and any malformed rows are
/// dropped; a repeated id replaces the earlier span in place.
pub fn read_nbs_positions(path: impl AsRef<Path>) -> Result<Vec<NbsPosition>> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| NlrError::io_at(path, e))?;
    let reader = BufReader::new(file);
    let mut positions: Vec<NbsPosition> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in reader.lines() {
        let line = line.map_err(|e| NlrError::io_at(path, e))?;
        let Some(pos) = parse_nbs_line(&line) else {
            continue;
        };
        match index.get(&pos.id) {
            Some(&i) => positions[i] = pos,
            None => {
                index.insert(pos.id.clone(), positions.len());
                positions.push(pos);
            }
        }
    }

    Ok(positions)
}

/// Write an NBS position table with its header.
pub fn write_nbs_positions(path: impl AsRef<Path>, positions: &[NbsPosition]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", NBS_POSITION_HEADER)?;
    for p in positions {
        writeln!(out, "{}\t{}\t{}", p.id, p.qstart, p.qend)?;
    }
    out.flush()?;
    Ok(())
}

/// Write the coordinate report with its header.
pub fn write_coordinate_report(path: impl AsRef<Path>, rows: &[CoordinateRow]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", COORDINATE_REPORT_HEADER)?;
    for r in rows {
        writeln!(
            out,
            "{}\t{}\t{}\t{}\t{}",
            r.id, r.qstart, r.qend, r.pdb_start, r.pdb_end
        )?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn parse_line_rules() {
        assert_eq!(
            parse_nbs_line("P1\t150\t430"),
            Some(NbsPosition { id: "P1".into(), qstart: 150, qend: 430 })
        );
        assert_eq!(parse_nbs_line("query\tqstart\tqend"), None);
        assert_eq!(parse_nbs_line("P1\t150"), None);
        assert_eq!(parse_nbs_line("P1\t150\t430\t9"), None);
        assert_eq!(parse_nbs_line("P1 x 430"), None);
    }

    #[test]
    fn written_table_reads_back_without_header() {
        let file = NamedTempFile::new().unwrap();
        let positions = vec![
            NbsPosition { id: "P1".into(), qstart: 2, qend: 4 },
            NbsPosition { id: "P2".into(), qstart: 10, qend: 300 },
        ];
        write_nbs_positions(file.path(), &positions).unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert!(text.starts_with("query\tqstart\tqend\n"));
        assert_eq!(read_nbs_positions(file.path()).unwrap(), positions);
    }

    #[test]
    fn repeated_id_replaces_span() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "P1 1 5\nP2 3 4\nP1 7 9\n").unwrap();
        file.flush().unwrap();
        let positions = read_nbs_positions(file.path()).unwrap();
        assert_eq!(positions.len(), 2);
        assert_eq!(positions[0], NbsPosition { id: "P1".into(), qstart: 7, qend: 9 });
        assert_eq!(positions[1].id, "P2");
    }

    #[test]
    fn large_table_keeps_first_seen_order() {
        let mut file = NamedTempFile::new().unwrap();
        for round in 0..2u64 {
            for i in 0..5000u64 {
                writeln!(file, "P{}\t{}\t{}", i, i + round, i + 10).unwrap();
            }
        }
        file.flush().unwrap();
        let positions = read_nbs_positions(file.path()).unwrap();
        assert_eq!(positions.len(), 5000);
        assert_eq!(positions[4999], NbsPosition { id: "P4999".into(), qstart: 5000, qend: 5009 });
        assert_eq!(positions[0].id, "P0");
        assert_eq!(positions[0].qstart, 1);
    }

    #[test]
    fn coordinate_report_layout() {
        let file = NamedTempFile::new().unwrap();
        write_coordinate_report(
            file.path(),
            &[CoordinateRow { id: "P1".into(), qstart: 2, qend: 4, pdb_start: 12, pdb_end: 15 }],
        )
        .unwrap();
        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text, "id\tqstart\tqend\tpdb_start\tpdb_end\nP1\t2\t4\t12\t15\n");
    }
}
