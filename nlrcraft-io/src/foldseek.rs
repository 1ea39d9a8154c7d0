//! Foldseek tabular hit parser.
//!
//! Parses the whitespace-delimited table produced by `foldseek easy-search`
//! with the 19-column `--format-output` used by the pipeline:
//!
//! `query target fident alnlen qcov tcov mismatch gapopen qstart qend tstart
//! tend evalue bits prob lddt alntmscore qtmscore ttmscore`
//!
//! Rows with a different field count, or with a numeric field that does not
//! parse, are dropped rather than reported as errors.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nlrcraft_core::{NlrError, Result, Scored};

/// Column names passed to `foldseek --format-output`, in order.
pub const FOLDSEEK_COLUMNS: [&str; 19] = [
    "query",
    "target",
    "fident",
    "alnlen",
    "qcov",
    "tcov",
    "mismatch",
    "gapopen",
    "qstart",
    "qend",
    "tstart",
    "tend",
    "evalue",
    "bits",
    "prob",
    "lddt",
    "alntmscore",
    "qtmscore",
    "ttmscore",
];

/// Exact number of fields an accepted row must have.
pub const FOLDSEEK_FIELD_COUNT: usize = FOLDSEEK_COLUMNS.len();

/// The `--format-output` argument value.
pub fn format_output_arg() -> String {
    FOLDSEEK_COLUMNS.join(",")
}

/// A single structural-alignment hit.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignmentRecord {
    /// Query structure id as reported (may carry a `.pdb` suffix).
    pub query: String,
    /// Target template id (e.g. `PF00931_...`).
    pub target: String,
    /// Fraction of identical residues.
    pub fident: f64,
    pub alignment_length: u64,
    /// Query coverage fraction.
    pub qcov: f64,
    /// Target coverage fraction.
    pub tcov: f64,
    pub mismatches: u64,
    pub gap_opens: u64,
    /// Start of alignment in the filtered query structure (1-based).
    pub qstart: u64,
    /// End of alignment in the filtered query structure (1-based, inclusive).
    pub qend: u64,
    pub tstart: u64,
    pub tend: u64,
    pub evalue: f64,
    pub bits: f64,
    /// Probability of the hit being homologous.
    pub prob: f64,
    /// Local distance difference test score.
    pub lddt: f64,
    /// TM-score normalised by alignment length.
    pub aln_tmscore: f64,
    pub q_tmscore: f64,
    pub t_tmscore: f64,
}

impl AlignmentRecord {
    /// Render as one tab-delimited row in [`FOLDSEEK_COLUMNS`] order.
    pub fn to_line(&self) -> String {
        format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{}\t{:e}\t{}\t{}\t{}\t{}\t{}\t{}",
            self.query,
            self.target,
            self.fident,
            self.alignment_length,
            self.qcov,
            self.tcov,
            self.mismatches,
            self.gap_opens,
            self.qstart,
            self.qend,
            self.tstart,
            self.tend,
            self.evalue,
            self.bits,
            self.prob,
            self.lddt,
            self.aln_tmscore,
            self.q_tmscore,
            self.t_tmscore,
        )
    }
}

impl Scored for AlignmentRecord {
    fn score(&self) -> f64 {
        self.bits
    }
}

/// Accepted records plus the number of non-blank rows that were dropped.
#[derive(Debug, Clone, Default)]
pub struct AlignmentTable {
    pub records: Vec<AlignmentRecord>,
    pub dropped: usize,
}

/// Parse one hit-table row. Returns `None` for anything but a well-formed
/// 19-field row.
pub fn parse_alignment_line(line: &str) -> Option<AlignmentRecord> {
    let fields: Vec<&str> = line.split_whitespace().collect();
    if fields.len() != FOLDSEEK_FIELD_COUNT {
        return None;
    }

    let f = |idx: usize| fields[idx].parse::<f64>().ok();
    let u = |idx: usize| fields[idx].parse::<u64>().ok();

    Some(AlignmentRecord {
        query: fields[0].to_string(),
        target: fields[1].to_string(),
        fident: f(2)?,
        alignment_length: u(3)?,
        qcov: f(4)?,
        tcov: f(5)?,
        mismatches: u(6)?,
        gap_opens: u(7)?,
        qstart: u(8)?,
        qend: u(9)?,
        tstart: u(10)?,
        tend: u(11)?,
        evalue: f(12)?,
        bits: f(13)?,
        prob: f(14)?,
        lddt: f(15)?,
        aln_tmscore: f(16)?,
        q_tmscore: f(17)?,
        t_tmscore: f(18)?,
    })
}

/// Parse a Foldseek hit table from disk.
///
/// Only I/O failures are errors; malformed rows are counted in
/// [`AlignmentTable::dropped`].
pub fn parse_alignments(path: impl AsRef<Path>) -> Result<AlignmentTable> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| NlrError::io_at(path, e))?;
    let reader = BufReader::new(file);
    let mut table = AlignmentTable::default();

    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.map_err(|e| NlrError::io_at(path, e))?;
        if line.trim().is_empty() {
            continue;
        }
        match parse_alignment_line(&line) {
            Some(record) => table.records.push(record),
            None => {
                log::debug!("{}: line {}: dropped malformed hit row", path.display(), line_num + 1);
                table.dropped += 1;
            }
        }
    }

    log::info!(
        "{}: {} hit(s) accepted, {} row(s) dropped",
        path.display(),
        table.records.len(),
        table.dropped
    );
    Ok(table)
}

/// Write records as a headerless 19-column tab-delimited table.
pub fn write_alignments(path: impl AsRef<Path>, records: &[AlignmentRecord]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut out = BufWriter::new(file);
    for record in records {
        writeln!(out, "{}", record.to_line())?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ROW: &str = "P1.pdb\tPF00931_NBARC\t0.310\t280\t0.35\t0.92\t180\t6\t150\t430\t1\t285\t1.2E-20\t310.5\t1.000\t0.71\t0.66\t0.30\t0.64";

    fn write_aln(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::with_suffix(".m8").unwrap();
        write!(file, "{}", content).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn parse_full_row() {
        let r = parse_alignment_line(ROW).unwrap();
        assert_eq!(r.query, "P1.pdb");
        assert_eq!(r.target, "PF00931_NBARC");
        assert_eq!(r.alignment_length, 280);
        assert_eq!(r.qstart, 150);
        assert_eq!(r.qend, 430);
        assert!((r.tcov - 0.92).abs() < 1e-12);
        assert!((r.evalue - 1.2e-20).abs() < 1e-30);
        assert!((r.bits - 310.5).abs() < 1e-12);
        assert!((r.prob - 1.0).abs() < 1e-12);
        assert!((r.aln_tmscore - 0.66).abs() < 1e-12);
        assert!((r.score() - 310.5).abs() < 1e-12);
    }

    #[test]
    fn space_delimited_row_accepted() {
        let spaced = ROW.replace('\t', "   ");
        assert!(parse_alignment_line(&spaced).is_some());
    }

    #[test]
    fn short_row_dropped() {
        let short: Vec<&str> = ROW.split('\t').take(18).collect();
        assert!(parse_alignment_line(&short.join("\t")).is_none());
    }

    #[test]
    fn long_row_dropped() {
        let long = format!("{}\textra", ROW);
        assert!(parse_alignment_line(&long).is_none());
    }

    #[test]
    fn non_numeric_field_dropped() {
        let bad = ROW.replace("310.5", "n/a");
        assert!(parse_alignment_line(&bad).is_none());
        let bad_int = ROW.replace("\t150\t", "\t150.5\t");
        assert!(parse_alignment_line(&bad_int).is_none());
    }

    #[test]
    fn file_counts_dropped_rows() {
        let file = write_aln(&format!("{ROW}\n\ngarbage line\n{ROW}\n"));
        let table = parse_alignments(file.path()).unwrap();
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.dropped, 1);
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = parse_alignments("/nonexistent/aln.m8").unwrap_err();
        assert!(matches!(err, NlrError::Io(_)));
    }

    #[test]
    fn written_table_reparses() {
        let r = parse_alignment_line(ROW).unwrap();
        let file = NamedTempFile::new().unwrap();
        write_alignments(file.path(), &[r.clone()]).unwrap();
        let table = parse_alignments(file.path()).unwrap();
        assert_eq!(table.dropped, 0);
        assert_eq!(table.records, vec![r]);
    }

    #[test]
    fn format_output_matches_columns() {
        let arg = format_output_arg();
        assert!(arg.starts_with("query,target,fident"));
        assert!(arg.ends_with("qtmscore,ttmscore"));
        assert_eq!(arg.split(',').count(), FOLDSEEK_FIELD_COUNT);
    }
}
