//! Cluster membership and per-protein pLDDT score tables.

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use nlrcraft_core::{NlrError, Result};

/// Header of the representative table.
pub const REPRESENTATIVE_HEADER: &str = "clusterID\tmax_pLDDT\tproteinID";

/// A cluster and its members, both in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cluster {
    pub id: String,
    pub members: Vec<String>,
}

/// One output row: the cluster, its chosen representative, and a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepresentativeRow {
    pub cluster: String,
    pub representative: String,
    pub member: String,
}

fn open_lines(path: &Path) -> Result<impl Iterator<Item = Result<String>> + '_> {
    let file = File::open(path).map_err(|e| NlrError::io_at(path, e))?;
    Ok(BufReader::new(file)
        .lines()
        .map(move |l| l.map_err(|e| NlrError::io_at(path, e))))
}

/// Read a two-column `representative\tmember` cluster table.
pub fn read_clusters(path: impl AsRef<Path>) -> Result<Vec<Cluster>> {
    let path = path.as_ref();
    let mut clusters: Vec<Cluster> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for line in open_lines(path)? {
        let line = line?;
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() != 2 || fields[0].is_empty() || fields[1].is_empty() {
            continue;
        }
        let slot = *index.entry(fields[0].to_string()).or_insert_with(|| {
            clusters.push(Cluster {
                id: fields[0].to_string(),
                members: Vec::new(),
            });
            clusters.len() - 1
        });
        clusters[slot].members.push(fields[1].to_string());
    }

    Ok(clusters)
}

/// Read an `id\tscore` table.
pub fn read_plddt_scores(path: impl AsRef<Path>) -> Result<HashMap<String, f64>> {
    let path = path.as_ref();
    let mut scores = HashMap::new();
    for line in open_lines(path)? {
        let line = line?;
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.len() != 2 {
            continue;
        }
        if let Ok(score) = fields[1].parse::<f64>() {
            scores.insert(fields[0].to_string(), score);
        }
    }
    Ok(scores)
}

/// Write an `id\tscore` table sorted by id, scores to two decimals.
pub fn write_plddt_scores(path: impl AsRef<Path>, scores: &HashMap<String, f64>) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut out = BufWriter::new(file);
    let mut ids: Vec<&String> = scores.keys().collect();
    ids.sort();
    for id in ids {
        writeln!(out, "{}\t{:.2}", id, scores[id])?;
    }
    out.flush()?;
    Ok(())
}

/// Write the representative table with its header.
pub fn write_representatives(path: impl AsRef<Path>, rows: &[RepresentativeRow]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path).map_err(|e| NlrError::io_at(path, e))?;
    let mut out = BufWriter::new(file);
    writeln!(out, "{}", REPRESENTATIVE_HEADER)?;
    for r in rows {
        writeln!(out, "{}\t{}\t{}", r.cluster, r.representative, r.member)?;
    }
    out.flush()?;
    Ok(())
}
