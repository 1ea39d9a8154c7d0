//! Best NB-ARC hit per confirmed protein.

use std::collections::{HashMap, HashSet};

use nlrcraft_core::{normalize_id, Scored};
use nlrcraft_io::{AlignmentRecord, NbsPosition};

/// Aligned query span of the best hit, in filtered-structure ordinals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BestHit {
    pub qstart: u64,
    pub qend: u64,
    pub bits: f64,
}

impl Scored for BestHit {
    fn score(&self) -> f64 {
        self.bits
    }
}

/// Highest-scoring hit against targets starting with `target_prefix`, for
/// every query in `confirmed`.
///
/// The first qualifying record seeds a query's best; a later record
/// replaces it only with a strictly greater bit score. Queries are returned
/// in first-seen order; queries without a qualifying hit are absent.
pub fn select_best_hits(
    records: &[AlignmentRecord],
    target_prefix: &str,
    confirmed: &HashSet<String>,
) -> Vec<(String, BestHit)> {
    let mut best: Vec<(String, BestHit)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        if !record.target.starts_with(target_prefix) {
            continue;
        }
        let query = normalize_id(&record.query);
        if !confirmed.contains(query) {
            continue;
        }
        let candidate = BestHit {
            qstart: record.qstart,
            qend: record.qend,
            bits: record.score(),
        };
        match index.get(query) {
            Some(&i) => {
                if candidate.score() > best[i].1.score() {
                    best[i].1 = candidate;
                }
            }
            None => {
                index.insert(query.to_string(), best.len());
                best.push((query.to_string(), candidate));
            }
        }
    }

    log::info!(
        "best {} hit selected for {} of {} confirmed protein(s)",
        target_prefix,
        best.len(),
        confirmed.len()
    );
    best
}

/// Convert best hits into NBS position rows.
pub fn to_nbs_positions(hits: &[(String, BestHit)]) -> Vec<NbsPosition> {
    hits.iter()
        .map(|(id, hit)| NbsPosition {
            id: id.clone(),
            qstart: hit.qstart,
            qend: hit.qend,
        })
        .collect()
}
