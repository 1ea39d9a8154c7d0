//! Cluster representatives chosen by mean pLDDT.

use std::collections::HashMap;

use nlrcraft_core::{best_scored, Scored};
use nlrcraft_io::{Cluster, RepresentativeRow};

/// Score used for members missing from the score table.
pub const MISSING_SCORE: f64 = -1.0;

struct Member<'a> {
    id: &'a str,
    score: f64,
}

impl Scored for Member<'_> {
    fn score(&self) -> f64 {
        self.score
    }
}

/// One row per cluster member naming the cluster's highest-pLDDT member.
///
/// Ties keep the earliest member; members without a score count as
/// [`MISSING_SCORE`]. Empty clusters produce no rows.
pub fn select_representatives(
    clusters: &[Cluster],
    scores: &HashMap<String, f64>,
) -> Vec<RepresentativeRow> {
    let mut rows = Vec::new();
    for cluster in clusters {
        let members: Vec<Member> = cluster
            .members
            .iter()
            .map(|id| Member {
                id,
                score: scores.get(id).copied().unwrap_or(MISSING_SCORE),
            })
            .collect();
        let Some(best) = best_scored(&members) else {
            continue;
        };
        let representative = members[best].id;
        log::debug!(
            "cluster {}: representative {} ({:.2})",
            cluster.id,
            representative,
            members[best].score
        );
        rows.extend(cluster.members.iter().map(|m| RepresentativeRow {
            cluster: cluster.id.clone(),
            representative: representative.to_string(),
            member: m.clone(),
        }));
    }
    log::info!("selected representatives for {} cluster(s)", clusters.len());
    rows
}
