//! Cutoff filtering of structural hits and per-protein domain labelling.

use std::collections::HashSet;

use nlrcraft_core::{normalize_id, NlrError, Result, Summarizable};
use nlrcraft_io::AlignmentRecord;

use crate::family::FamilyTable;
use crate::label::LabelTable;

/// Thresholds a hit must meet to count as a domain call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cutoffs {
    /// Minimum alignment probability (inclusive).
    pub min_prob: f64,
    /// Minimum target coverage (inclusive).
    pub min_tcov: f64,
    /// Minimum alignment TM-score (inclusive).
    pub min_tm: f64,
    /// E-values must be strictly below this.
    pub max_evalue: f64,
}

impl Default for Cutoffs {
    fn default() -> Self {
        Self {
            min_prob: 1.0,
            min_tcov: 0.8,
            min_tm: 0.5,
            max_evalue: 0.001,
        }
    }
}

impl Cutoffs {
    /// Whether `record` meets all four thresholds.
    pub fn passes(&self, record: &AlignmentRecord) -> bool {
        record.prob >= self.min_prob
            && record.tcov >= self.min_tcov
            && record.aln_tmscore >= self.min_tm
            && record.evalue < self.max_evalue
    }

    /// Reject negative thresholds and probability or coverage above 1.
    pub fn validate(&self) -> Result<()> {
        let named = [
            ("min_prob", self.min_prob),
            ("min_tcov", self.min_tcov),
            ("min_tm", self.min_tm),
            ("max_evalue", self.max_evalue),
        ];
        for (name, value) in named {
            if !value.is_finite() || value < 0.0 {
                return Err(NlrError::InvalidInput(format!(
                    "{} must be a non-negative number, got {}",
                    name, value
                )));
            }
        }
        if self.min_prob > 1.0 || self.min_tcov > 1.0 {
            return Err(NlrError::InvalidInput(format!(
                "min_prob and min_tcov must not exceed 1 (got {} and {})",
                self.min_prob, self.min_tcov
            )));
        }
        Ok(())
    }
}

/// Result of [`DomainClassifier::classify`].
#[derive(Debug, Clone)]
pub struct Classification {
    /// One label per universe id, in universe order.
    pub labels: LabelTable,
    /// Records that passed every cutoff and belong to a universe id.
    pub passing: Vec<AlignmentRecord>,
}

/// Labels proteins from their qualifying TIR / NB-ARC hits.
#[derive(Debug, Clone, Default)]
pub struct DomainClassifier {
    pub cutoffs: Cutoffs,
    pub families: FamilyTable,
}

impl DomainClassifier {
    pub fn new(cutoffs: Cutoffs, families: FamilyTable) -> Self {
        Self { cutoffs, families }
    }

    /// Label every id of `universe` from `records`.
    ///
    /// Records of queries outside the universe are ignored entirely. Every
    /// universe id starts as `NA` and is upgraded once per qualifying hit of
    /// a recognised family. Passing records are kept in input order
    /// regardless of whether their target maps to a family.
    pub fn classify<S: AsRef<str>>(
        &self,
        records: &[AlignmentRecord],
        universe: &[S],
    ) -> Classification {
        let mut labels = LabelTable::with_ids(universe);
        let known: HashSet<&str> = universe.iter().map(|s| s.as_ref()).collect();
        let mut passing = Vec::new();
        let mut outside = 0usize;

        for record in records {
            let query = normalize_id(&record.query);
            if !known.contains(query) {
                outside += 1;
                continue;
            }
            if !self.cutoffs.passes(record) {
                continue;
            }
            passing.push(record.clone());

            let Some(family) = self.families.family_of(&record.target) else {
                continue;
            };
            let Some(current) = labels.get(query).cloned() else {
                continue;
            };
            let next = current.upgrade(family);
            if next != current {
                log::debug!("{}: {} -> {} ({})", query, current, next, record.target);
                labels.set(query, next);
            }
        }

        if outside > 0 {
            log::debug!("ignored {} hit(s) for ids outside the id list", outside);
        }
        log::info!(
            "{} of {} hit(s) pass cutoffs; {}",
            passing.len(),
            records.len(),
            labels.summary()
        );
        Classification { labels, passing }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::label::DomainLabel;
    use nlrcraft_io::parse_alignment_line;

    fn hit(query: &str, target: &str, prob: f64, tcov: f64, tm: f64, evalue: f64) -> AlignmentRecord {
        let line = format!(
            "{} {} 0.4 120 0.3 {} 70 3 11 130 1 118 {} 150.5 {} 0.7 {} 0.4 0.6",
            query, target, tcov, evalue, prob, tm
        );
        parse_alignment_line(&line).unwrap()
    }

    fn good(query: &str, target: &str) -> AlignmentRecord {
        hit(query, target, 1.0, 0.9, 0.6, 1e-4)
    }

    #[test]
    fn cutoff_boundaries() {
        let c = Cutoffs::default();
        assert!(c.passes(&hit("P", "T", 1.0, 0.8, 0.5, 0.0009)));
        assert!(!c.passes(&hit("P", "T", 1.0, 0.8, 0.5, 0.001)));
        assert!(!c.passes(&hit("P", "T", 0.99, 0.9, 0.6, 1e-5)));
        assert!(!c.passes(&hit("P", "T", 1.0, 0.79, 0.6, 1e-5)));
        assert!(!c.passes(&hit("P", "T", 1.0, 0.9, 0.49, 1e-5)));
    }

    #[test]
    fn validate_rejects_out_of_range() {
        assert!(Cutoffs::default().validate().is_ok());
        let bad = Cutoffs { min_prob: 1.5, ..Cutoffs::default() };
        assert!(bad.validate().is_err());
        let bad = Cutoffs { max_evalue: -1.0, ..Cutoffs::default() };
        assert!(bad.validate().is_err());
        let ok = Cutoffs { min_tm: 1.2, ..Cutoffs::default() };
        assert!(ok.validate().is_ok());
    }

    #[test]
    fn tir_then_nbarc_gives_tn() {
        let records = vec![
            good("P1.pdb", "PF01582_TIR"),
            good("P1.pdb", "PF00931_NB-ARC"),
            good("P2.pdb", "PF00931_NB-ARC"),
            good("P2.pdb", "PF00931_NB-ARC"),
        ];
        let out = DomainClassifier::default().classify(&records, &["P1", "P2", "P3"]);
        assert_eq!(out.labels.get("P1"), Some(&DomainLabel::TirNbArc));
        assert_eq!(out.labels.get("P2"), Some(&DomainLabel::NbArc));
        assert_eq!(out.labels.get("P3"), Some(&DomainLabel::NoDomain));
        assert_eq!(out.passing.len(), 4);
    }

    #[test]
    fn ids_outside_universe_excluded() {
        let records = vec![good("X9", "PF00931_NB-ARC"), good("P1", "PF13676_TIR2")];
        let out = DomainClassifier::default().classify(&records, &["P1"]);
        assert_eq!(out.labels.len(), 1);
        assert_eq!(out.labels.get("P1"), Some(&DomainLabel::Tir));
        assert!(!out.labels.contains("X9"));
        assert_eq!(out.passing.len(), 1);
    }

    #[test]
    fn failing_hits_do_not_label() {
        let records = vec![hit("P1", "PF00931_NB-ARC", 0.5, 0.9, 0.6, 1e-4)];
        let out = DomainClassifier::default().classify(&records, &["P1"]);
        assert_eq!(out.labels.get("P1"), Some(&DomainLabel::NoDomain));
        assert!(out.passing.is_empty());
    }

    #[test]
    fn relaxed_probability() {
        let c = Cutoffs { min_prob: 0.99, ..Cutoffs::default() };
        let records = vec![hit("P1", "PF00931_NB-ARC", 0.995, 0.9, 0.6, 1e-4)];
        let out = DomainClassifier::new(c, FamilyTable::default()).classify(&records, &["P1"]);
        assert_eq!(out.labels.get("P1"), Some(&DomainLabel::NbArc));
    }

    #[test]
    fn unknown_family_passes_but_keeps_label() {
        let records = vec![good("P1", "PF05659_RPW8")];
        let out = DomainClassifier::default().classify(&records, &["P1"]);
        assert_eq!(out.labels.get("P1"), Some(&DomainLabel::NoDomain));
        assert_eq!(out.passing.len(), 1);
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        fn target() -> impl Strategy<Value = &'static str> {
            prop_oneof![
                Just("PF01582_TIR"),
                Just("PF13676_TIR2"),
                Just("PF00931_NB-ARC"),
                Just("PF05659_RPW8"),
            ]
        }

        proptest! {
            #[test]
            fn labels_never_regress(targets in proptest::collection::vec(target(), 0..20)) {
                let classifier = DomainClassifier::default();
                let mut previous = 0u8;
                for n in 0..=targets.len() {
                    let records: Vec<_> = targets[..n].iter().map(|t| good("P1", t)).collect();
                    let out = classifier.classify(&records, &["P1"]);
                    let rank = out.labels.get("P1").map(|l| l.rank()).unwrap_or(0);
                    prop_assert!(rank >= previous);
                    previous = rank;
                }
            }
        }
    }
}
