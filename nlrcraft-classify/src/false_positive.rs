//! Downgrading of labels for proteins the external classifier rejects.

use std::collections::HashMap;

use nlrcraft_io::Prediction;

use crate::label::{DomainLabel, LabelTable};

/// Labels after false-positive removal.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub labels: LabelTable,
    /// Ids whose final label is not `Na`, in table order.
    pub confirmed: Vec<String>,
    /// Number of labels that changed.
    pub downgraded: usize,
}

/// Apply `non-NLR` predictions to a label table.
///
/// Each protein predicted `non-NLR` gets [`DomainLabel::downgrade`] applied
/// exactly once; proteins predicted `NLR` or absent from `predictions` keep
/// their label.
pub fn resolve_false_positives(
    labels: &LabelTable,
    predictions: &HashMap<String, Prediction>,
) -> Resolution {
    let mut resolved = LabelTable::new();
    let mut confirmed = Vec::new();
    let mut downgraded = 0usize;

    for (id, label) in labels.iter() {
        let label = match predictions.get(id) {
            Some(Prediction::NonNlr) => {
                let lower = label.downgrade();
                if &lower != label {
                    log::debug!("{}: {} -> {} (non-NLR)", id, label, lower);
                    downgraded += 1;
                }
                lower
            }
            _ => label.clone(),
        };
        if label != DomainLabel::NbArcRejected {
            confirmed.push(id.to_string());
        }
        resolved.set(id, label);
    }

    log::info!(
        "false-positive removal: {} label(s) downgraded, {} protein(s) confirmed",
        downgraded,
        confirmed.len()
    );
    Resolution {
        labels: resolved,
        confirmed,
        downgraded,
    }
}
