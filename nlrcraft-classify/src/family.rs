//! Domain families and the template-id prefix table that recognises them.

use std::fmt;

/// Pfam accession of the TIR domain template.
pub const PFAM_TIR: &str = "PF01582";
/// Pfam accession of the TIR_2 domain template.
pub const PFAM_TIR2: &str = "PF13676";
/// Pfam accession of the NB-ARC domain template.
pub const PFAM_NBARC: &str = "PF00931";

/// Upstream domain families tracked by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DomainFamily {
    /// Toll/interleukin-1 receptor-like domain (TIR, TIR_2).
    Tir,
    /// Nucleotide-binding NB-ARC domain.
    NbArc,
}

impl fmt::Display for DomainFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainFamily::Tir => write!(f, "TIR"),
            DomainFamily::NbArc => write!(f, "NB-ARC"),
        }
    }
}

/// Ordered table of template-id prefixes and the family each denotes.
///
/// A target matches an entry when the entry's prefix occurs anywhere in the
/// target id; entries are tried in insertion order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FamilyTable {
    entries: Vec<(String, DomainFamily)>,
}

impl FamilyTable {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a prefix, builder style.
    pub fn with(mut self, prefix: impl Into<String>, family: DomainFamily) -> Self {
        self.insert(prefix, family);
        self
    }

    pub fn insert(&mut self, prefix: impl Into<String>, family: DomainFamily) {
        self.entries.push((prefix.into(), family));
    }

    /// Family of a target template id, if any prefix matches.
    pub fn family_of(&self, target: &str) -> Option<DomainFamily> {
        self.entries
            .iter()
            .find(|(prefix, _)| target.contains(prefix.as_str()))
            .map(|(_, family)| *family)
    }

    /// Prefixes registered for `family`, in insertion order.
    pub fn prefixes(&self, family: DomainFamily) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(_, f)| *f == family)
            .map(|(p, _)| p.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for FamilyTable {
    /// TIR and TIR_2 templates map to [`DomainFamily::Tir`], NB-ARC to
    /// [`DomainFamily::NbArc`].
    fn default() -> Self {
        FamilyTable::new()
            .with(PFAM_TIR, DomainFamily::Tir)
            .with(PFAM_TIR2, DomainFamily::Tir)
            .with(PFAM_NBARC, DomainFamily::NbArc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table_recognises_templates() {
        let t = FamilyTable::default();
        assert_eq!(t.family_of("PF01582_TIR"), Some(DomainFamily::Tir));
        assert_eq!(t.family_of("PF13676_TIR2.pdb"), Some(DomainFamily::Tir));
        assert_eq!(t.family_of("PF00931_NB-ARC"), Some(DomainFamily::NbArc));
        assert_eq!(t.family_of("PF05659_RPW8"), None);
    }

    #[test]
    fn containment_not_equality() {
        let t = FamilyTable::default();
        assert_eq!(t.family_of("model_PF00931_v2"), Some(DomainFamily::NbArc));
    }

    #[test]
    fn custom_prefix_added() {
        let t = FamilyTable::default().with("PF18052", DomainFamily::NbArc);
        assert_eq!(t.family_of("PF18052_RX-CC_like"), Some(DomainFamily::NbArc));
        let nbarc: Vec<&str> = t.prefixes(DomainFamily::NbArc).collect();
        assert_eq!(nbarc, vec!["PF00931", "PF18052"]);
    }

    #[test]
    fn empty_table_matches_nothing() {
        assert!(FamilyTable::new().is_empty());
        assert_eq!(FamilyTable::new().family_of("PF00931"), None);
    }
}
