//! Translation of alignment coordinates into real residue numbers.
//!
//! Structures are pLDDT-filtered before alignment, so the aligner numbers
//! residues by their position in the filtered chain (1, 2, 3, ...) while the
//! file keeps the original, now gapped, residue numbers. [`ResidueLookup`]
//! holds the ordinal to residue-number table for one structure and
//! [`ResidueLookup::map_span`] converts an aligned span through it.
//!
//! ```
//! use nlrcraft_struct::residue_map::{ResidueLookup, SpanMapping};
//!
//! let lookup = ResidueLookup::from_residue_numbers([10, 10, 12, 12, 12, 15]);
//! assert_eq!(lookup.as_slice(), &[10, 12, 15]);
//! assert!(matches!(lookup.map_span(2, 3), SpanMapping::Valid(s) if s.start == 12 && s.end == 15));
//! assert!(!lookup.map_span(4, 4).is_valid());
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::types::StructureRecord;

/// A span in real residue numbers, both ends inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueSpan {
    pub start: i32,
    pub end: i32,
}

impl ResidueSpan {
    pub fn new(start: i32, end: i32) -> Self {
        Self { start, end }
    }

    /// Whether `res_seq` falls inside the span.
    pub fn contains(&self, res_seq: i32) -> bool {
        self.start <= res_seq && res_seq <= self.end
    }
}

/// Outcome of mapping an aligned span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanMapping {
    Valid(ResidueSpan),
    /// An ordinal fell outside `1..=available`.
    Invalid {
        qstart: u64,
        qend: u64,
        available: usize,
    },
}

impl SpanMapping {
    pub fn is_valid(&self) -> bool {
        matches!(self, SpanMapping::Valid(_))
    }

    /// The mapped span, if valid.
    pub fn span(&self) -> Option<ResidueSpan> {
        match self {
            SpanMapping::Valid(s) => Some(*s),
            SpanMapping::Invalid { .. } => None,
        }
    }
}

impl fmt::Display for SpanMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpanMapping::Valid(s) => write!(f, "{}-{}", s.start, s.end),
            SpanMapping::Invalid {
                qstart,
                qend,
                available,
            } => write!(
                f,
                "span {}-{} outside 1-{} residue positions",
                qstart, qend, available
            ),
        }
    }
}

/// Ordinal (1-based) to real residue number table of one structure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResidueLookup {
    residues: Vec<i32>,
}

impl ResidueLookup {
    /// Build from residue numbers in file order, keeping the first
    /// occurrence of each number.
    pub fn from_residue_numbers<I: IntoIterator<Item = i32>>(numbers: I) -> Self {
        let mut seen = HashSet::new();
        let residues = numbers.into_iter().filter(|r| seen.insert(*r)).collect();
        Self { residues }
    }

    /// Build from the atom lines of a structure.
    pub fn from_record(record: &StructureRecord) -> Self {
        Self::from_residue_numbers(record.residue_numbers())
    }

    /// Number of distinct residues.
    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }

    pub fn as_slice(&self) -> &[i32] {
        &self.residues
    }

    /// Real residue number at a 1-based ordinal.
    pub fn real_residue(&self, ordinal: u64) -> Option<i32> {
        let idx = usize::try_from(ordinal).ok()?.checked_sub(1)?;
        self.residues.get(idx).copied()
    }

    /// Map an aligned span `(qstart, qend)` to real residue numbers. Both
    /// ordinals must lie in `1..=len()`; out-of-range spans are reported as
    /// [`SpanMapping::Invalid`], never clamped.
    pub fn map_span(&self, qstart: u64, qend: u64) -> SpanMapping {
        match (self.real_residue(qstart), self.real_residue(qend)) {
            (Some(start), Some(end)) => SpanMapping::Valid(ResidueSpan { start, end }),
            _ => SpanMapping::Invalid {
                qstart,
                qend,
                available: self.residues.len(),
            },
        }
    }
}
