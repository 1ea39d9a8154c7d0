//! Protein identifier normalisation.
//!
//! Ids travel through several files written by different tools: Foldseek
//! reports the query as the structure file name (`P1.pdb`), while the id
//! universe, classifier predictions and position tables usually carry the
//! bare id. Every cross-file comparison goes through [`normalize_id`].

/// Structure-file suffixes stripped from ids before comparison.
pub const STRUCTURE_SUFFIXES: &[&str] = &[".pdb", ".cif"];

/// Trim surrounding whitespace and strip one trailing structure-file suffix.
///
/// ```
/// use nlrcraft_core::normalize_id;
///
/// assert_eq!(normalize_id(" P1.pdb\n"), "P1");
/// assert_eq!(normalize_id("AT1G01010.1"), "AT1G01010.1");
/// ```
pub fn normalize_id(raw: &str) -> &str {
    let id = raw.trim();
    for suffix in STRUCTURE_SUFFIXES {
        if let Some(stripped) = id.strip_suffix(suffix) {
            return stripped;
        }
    }
    id
}
