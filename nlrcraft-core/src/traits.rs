//! Core trait definitions shared across the NLRcraft crates.

/// A type that carries a numeric score (bit score, pLDDT, ...).
pub trait Scored {
    /// The score value.
    fn score(&self) -> f64;
}

/// A type that can produce a summary of its contents.
pub trait Summarizable {
    /// A one-line summary suitable for display.
    fn summary(&self) -> String;
}

/// Index of the highest-scoring item, where a later item only wins on a
/// strictly greater score. Returns `None` for an empty slice.
pub fn best_scored<T: Scored>(items: &[T]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, item) in items.iter().enumerate() {
        let s = item.score();
        match best {
            Some((_, b)) if s <= b => {}
            _ => best = Some((i, s)),
        }
    }
    best.map(|(i, _)| i)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct S(f64);

    impl Scored for S {
        fn score(&self) -> f64 {
            self.0
        }
    }

    #[test]
    fn best_scored_empty() {
        let items: Vec<S> = Vec::new();
        assert_eq!(best_scored(&items), None);
    }

    #[test]
    fn best_scored_first_of_ties() {
        let items = vec![S(1.0), S(5.0), S(5.0), S(2.0)];
        assert_eq!(best_scored(&items), Some(1));
    }

    #[test]
    fn best_scored_strict_improvement() {
        let items = vec![S(3.0), S(3.5)];
        assert_eq!(best_scored(&items), Some(1));
    }
}
