/// Per-scan identifier dedup set.
///
/// An identifier is accepted at most once per scan, however many lines share
/// it. The scanner only consults this set for lines that already passed the
/// filter predicate, so identifiers of non-matching lines never enter it.
use compact_str::CompactString;
use std::collections::HashSet;

/// Tracks identifiers already accepted into the result list.
#[derive(Debug, Default)]
pub struct DedupSet {
    seen: HashSet<CompactString>,
}

impl DedupSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` exactly once per identifier, inserting it on first acceptance.
    pub fn accept(&mut self, identifier: &str) -> bool {
        if self.seen.contains(identifier) {
            return false;
        }
        self.seen.insert(CompactString::new(identifier));
        true
    }

    /// Number of distinct identifiers accepted so far.
    ///
    /// Invariant: equals the result list length at every point in a scan.
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_accepted_rest_dropped() {
        let mut dedup = DedupSet::new();
        assert!(dedup.accept("12345678"));
        assert!(!dedup.accept("12345678"));
        assert!(!dedup.accept("12345678"));
        assert!(dedup.accept("87654321"));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn empty_set_reports_empty() {
        let dedup = DedupSet::new();
        assert!(dedup.is_empty());
        assert_eq!(dedup.len(), 0);
    }
}
