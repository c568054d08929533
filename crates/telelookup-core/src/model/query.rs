/// The partial-match filter predicate applied to every extracted record.
///
/// Up to three constraints — identifier, username, phone. Absent or empty
/// components impose no constraint; present components are literal substring
/// containment checks. Username is the one case-insensitive field: both
/// sides are lower-cased, with the query side folded once at construction
/// so the per-record cost is a single `contains`.
use crate::model::Record;

/// An immutable set of up to three partial-match constraints for one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    identifier: Option<String>,
    /// Stored lower-cased.
    username: Option<String>,
    phone: Option<String>,
}

impl Query {
    /// Build a query from raw caller input.
    ///
    /// Leading/trailing whitespace is trimmed; an empty (or all-whitespace)
    /// component means "no constraint" on that field.
    pub fn new(identifier: &str, username: &str, phone: &str) -> Self {
        Self {
            identifier: non_empty(identifier),
            username: non_empty(username).map(|u| u.to_lowercase()),
            phone: non_empty(phone),
        }
    }

    /// `true` when no field imposes any constraint (a full dump scan).
    pub fn is_unconstrained(&self) -> bool {
        self.identifier.is_none() && self.username.is_none() && self.phone.is_none()
    }

    /// Evaluate the record against all present constraints (logical AND).
    ///
    /// Identifier and phone are case-sensitive substring checks against the
    /// raw extracted text; username is checked case-insensitively. No
    /// scoring, no fuzziness.
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(q) = &self.identifier {
            if !record.identifier.contains(q.as_str()) {
                return false;
            }
        }
        if let Some(q) = &self.username {
            if !record.username.to_lowercase().contains(q.as_str()) {
                return false;
            }
        }
        if let Some(q) = &self.phone {
            if !record.phone.contains(q.as_str()) {
                return false;
            }
        }
        true
    }
}

fn non_empty(input: &str) -> Option<String> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> Record {
        Record::new("912345678", "JohnDoe", "989123456789")
    }

    #[test]
    fn empty_query_matches_everything() {
        let q = Query::new("", "  ", "");
        assert!(q.is_unconstrained());
        assert!(q.matches(&record()));
    }

    #[test]
    fn identifier_is_substring_not_prefix() {
        let q = Query::new("234", "", "");
        assert!(q.matches(&record()));
        let miss = Query::new("999", "", "");
        assert!(!miss.matches(&record()));
    }

    #[test]
    fn identifier_is_case_sensitive_raw_text() {
        // Identifiers are numeric in practice, but the check is over raw text.
        let rec = Record::new("ABC123", "user", "1");
        assert!(Query::new("ABC", "", "").matches(&rec));
        assert!(!Query::new("abc", "", "").matches(&rec));
    }

    #[test]
    fn username_match_is_case_insensitive_both_ways() {
        assert!(Query::new("", "john", "").matches(&record()));
        assert!(Query::new("", "JOHN", "").matches(&record()));
        assert!(Query::new("", "John", "").matches(&Record::new("1", "johndoe", "2")));
        assert!(Query::new("", "John", "").matches(&Record::new("1", "JOHNDOE", "2")));
    }

    #[test]
    fn phone_is_case_sensitive_substring() {
        assert!(Query::new("", "", "9123").matches(&record()));
        assert!(!Query::new("", "", "555").matches(&record()));
    }

    #[test]
    fn all_present_constraints_must_hold() {
        let q = Query::new("912", "johndoe", "989");
        assert!(q.matches(&record()));
        let q = Query::new("912", "nobody", "989");
        assert!(!q.matches(&record()));
    }

    #[test]
    fn whitespace_only_component_imposes_no_constraint() {
        let q = Query::new("  912  ", "\t", "");
        assert!(q.matches(&record()));
    }
}
