/// One parsed record extracted from a single input line.
///
/// Fields are short (numeric identifiers, handles, phone numbers), so they
/// are stored as `CompactString` to keep the result list and dedup set
/// allocation-light on multi-million-line scans.
use compact_str::CompactString;
use serde::Serialize;

/// A parsed `{identifier, username, phone}` tuple.
///
/// Immutable once created. Any extra fields present on the source line are
/// ignored at extraction time and never reach this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Record {
    /// Raw identifier substring as it appeared on the line (not parsed as a
    /// number — identifier queries are substring matches over the text).
    pub identifier: CompactString,

    /// Username as extracted. Original casing is preserved; case folding
    /// happens only inside the filter predicate.
    pub username: CompactString,

    /// Phone number as extracted, digits and any formatting as-is.
    pub phone: CompactString,
}

impl Record {
    pub fn new(
        identifier: impl Into<CompactString>,
        username: impl Into<CompactString>,
        phone: impl Into<CompactString>,
    ) -> Self {
        Self {
            identifier: identifier.into(),
            username: username.into(),
            phone: phone.into(),
        }
    }
}
