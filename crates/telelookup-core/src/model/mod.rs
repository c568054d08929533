/// Data model for TeleLookup results.
///
/// Re-exports the parsed record type and the partial-match query.
pub mod query;
pub mod record;

pub use query::Query;
pub use record::Record;
