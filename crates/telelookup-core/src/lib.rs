/// TeleLookup Core — streaming scan, filter, and dedup engine.
///
/// This crate contains all business logic with zero UI dependencies.
/// It is designed to be reusable across different frontends (CLI, GUI).
///
/// # Modules
///
/// - [`model`] — `Record` and `Query` (partial-match filter predicate).
/// - [`scanner`] — Chunked streaming scan with progress reporting and
///   cooperative cancellation.
/// - [`monitor`] — Shared activity-timestamp handle for an external
///   idle-timeout supervisor.
/// - [`export`] — CSV export of a result set.
pub mod error;
pub mod export;
pub mod model;
pub mod monitor;
pub mod scanner;
