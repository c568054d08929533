/// Error taxonomy for the scan engine.
///
/// Only pre-flight failures are surfaced as `Err`: a scan that never enters
/// the `Scanning` state produces no partial state at all. Mid-scan read
/// errors terminate the scan with `Termination::Failed` instead, so the
/// results accumulated up to that point can still be handed to the caller.
/// Malformed lines are never errors at any level — they are silently skipped.
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a scan before any line is processed.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The supplied path does not exist or is not a regular file.
    #[error("file not available: {0}")]
    NotFound(PathBuf),

    /// The file could not be opened or counted at scan start.
    #[error("I/O error for {1}: {0}")]
    Io(#[source] std::io::Error, PathBuf),
}
