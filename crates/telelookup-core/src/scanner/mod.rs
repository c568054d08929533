/// Scanner module — the chunked streaming scan/filter/dedup engine.
///
/// One scan is a single linear pass over a newline-delimited dump file:
/// lines are batched, each batch runs extract → filter → dedup, and accepted
/// records accumulate in first-acceptance order. The cancellation flag is
/// polled before every line is appended to the batch; an observed stop still
/// processes the already-accumulated batch, so no line that was read into a
/// batch can lose its match.
///
/// Two entry points:
/// - [`Searcher::run`] — synchronous, runs the scan to a terminal state on
///   the calling thread with a progress callback.
/// - [`start_scan`] — spawns the scan on a named background thread and
///   returns a [`ScanHandle`] for cancellation and channel-based progress,
///   for hosts with their own event loop.
pub mod dedup;
pub mod extract;
pub mod linecount;
pub mod progress;

use crate::error::ScanError;
use crate::model::{Query, Record};
use crate::monitor::ActivityHandle;
use dedup::DedupSet;
use linecount::LineCountCache;
use progress::{ProgressPublisher, DEFAULT_PUBLISH_INTERVAL};
pub use progress::{ProgressSnapshot, ScanUpdate};

use crossbeam_channel::Receiver;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default number of lines per batch.
///
/// Large on purpose: each batch boundary is a progress-check/publish cycle,
/// and on multi-gigabyte dumps those cycles are pure overhead. A million
/// decoded lines of this format is on the order of 100 MB, an acceptable
/// trade for a desktop search tool.
pub const DEFAULT_CHUNK_SIZE: usize = 1_000_000;

/// Read-buffer capacity for the sequential pass.
const READ_BUFFER_SIZE: usize = 256 * 1024;

/// Capacity of the progress-update channel used by [`start_scan`].
///
/// Snapshots arrive at most a couple of times per second; 256 gives a slow
/// consumer minutes of headroom before back-pressure stalls the scanner.
pub const UPDATE_CHANNEL_CAPACITY: usize = 256;

/// Tunables for one scan — the knobs the original implementation's
/// near-duplicate revisions varied are configuration here.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Lines accumulated before a batch is processed.
    pub chunk_size: usize,
    /// Minimum gap between throttled progress publishes.
    pub publish_interval: Duration,
    /// When `false`, the total line count is recomputed on every scan
    /// instead of served from the session cache.
    pub cache_line_count: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            publish_interval: DEFAULT_PUBLISH_INTERVAL,
            cache_line_count: true,
        }
    }
}

/// How a scan that entered `Scanning` ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Termination {
    /// End-of-file reached; the result set is complete for this query.
    Completed,
    /// User stop request observed; results are a correct prefix of what the
    /// uncancelled scan would have produced.
    Cancelled,
    /// Mid-scan read error; results are best-effort partial.
    Failed { error: String },
}

/// Everything a finished scan hands back to the caller.
#[derive(Debug)]
pub struct SearchOutcome {
    pub termination: Termination,
    /// Accepted records, ordered by first acceptance (file order).
    pub records: Vec<Record>,
    /// Data lines read into batches (header excluded, malformed included).
    pub processed_lines: u64,
    pub elapsed: Duration,
}

/// The canonical scan engine. Owns the session-scoped line-count cache, so
/// repeated scans of the same file skip the counting pass.
#[derive(Debug, Default)]
pub struct Searcher {
    config: SearchConfig,
    line_cache: LineCountCache,
}

impl Searcher {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            config,
            line_cache: LineCountCache::new(),
        }
    }

    /// Run one scan to a terminal state on the calling thread.
    ///
    /// Pre-flight failures (missing file, unopenable file, line-count I/O
    /// error) return `Err` before any scan state exists. Once scanning has
    /// started every outcome — including a mid-scan read failure — comes
    /// back as `Ok(SearchOutcome)` so partial results are never lost.
    ///
    /// `on_progress` is invoked on this same thread; it gates forward
    /// progress and must stay cheap. `Completed` and `Cancelled` always end
    /// with a forced publish reflecting the full final result set.
    pub fn run(
        &mut self,
        path: &Path,
        query: &Query,
        cancel: &AtomicBool,
        activity: Option<&ActivityHandle>,
        mut on_progress: impl FnMut(ProgressSnapshot),
    ) -> Result<SearchOutcome, ScanError> {
        if !path.is_file() {
            return Err(ScanError::NotFound(path.to_path_buf()));
        }

        if let Some(activity) = activity {
            activity.mark_activity();
        }

        let total_lines = if self.config.cache_line_count {
            self.line_cache.total_lines(path)
        } else {
            linecount::count_lines(path)
        }
        .map_err(|e| ScanError::Io(e, path.to_path_buf()))?;

        let file = File::open(path).map_err(|e| ScanError::Io(e, path.to_path_buf()))?;

        info!(
            path = %path.display(),
            total_lines,
            unconstrained = query.is_unconstrained(),
            "Scan starting"
        );

        let reader = BufReader::with_capacity(READ_BUFFER_SIZE, file);
        let outcome = self.scan_lines(reader, query, total_lines, cancel, &mut on_progress);

        if let Some(activity) = activity {
            activity.mark_activity();
        }

        match &outcome.termination {
            Termination::Completed => info!(
                found = outcome.records.len(),
                processed = outcome.processed_lines,
                elapsed_secs = outcome.elapsed.as_secs_f64(),
                "Scan completed"
            ),
            Termination::Cancelled => info!(
                found = outcome.records.len(),
                processed = outcome.processed_lines,
                "Scan cancelled by user"
            ),
            Termination::Failed { error } => warn!(
                error = %error,
                found = outcome.records.len(),
                "Scan failed mid-read; surfacing partial results"
            ),
        }

        Ok(outcome)
    }

    /// The `Scanning` state: sequential read, batching, cancellation polls,
    /// and progress publication.
    fn scan_lines<R: BufRead>(
        &self,
        mut reader: R,
        query: &Query,
        total_lines: u64,
        cancel: &AtomicBool,
        on_progress: &mut dyn FnMut(ProgressSnapshot),
    ) -> SearchOutcome {
        let mut publisher = ProgressPublisher::new(self.config.publish_interval);

        let mut batch: Vec<String> = Vec::with_capacity(self.config.chunk_size.min(65_536));
        let mut results: Vec<Record> = Vec::new();
        let mut dedup = DedupSet::new();
        let mut processed_lines: u64 = 0;
        let mut raw: Vec<u8> = Vec::with_capacity(256);

        // Exactly one header line is skipped. An empty file (zero lines) is
        // a trivially complete scan.
        raw.clear();
        match reader.read_until(b'\n', &mut raw) {
            Ok(0) => {
                return finish(
                    Termination::Completed,
                    results,
                    0,
                    total_lines,
                    &mut publisher,
                    on_progress,
                );
            }
            Ok(_) => {}
            Err(e) => {
                return finish(
                    Termination::Failed {
                        error: e.to_string(),
                    },
                    results,
                    0,
                    total_lines,
                    &mut publisher,
                    on_progress,
                );
            }
        }

        loop {
            raw.clear();
            let read = match reader.read_until(b'\n', &mut raw) {
                Ok(n) => n,
                Err(e) => {
                    // Best effort: the accumulated batch is still processed
                    // so already-read lines keep their matches.
                    process_batch(&batch, query, &mut dedup, &mut results);
                    return finish(
                        Termination::Failed {
                            error: e.to_string(),
                        },
                        results,
                        processed_lines,
                        total_lines,
                        &mut publisher,
                        on_progress,
                    );
                }
            };

            if read == 0 {
                // End of input: process the remaining partial batch.
                process_batch(&batch, query, &mut dedup, &mut results);
                return finish(
                    Termination::Completed,
                    results,
                    processed_lines,
                    total_lines,
                    &mut publisher,
                    on_progress,
                );
            }

            // Cancellation is polled before each line joins the batch. The
            // current batch is processed before halting, so cancellation
            // never drops a match among lines already read into it.
            if cancel.load(Ordering::Relaxed) {
                process_batch(&batch, query, &mut dedup, &mut results);
                debug!(processed_lines, "Stop request observed");
                return finish(
                    Termination::Cancelled,
                    results,
                    processed_lines,
                    total_lines,
                    &mut publisher,
                    on_progress,
                );
            }

            processed_lines += 1;
            batch.push(decode_line(&raw));

            if batch.len() >= self.config.chunk_size {
                process_batch(&batch, query, &mut dedup, &mut results);
                batch.clear();
                publisher.maybe_publish(processed_lines, total_lines, &results, on_progress);
            }
        }
    }
}

/// Seal a scan into its outcome, emitting the forced terminal snapshot.
///
/// Failed scans report through the return value only; the forced snapshot
/// is for `Completed` (percent pinned to 100) and `Cancelled` (last
/// observed percent).
fn finish(
    termination: Termination,
    results: Vec<Record>,
    processed_lines: u64,
    total_lines: u64,
    publisher: &mut ProgressPublisher,
    on_progress: &mut dyn FnMut(ProgressSnapshot),
) -> SearchOutcome {
    if !matches!(termination, Termination::Failed { .. }) {
        let completed = termination == Termination::Completed;
        publisher.publish_final(processed_lines, total_lines, &results, completed, on_progress);
    }
    let elapsed = publisher.elapsed();
    SearchOutcome {
        termination,
        records: results,
        processed_lines,
        elapsed,
    }
}

/// Run extract → filter → dedup over one batch, appending accepted records.
///
/// Holds the core invariant: `results.len() == dedup.len()` before and after
/// every call. Identifiers of non-matching lines never enter the dedup set,
/// so a later line with the same identifier can still produce the entry.
fn process_batch(batch: &[String], query: &Query, dedup: &mut DedupSet, results: &mut Vec<Record>) {
    for line in batch {
        let Some(record) = extract::extract(line) else {
            // Malformed line — not an error, just a no-match.
            continue;
        };
        if !query.matches(&record) {
            continue;
        }
        if dedup.accept(&record.identifier) {
            results.push(record);
        }
    }
    debug_assert_eq!(results.len(), dedup.len());
}

/// Decode one raw line, stripping the terminator.
///
/// Invalid UTF-8 sequences are dropped, not substituted: the valid bytes on
/// either side of a bad sequence join into one contiguous value, so a field
/// with a stray corrupt byte in it still matches substring queries against
/// its readable part. A genuine U+FFFD in valid input is preserved.
fn decode_line(raw: &[u8]) -> String {
    let mut end = raw.len();
    if end > 0 && raw[end - 1] == b'\n' {
        end -= 1;
    }
    if end > 0 && raw[end - 1] == b'\r' {
        end -= 1;
    }
    let trimmed = &raw[..end];
    match std::str::from_utf8(trimmed) {
        Ok(s) => s.to_owned(),
        Err(_) => String::from_utf8_lossy(trimmed)
            .chars()
            .filter(|&c| c != char::REPLACEMENT_CHARACTER)
            .collect(),
    }
}

// ─── Background-thread wrapper ───────────────────────────────────────────────

/// Handle to a scan running on a background thread.
///
/// Progress and the terminal update arrive on `updates`; exactly one
/// terminal [`ScanUpdate`] is sent per scan, always last.
pub struct ScanHandle {
    /// Receiver for progress and terminal updates from the scan thread.
    pub updates: Receiver<ScanUpdate>,
    /// Flag to request cancellation.
    cancel_flag: Arc<AtomicBool>,
    /// Join handle for the scan thread.
    _thread: Option<thread::JoinHandle<()>>,
}

impl ScanHandle {
    /// Request the scan to stop at the next cancellation poll. Non-blocking.
    pub fn cancel(&self) {
        self.cancel_flag.store(true, Ordering::Relaxed);
    }

    /// Check whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.cancel_flag.load(Ordering::Relaxed)
    }
}

/// Start a scan on a named background thread.
///
/// Pre-flight failures surface as a `ScanUpdate::Failed` with no records.
/// The spawned thread owns its own [`Searcher`]; hosts that want the
/// session line-count cache across scans drive [`Searcher::run`] directly.
pub fn start_scan(
    path: PathBuf,
    query: Query,
    config: SearchConfig,
    activity: Option<ActivityHandle>,
) -> ScanHandle {
    let (tx, rx) = crossbeam_channel::bounded::<ScanUpdate>(UPDATE_CHANNEL_CAPACITY);
    let cancel_flag = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel_flag.clone();

    let thread = thread::Builder::new()
        .name("telelookup-scan".into())
        .spawn(move || {
            let mut searcher = Searcher::new(config);
            let progress_tx = tx.clone();
            let result = searcher.run(
                &path,
                &query,
                &cancel_clone,
                activity.as_ref(),
                move |snapshot| {
                    let _ = progress_tx.send(ScanUpdate::Progress(snapshot));
                },
            );

            let terminal = match result {
                Ok(outcome) => match outcome.termination {
                    Termination::Completed => ScanUpdate::Completed {
                        records: outcome.records,
                        processed_lines: outcome.processed_lines,
                        elapsed: outcome.elapsed,
                    },
                    Termination::Cancelled => ScanUpdate::Cancelled {
                        records: outcome.records,
                        processed_lines: outcome.processed_lines,
                        elapsed: outcome.elapsed,
                    },
                    Termination::Failed { error } => ScanUpdate::Failed {
                        error,
                        records: outcome.records,
                    },
                },
                Err(e) => ScanUpdate::Failed {
                    error: e.to_string(),
                    records: Vec::new(),
                },
            };
            let _ = tx.send(terminal);
        })
        .expect("failed to spawn scan thread");

    ScanHandle {
        updates: rx,
        cancel_flag,
        _thread: Some(thread),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor, Read};

    /// Yields its data normally, then fails instead of signalling EOF.
    struct TruncatedReader {
        data: Cursor<Vec<u8>>,
    }

    impl Read for TruncatedReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let n = self.data.read(buf)?;
            if n == 0 {
                return Err(io::Error::new(io::ErrorKind::Other, "device error"));
            }
            Ok(n)
        }
    }

    #[test]
    fn mid_scan_read_error_flushes_batch_and_terminates_failed() {
        let data = b"header\n\
                     {'id': 1, 'username': 'a', 'phone': '9'}\n\
                     {'id': 2, 'username': 'b', 'phone': '9'}\n"
            .to_vec();
        let reader = BufReader::new(TruncatedReader {
            data: Cursor::new(data),
        });

        // chunk_size larger than the line count: both lines sit in the
        // unprocessed batch when the read error hits.
        let searcher = Searcher::new(SearchConfig {
            chunk_size: 10,
            publish_interval: Duration::ZERO,
            ..SearchConfig::default()
        });
        let mut snapshots = 0usize;
        let outcome = searcher.scan_lines(
            reader,
            &Query::default(),
            3,
            &AtomicBool::new(false),
            &mut |_| snapshots += 1,
        );

        assert!(matches!(outcome.termination, Termination::Failed { .. }));
        // Lines read before the failure keep their matches.
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].identifier, "1");
        assert_eq!(outcome.processed_lines, 2);
        // Failed terminations get no forced terminal snapshot.
        assert_eq!(snapshots, 0);
    }

    #[test]
    fn read_error_on_header_fails_with_no_lines_processed() {
        let reader = BufReader::new(TruncatedReader {
            data: Cursor::new(Vec::new()),
        });
        let searcher = Searcher::new(SearchConfig::default());
        let outcome = searcher.scan_lines(
            reader,
            &Query::default(),
            0,
            &AtomicBool::new(false),
            &mut |_| {},
        );

        assert!(matches!(outcome.termination, Termination::Failed { .. }));
        assert!(outcome.records.is_empty());
        assert_eq!(outcome.processed_lines, 0);
    }

    #[test]
    fn invalid_utf8_bytes_are_dropped_not_substituted() {
        let line = decode_line(b"{'id': 1, 'username': 'u', 'phone': '98\xff9'}\n");
        let record = extract::extract(&line).expect("line must stay extractable");
        assert_eq!(record.phone, "989");
        assert!(Query::new("", "", "989").matches(&record));
    }

    #[test]
    fn genuine_replacement_char_in_valid_input_is_preserved() {
        assert_eq!(decode_line("ok\u{FFFD}\n".as_bytes()), "ok\u{FFFD}");
    }
}
