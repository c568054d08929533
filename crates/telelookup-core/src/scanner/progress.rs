/// Throttled progress publication — snapshots sent from the scan loop to a
/// consumer callback, plus the channel message type used by the
/// background-thread wrapper.
///
/// Snapshots are cheap but not free (they clone the results-so-far list), so
/// batch-boundary publishes are rate-limited to one per interval. Terminal
/// publishes bypass the throttle so the consumer always sees the complete
/// final result set.
use crate::model::Record;
use std::time::{Duration, Instant};

/// Default minimum wall-clock gap between two throttled publishes.
pub const DEFAULT_PUBLISH_INTERVAL: Duration = Duration::from_millis(500);

/// A point-in-time view of a running (or finished) scan.
#[derive(Debug, Clone)]
pub struct ProgressSnapshot {
    /// Scan progress, clamped to 0–100. May be computed against a stale
    /// total line count; the clamp absorbs any overshoot.
    pub percent: u8,
    /// Wall-clock time since the scan entered `Scanning`.
    pub elapsed: Duration,
    /// Number of records accepted so far (`results.len()`).
    pub found: usize,
    /// Copy of the accepted records in first-acceptance order.
    pub results: Vec<Record>,
}

/// Progress updates sent from the scan thread by [`super::start_scan`].
///
/// Exactly one terminal variant is sent per scan, always last.
#[derive(Debug)]
pub enum ScanUpdate {
    /// Periodic throttled snapshot, plus the forced terminal snapshot.
    Progress(ProgressSnapshot),
    /// Scan reached end-of-file.
    Completed {
        records: Vec<Record>,
        processed_lines: u64,
        elapsed: Duration,
    },
    /// Scan halted at a user stop request; `records` holds everything
    /// accepted before the stop was observed.
    Cancelled {
        records: Vec<Record>,
        processed_lines: u64,
        elapsed: Duration,
    },
    /// Scan aborted on an I/O failure; `records` is best-effort partial.
    Failed { error: String, records: Vec<Record> },
}

/// Computes percent values and enforces the publish throttle.
pub struct ProgressPublisher {
    interval: Duration,
    started: Instant,
    last_publish: Option<Instant>,
}

impl ProgressPublisher {
    /// Starts the elapsed-time clock immediately.
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            started: Instant::now(),
            last_publish: None,
        }
    }

    /// Time since the publisher (and the scan) started.
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Publish a snapshot unless one was already published within the
    /// configured interval. Returns whether a snapshot was emitted.
    pub fn maybe_publish(
        &mut self,
        processed_lines: u64,
        total_lines: u64,
        results: &[Record],
        sink: &mut dyn FnMut(ProgressSnapshot),
    ) -> bool {
        if let Some(last) = self.last_publish {
            if last.elapsed() < self.interval {
                return false;
            }
        }
        self.emit(percent_of(processed_lines, total_lines), results, sink);
        true
    }

    /// Terminal publish — always emits, ignoring the throttle.
    ///
    /// A completed scan reports 100 regardless of the (possibly stale)
    /// total; a cancelled scan reports the last observed percent.
    pub fn publish_final(
        &mut self,
        processed_lines: u64,
        total_lines: u64,
        results: &[Record],
        completed: bool,
        sink: &mut dyn FnMut(ProgressSnapshot),
    ) {
        let percent = if completed {
            100
        } else {
            percent_of(processed_lines, total_lines)
        };
        self.emit(percent, results, sink);
    }

    fn emit(&mut self, percent: u8, results: &[Record], sink: &mut dyn FnMut(ProgressSnapshot)) {
        self.last_publish = Some(Instant::now());
        sink(ProgressSnapshot {
            percent,
            elapsed: self.elapsed(),
            found: results.len(),
            results: results.to_vec(),
        });
    }
}

/// `min(100, processed / total * 100)` in integer arithmetic.
///
/// `total == 0` maps to 100: a file with no countable lines has nothing
/// left to process.
pub fn percent_of(processed_lines: u64, total_lines: u64) -> u8 {
    if total_lines == 0 {
        return 100;
    }
    (processed_lines.saturating_mul(100) / total_lines).min(100) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(n: usize) -> Vec<Record> {
        (0..n)
            .map(|i| Record::new(format!("{i}"), "user", "989"))
            .collect()
    }

    #[test]
    fn percent_is_clamped_to_100() {
        assert_eq!(percent_of(0, 10), 0);
        assert_eq!(percent_of(5, 10), 50);
        assert_eq!(percent_of(10, 10), 100);
        // Stale total: file grew after counting.
        assert_eq!(percent_of(250, 10), 100);
        assert_eq!(percent_of(1, 0), 100);
    }

    #[test]
    fn zero_interval_publishes_every_time() {
        let mut publisher = ProgressPublisher::new(Duration::ZERO);
        let mut seen = Vec::new();
        let mut sink = |s: ProgressSnapshot| seen.push(s);
        assert!(publisher.maybe_publish(1, 10, &records(1), &mut sink));
        assert!(publisher.maybe_publish(2, 10, &records(2), &mut sink));
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].found, 2);
        assert_eq!(seen[1].results.len(), 2);
    }

    #[test]
    fn throttle_suppresses_rapid_publishes() {
        let mut publisher = ProgressPublisher::new(Duration::from_secs(3600));
        let mut count = 0usize;
        let mut sink = |_s: ProgressSnapshot| count += 1;
        assert!(publisher.maybe_publish(1, 10, &[], &mut sink));
        assert!(!publisher.maybe_publish(2, 10, &[], &mut sink));
        assert!(!publisher.maybe_publish(3, 10, &[], &mut sink));
        assert_eq!(count, 1);
    }

    #[test]
    fn final_publish_ignores_throttle() {
        let mut publisher = ProgressPublisher::new(Duration::from_secs(3600));
        let mut snapshots = Vec::new();
        let mut sink = |s: ProgressSnapshot| snapshots.push(s);
        publisher.maybe_publish(1, 10, &[], &mut sink);
        publisher.publish_final(5, 10, &records(3), true, &mut sink);
        assert_eq!(snapshots.len(), 2);
        // Completed forces 100 even though only half the lines were seen.
        assert_eq!(snapshots[1].percent, 100);
        assert_eq!(snapshots[1].found, 3);
    }

    #[test]
    fn cancelled_final_publish_keeps_observed_percent() {
        let mut publisher = ProgressPublisher::new(Duration::from_secs(3600));
        let mut snapshots = Vec::new();
        let mut sink = |s: ProgressSnapshot| snapshots.push(s);
        publisher.publish_final(5, 10, &[], false, &mut sink);
        assert_eq!(snapshots[0].percent, 50);
    }
}
