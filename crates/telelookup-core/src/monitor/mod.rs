/// Activity-timestamp boundary for an external idle-timeout supervisor.
///
/// The hosting shell marks activity on every user interaction; a background
/// supervisor polls `is_idle_beyond` on its own cadence and decides what to
/// do about prolonged inactivity. Neither side is implemented here — this
/// module is only the shared timestamp both of them touch.
///
/// The timestamp is a single `AtomicU64` of wall-clock milliseconds with
/// single-writer/multi-reader discipline: no locks, and no coordination with
/// the scan thread. The scanner marks activity around scan start and stop so
/// long-running scans never read as idle.
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Cloneable handle over the shared last-activity timestamp.
///
/// All clones observe the same timestamp; cloning is the intended way to
/// hand the handle to the UI side, the supervisor side, and the scanner.
#[derive(Debug, Clone)]
pub struct ActivityHandle {
    last_activity_ms: Arc<AtomicU64>,
}

impl ActivityHandle {
    /// Create a handle with the activity clock set to now.
    pub fn new() -> Self {
        Self {
            last_activity_ms: Arc::new(AtomicU64::new(now_millis())),
        }
    }

    /// Record that user (or scan) activity happened now.
    pub fn mark_activity(&self) {
        self.last_activity_ms.store(now_millis(), Ordering::Relaxed);
    }

    /// Time since the last recorded activity.
    ///
    /// Saturates at zero if the clock stepped backwards between the write
    /// and this read.
    pub fn idle_for(&self) -> Duration {
        let last = self.last_activity_ms.load(Ordering::Relaxed);
        Duration::from_millis(now_millis().saturating_sub(last))
    }

    /// `true` once no activity has been recorded for longer than `threshold`.
    pub fn is_idle_beyond(&self, threshold: Duration) -> bool {
        self.idle_for() > threshold
    }
}

impl Default for ActivityHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Wall-clock milliseconds since the Unix epoch.
fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn fresh_handle_is_not_idle() {
        let handle = ActivityHandle::new();
        assert!(!handle.is_idle_beyond(Duration::from_secs(1)));
    }

    #[test]
    fn idle_time_grows_without_marks() {
        let handle = ActivityHandle::new();
        thread::sleep(Duration::from_millis(25));
        assert!(handle.idle_for() >= Duration::from_millis(20));
        assert!(handle.is_idle_beyond(Duration::from_millis(10)));
    }

    #[test]
    fn marking_resets_the_idle_clock() {
        let handle = ActivityHandle::new();
        thread::sleep(Duration::from_millis(25));
        handle.mark_activity();
        assert!(!handle.is_idle_beyond(Duration::from_millis(15)));
    }

    #[test]
    fn clones_share_one_timestamp() {
        let writer = ActivityHandle::new();
        let reader = writer.clone();
        thread::sleep(Duration::from_millis(25));
        writer.mark_activity();
        assert!(!reader.is_idle_beyond(Duration::from_millis(15)));
    }

    #[test]
    fn marks_are_visible_across_threads() {
        let handle = ActivityHandle::new();
        let writer = handle.clone();
        let t = thread::spawn(move || {
            thread::sleep(Duration::from_millis(20));
            writer.mark_activity();
        });
        t.join().unwrap();
        assert!(!handle.is_idle_beyond(Duration::from_millis(15)));
    }
}
