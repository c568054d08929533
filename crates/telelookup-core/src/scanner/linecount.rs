/// Total-line counting with a single-entry, path-keyed cache.
///
/// The count reads the file in large binary blocks and counts newline bytes
/// — no text decoding, no line allocation. On a multi-gigabyte dump this is
/// the cheapest possible full pass, but it is still a full pass, so the
/// result is memoised per path for the lifetime of the session.
///
/// Staleness is accepted: if the file grows after the count, the cached
/// total is NOT re-validated. Progress percentages computed against a stale
/// total are clamped to 100 for display; the result set itself is unaffected.
use std::fs::File;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Block size for the binary counting pass.
const COUNT_BLOCK_SIZE: usize = 1024 * 1024;

/// Count newline bytes in `path` without decoding text.
///
/// A final line without a trailing newline is not counted; the dump format
/// terminates every line, so this matches the actual line count in practice.
pub fn count_lines(path: &Path) -> io::Result<u64> {
    let mut file = File::open(path)?;
    let mut block = vec![0u8; COUNT_BLOCK_SIZE];
    let mut total: u64 = 0;
    loop {
        let n = file.read(&mut block)?;
        if n == 0 {
            break;
        }
        total += block[..n].iter().filter(|&&b| b == b'\n').count() as u64;
    }
    Ok(total)
}

/// Memoises the last `(path, total_lines)` pair.
///
/// A query for the cached path is O(1); any other path triggers a full
/// recount and replaces the entry. An I/O failure leaves the cache unchanged
/// and propagates to the caller, which aborts the scan before any partial
/// state is created.
#[derive(Debug, Default)]
pub struct LineCountCache {
    entry: Option<CacheEntry>,
}

#[derive(Debug)]
struct CacheEntry {
    path: PathBuf,
    total_lines: u64,
}

impl LineCountCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total line count for `path`, from cache when the path matches the
    /// last counted one.
    pub fn total_lines(&mut self, path: &Path) -> io::Result<u64> {
        if let Some(entry) = &self.entry {
            if entry.path == path {
                debug!(total_lines = entry.total_lines, "Using cached line count");
                return Ok(entry.total_lines);
            }
        }
        let total_lines = count_lines(path)?;
        debug!(path = %path.display(), total_lines, "Counted lines");
        self.entry = Some(CacheEntry {
            path: path.to_path_buf(),
            total_lines,
        });
        Ok(total_lines)
    }

    /// Drop the cached entry; the next query recounts.
    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}
