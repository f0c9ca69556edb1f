use std::fs::File;
use std::io::{BufRead, BufReader};
use std::num::NonZeroU32;
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::config::StoreConfig;
use crate::error::StoreError;
use crate::layout::{end_marker, path_for, window};
use crate::record::{parse, AlertRecord};

// ════════════════════════════════════════════════════════════════
//  LogSearcher
// ════════════════════════════════════════════════════════════════

/// Resolves an alert id to its record by scanning the day files of the
/// retention window concurrently, one blocking task per day.
///
/// The first task to decode a matching block fires a per-call
/// [`CancellationToken`]; the others stop at their next line boundary.
/// `find` returns only after every task has been joined.
#[derive(Debug, Clone)]
pub struct LogSearcher {
    dir: PathBuf,
    window_days: NonZeroU32,
}

/// Search `window_days` days back from today in `dir` for `id`.
pub async fn find(
    dir: impl Into<PathBuf>,
    id: &str,
    window_days: NonZeroU32,
) -> Result<AlertRecord, StoreError> {
    LogSearcher::new(dir, window_days).find(id).await
}

impl LogSearcher {
    pub fn new(dir: impl Into<PathBuf>, window_days: NonZeroU32) -> Self {
        Self { dir: dir.into(), window_days }
    }

    pub fn from_config(config: &StoreConfig) -> Self {
        Self::new(config.log_dir.clone(), config.window_days)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn window_days(&self) -> NonZeroU32 {
        self.window_days
    }

    /// Look `id` up with today's local date as the newest day of the window.
    pub async fn find(&self, id: &str) -> Result<AlertRecord, StoreError> {
        self.find_from(id, Local::now().date_naive()).await
    }

    /// Look `id` up in `today` and the `window_days - 1` days before it.
    pub async fn find_from(&self, id: &str, today: NaiveDate) -> Result<AlertRecord, StoreError> {
        let search = self.search(id, today).await;
        tracing::debug!(
            id,
            launched = search.stats.launched,
            joined = search.stats.joined,
            cancelled = search.stats.cancelled,
            "alert search finished"
        );
        search.outcome.unwrap_or_else(|| Err(StoreError::NotFound { id: id.to_owned() }))
    }

    pub(crate) async fn search(&self, id: &str, today: NaiveDate) -> Search {
        let token = CancellationToken::new();
        // Dropping the caller's future must still stop the blocking scans.
        let _stop_on_drop = token.clone().drop_guard();

        let mut tasks = JoinSet::new();
        for date in window(today, self.window_days.get()) {
            let path = path_for(&self.dir, date);
            let id = id.to_owned();
            let token = token.clone();
            tasks.spawn_blocking(move || scan_day(&path, &id, &token));
        }

        let mut search = Search {
            outcome: None,
            stats: SearchStats { launched: tasks.len(), ..SearchStats::default() },
        };

        while let Some(joined) = tasks.join_next().await {
            search.stats.joined += 1;
            match joined {
                Ok(DayScan::Matched(result)) => {
                    if search.outcome.is_none() {
                        token.cancel();
                        search.outcome = Some(result);
                    }
                }
                Ok(DayScan::Cancelled) => search.stats.cancelled += 1,
                Ok(DayScan::Absent | DayScan::NoMatch) => {}
                Err(e) => {
                    tracing::warn!(id, error = %e, "day scan task failed, treating day as empty");
                }
            }
        }

        search
    }
}

pub(crate) struct Search {
    pub(crate) outcome: Option<Result<AlertRecord, StoreError>>,
    pub(crate) stats: SearchStats,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SearchStats {
    pub(crate) launched: usize,
    pub(crate) joined: usize,
    pub(crate) cancelled: usize,
}

// ════════════════════════════════════════════════════════════════
//  Per-day scan
// ════════════════════════════════════════════════════════════════

#[derive(Debug)]
enum DayScan {
    /// No file for this day, or it could not be opened/read.
    Absent,
    /// Read to EOF without a complete block for the id.
    NoMatch,
    /// Stopped early because another day already matched.
    Cancelled,
    Matched(Result<AlertRecord, StoreError>),
}

fn scan_day(path: &Path, id: &str, token: &CancellationToken) -> DayScan {
    if token.is_cancelled() {
        return DayScan::Cancelled;
    }

    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return DayScan::Absent,
        Err(e) => {
            tracing::warn!(file = %path.display(), error = %e, "cannot open day log, skipping");
            return DayScan::Absent;
        }
    };

    let marker = end_marker(id);
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();
    let mut cursor = Cursor::Between;

    loop {
        if token.is_cancelled() {
            return DayScan::Cancelled;
        }

        buf.clear();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => return DayScan::NoMatch,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(file = %path.display(), error = %e, "read failed, skipping rest of day");
                return DayScan::Absent;
            }
        }

        let line = String::from_utf8_lossy(trim_line_ending(&buf));
        let next = match &mut cursor {
            Cursor::Between if line.is_empty() => None,
            Cursor::Between if line == id => Some(Cursor::Collecting(vec![line.into_owned()])),
            Cursor::Between => Some(Cursor::Skipping(end_marker(&line))),
            Cursor::Skipping(other) => (line == other.as_str()).then_some(Cursor::Between),
            // Only the marker ends the block: a field or the status code may equal the id.
            Cursor::Collecting(lines) => {
                if line == marker.as_str() {
                    tracing::info!(file = %path.display(), id, "alert block located");
                    return DayScan::Matched(parse(lines));
                }
                lines.push(line.into_owned());
                None
            }
        };
        if let Some(next) = next {
            cursor = next;
        }
    }
}

/// Position of a day scan relative to the blocks of the file.
enum Cursor {
    /// Before the first block or after an end marker; the next non-blank line opens a block.
    Between,
    /// Inside another id's block, waiting for this end marker.
    Skipping(String),
    /// Interior lines of the wanted block, id line first.
    Collecting(Vec<String>),
}

fn trim_line_ending(buf: &[u8]) -> &[u8] {
    let buf = buf.strip_suffix(b"\n").unwrap_or(buf);
    buf.strip_suffix(b"\r").unwrap_or(buf)
}
