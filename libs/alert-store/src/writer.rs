use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDate};

use crate::error::StoreError;
use crate::layout::path_for;
use crate::record::{to_block, AlertRecord};

// ════════════════════════════════════════════════════════════════
//  DailyLogWriter
// ════════════════════════════════════════════════════════════════

/// Day file currently held open for append.
struct OpenDay {
    date: NaiveDate,
    path: PathBuf,
    file: BufWriter<File>,
}

/// Append-only writer over one file per calendar day.
///
/// Single producer: `append` takes `&mut self`, so callers serialize access.
/// Rotation is lazy, checked on every append against the date it targets.
pub struct DailyLogWriter {
    dir: PathBuf,
    current: Option<OpenDay>,
}

impl DailyLogWriter {
    /// Create the log directory if needed. No day file is opened yet.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .map_err(|e| StoreError::io(format!("mkdir {}", dir.display()), e))?;
        tracing::info!(dir = %dir.display(), "alert log directory ready");
        Ok(Self { dir, current: None })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Append to today's file (local calendar date).
    pub fn append(&mut self, record: &AlertRecord) -> Result<(), StoreError> {
        self.append_on(Local::now().date_naive(), record)
    }

    /// Append to the file for `date`, rotating away from any other open day.
    pub fn append_on(&mut self, date: NaiveDate, record: &AlertRecord) -> Result<(), StoreError> {
        let day = self.day_file(date)?;
        day.file
            .write_all(to_block(record).as_bytes())
            .map_err(|e| StoreError::io(format!("write {}", day.path.display()), e))?;
        day.file
            .flush()
            .map_err(|e| StoreError::io(format!("flush {}", day.path.display()), e))?;
        tracing::debug!(file = %day.path.display(), id = %record.id, "alert appended");
        Ok(())
    }

    /// Flush and sync the open day file, if any.
    pub fn close(mut self) -> Result<(), StoreError> {
        self.close_current()
    }

    fn day_file(&mut self, date: NaiveDate) -> Result<&mut OpenDay, StoreError> {
        let day = match self.current.take() {
            Some(day) if day.date == date => day,
            stale => {
                if let Some(old) = stale {
                    close_day(old)?;
                }
                self.open_day(date)?
            }
        };
        Ok(self.current.insert(day))
    }

    fn open_day(&self, date: NaiveDate) -> Result<OpenDay, StoreError> {
        // The directory may have been removed by external retention since `open`.
        std::fs::create_dir_all(&self.dir)
            .map_err(|e| StoreError::io(format!("mkdir {}", self.dir.display()), e))?;
        let path = path_for(&self.dir, date);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| StoreError::io(format!("open {}", path.display()), e))?;
        tracing::info!(file = %path.display(), "opened day log");
        Ok(OpenDay { date, path, file: BufWriter::new(file) })
    }

    fn close_current(&mut self) -> Result<(), StoreError> {
        match self.current.take() {
            Some(day) => close_day(day),
            None => Ok(()),
        }
    }
}

fn close_day(mut day: OpenDay) -> Result<(), StoreError> {
    day.file
        .flush()
        .map_err(|e| StoreError::io(format!("flush {}", day.path.display()), e))?;
    day.file
        .get_ref()
        .sync_all()
        .map_err(|e| StoreError::io(format!("sync {}", day.path.display()), e))?;
    tracing::info!(file = %day.path.display(), "closed day log");
    Ok(())
}

impl Drop for DailyLogWriter {
    fn drop(&mut self) {
        if let Err(e) = self.close_current() {
            tracing::error!(error = %e, "closing alert log on drop");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Status;

    fn record(id: &str) -> AlertRecord {
        AlertRecord {
            id: id.into(),
            timestamp: "2021-Oct-27 13:40:04".into(),
            source: "mC".into(),
            task_name: "cpu-usage-gt-10".into(),
            short_message: "cpu usage on > 10%".into(),
            long_message: "line1\nline2".into(),
            status: Status::ActionRequired,
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn open_creates_nested_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("WDC").join("logs");
        let writer = DailyLogWriter::open(&dir).unwrap();
        assert!(dir.is_dir());
        assert_eq!(writer.dir(), dir.as_path());
    }

    #[test]
    fn appends_accumulate_in_call_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = DailyLogWriter::open(tmp.path()).unwrap();
        let day = date(2021, 10, 27);
        writer.append_on(day, &record("A1")).unwrap();
        writer.append_on(day, &record("B2")).unwrap();

        let content = std::fs::read_to_string(tmp.path().join("2021-Oct-27")).unwrap();
        let expected = format!("{}{}", to_block(&record("A1")), to_block(&record("B2")));
        assert_eq!(content, expected);
    }

    #[test]
    fn rotates_when_date_changes() {
        let tmp = tempfile::tempdir().unwrap();
        let mut writer = DailyLogWriter::open(tmp.path()).unwrap();
        writer.append_on(date(2021, 10, 27), &record("A1")).unwrap();
        writer.append_on(date(2021, 10, 28), &record("B2")).unwrap();
        writer.close().unwrap();

        let first = std::fs::read_to_string(tmp.path().join("2021-Oct-27")).unwrap();
        let second = std::fs::read_to_string(tmp.path().join("2021-Oct-28")).unwrap();
        assert!(first.starts_with("A1\n"));
        assert!(!first.contains("B2"));
        assert!(second.starts_with("B2\n"));
    }

    #[test]
    fn reopening_appends_to_existing_day_file() {
        let tmp = tempfile::tempdir().unwrap();
        let day = date(2021, 10, 27);
        {
            let mut writer = DailyLogWriter::open(tmp.path()).unwrap();
            writer.append_on(day, &record("A1")).unwrap();
        }
        let mut writer = DailyLogWriter::open(tmp.path()).unwrap();
        writer.append_on(day, &record("B2")).unwrap();
        writer.close().unwrap();

        let content = std::fs::read_to_string(tmp.path().join("2021-Oct-27")).unwrap();
        assert!(content.starts_with("A1\n"));
        assert!(content.contains("\nENDOFB2\n\n"));
    }

    #[test]
    fn open_fails_when_dir_is_a_file() {
        let tmp = tempfile::tempdir().unwrap();
        let blocker = tmp.path().join("logs");
        std::fs::write(&blocker, b"not a dir").unwrap();
        let err = DailyLogWriter::open(&blocker).err().unwrap();
        assert!(matches!(err, StoreError::Io { .. }));
    }
}
