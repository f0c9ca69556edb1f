//! File naming shared by [`DailyLogWriter`](crate::DailyLogWriter) and
//! [`LogSearcher`](crate::LogSearcher). Both sides must agree on it byte for byte.

use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};

/// chrono pattern for day file names, e.g. `2021-Oct-27`.
pub const FILE_NAME_FORMAT: &str = "%Y-%b-%d";

/// Prefix of the line that closes a block: `ENDOF<id>`.
pub const END_MARKER_PREFIX: &str = "ENDOF";

pub fn end_marker(id: &str) -> String {
    format!("{END_MARKER_PREFIX}{id}")
}

pub fn file_name_for(date: NaiveDate) -> String {
    date.format(FILE_NAME_FORMAT).to_string()
}

pub fn path_for(dir: &Path, date: NaiveDate) -> PathBuf {
    dir.join(file_name_for(date))
}

/// `today, today-1, ..., today-(days-1)`, most recent first.
///
/// Stops early instead of wrapping if the calendar runs out below `NaiveDate::MIN`.
pub fn window(today: NaiveDate, days: u32) -> impl Iterator<Item = NaiveDate> {
    (0..u64::from(days)).map_while(move |offset| today.checked_sub_days(Days::new(offset)))
}
