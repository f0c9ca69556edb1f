use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::layout::end_marker;

// ════════════════════════════════════════════════════════════════
//  Status
// ════════════════════════════════════════════════════════════════

/// Outcome reported by the agent. `0` on the wire and on disk means `Ok`,
/// any other integer means `ActionRequired`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "i32", into = "i32")]
pub enum Status {
    Ok,
    ActionRequired,
}

impl Status {
    pub fn code(self) -> i32 {
        match self {
            Status::Ok => 0,
            Status::ActionRequired => 1,
        }
    }

    /// Operator-facing wording used by the lookup front ends.
    pub fn describe(self) -> &'static str {
        match self {
            Status::Ok => "OK (actions executed successfully)",
            Status::ActionRequired => "Require manual effort",
        }
    }
}

impl From<i32> for Status {
    fn from(code: i32) -> Self {
        if code == 0 { Status::Ok } else { Status::ActionRequired }
    }
}

impl From<Status> for i32 {
    fn from(status: Status) -> Self {
        status.code()
    }
}

// ════════════════════════════════════════════════════════════════
//  AlertRecord
// ════════════════════════════════════════════════════════════════

/// One alert as pushed by a remote agent.
///
/// Serde names follow the ingestion feed: `time, id, from, taskName, short, long, status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRecord {
    pub id: String,
    #[serde(rename = "time")]
    pub timestamp: String,
    #[serde(rename = "from")]
    pub source: String,
    #[serde(rename = "taskName")]
    pub task_name: String,
    #[serde(rename = "short")]
    pub short_message: String,
    #[serde(rename = "long")]
    pub long_message: String,
    pub status: Status,
}

impl AlertRecord {
    /// Check the preconditions the block format relies on.
    ///
    /// The codec never calls this; the ingestion path does, before `append`.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.id.is_empty() {
            return Err(StoreError::InvalidRecord("empty id".into()));
        }

        let single_line = [
            ("id", &self.id),
            ("time", &self.timestamp),
            ("from", &self.source),
            ("taskName", &self.task_name),
            ("short", &self.short_message),
        ];
        let marker = end_marker(&self.id);
        for (field, value) in single_line {
            if value.contains(['\n', '\r']) {
                return Err(StoreError::InvalidRecord(format!("'{field}' spans multiple lines")));
            }
            if *value == marker {
                return Err(StoreError::InvalidRecord(format!("'{field}' repeats the end marker")));
            }
        }

        if self.long_message.split('\n').any(|line| line == self.id || line == marker) {
            return Err(StoreError::InvalidRecord(format!(
                "long message repeats the id '{}' as a line",
                self.id
            )));
        }

        Ok(())
    }
}

// ════════════════════════════════════════════════════════════════
//  Block codec
// ════════════════════════════════════════════════════════════════

/// Fixed fields (id, time, source, task, short) plus the status line.
pub const MIN_BLOCK_LINES: usize = 6;

/// Lines of one block, end marker included:
/// `[id, time, source, task, short, long.., status, ENDOF<id>]`.
///
/// No escaping; `long_message` is split on `\n` verbatim, so an empty long
/// message still occupies one (empty) line.
pub fn serialize(record: &AlertRecord) -> Vec<String> {
    let mut lines = vec![
        record.id.clone(),
        record.timestamp.clone(),
        record.source.clone(),
        record.task_name.clone(),
        record.short_message.clone(),
    ];
    lines.extend(record.long_message.split('\n').map(str::to_owned));
    lines.push(record.status.code().to_string());
    lines.push(end_marker(&record.id));
    lines
}

/// Block text as it lands in a day file, followed by the blank separator line.
pub fn to_block(record: &AlertRecord) -> String {
    let mut block = serialize(record).join("\n");
    block.push_str("\n\n");
    block
}

/// Rebuild a record from the interior lines of a block (id line through the
/// status line, end marker excluded).
pub fn parse<S: AsRef<str>>(lines: &[S]) -> Result<AlertRecord, StoreError> {
    if lines.len() < MIN_BLOCK_LINES {
        return Err(StoreError::MalformedRecord(format!(
            "expected at least {MIN_BLOCK_LINES} lines, got {}",
            lines.len()
        )));
    }

    let field = |i: usize| lines[i].as_ref().to_owned();
    let last = lines.len() - 1;

    let status_line = lines[last].as_ref().trim();
    let code: i32 = status_line
        .parse()
        .map_err(|e| StoreError::MalformedRecord(format!("status '{status_line}': {e}")))?;

    let long_message = lines[5..last]
        .iter()
        .map(AsRef::<str>::as_ref)
        .collect::<Vec<_>>()
        .join("\n");

    Ok(AlertRecord {
        id: field(0),
        timestamp: field(1),
        source: field(2),
        task_name: field(3),
        short_message: field(4),
        long_message,
        status: Status::from(code),
    })
}
