use alert_store::AlertRecord;

/// Console view of the live feed: one row per received alert, header on first row.
///
/// Only the summary goes to the console; the full record lives in the day log.
#[derive(Default)]
pub(crate) struct AlertTable {
    header_printed: bool,
}

impl AlertTable {
    pub(crate) fn print(&mut self, alert: &AlertRecord) {
        if !self.header_printed {
            println!("{}", header());
            self.header_printed = true;
        }
        println!("{}", row(alert));
    }
}

pub(crate) fn header() -> String {
    format!("{:<9} {:<23} {:<16} {}", "TIME", "ID", "Host", "Message")
}

pub(crate) fn row(alert: &AlertRecord) -> String {
    format!(
        "{:<9} {:<23} {:<16} {}",
        time_of_day(&alert.timestamp),
        alert.id,
        alert.source,
        alert.short_message
    )
}

/// `2021-Oct-27 13:40:04` → `13:40:04`. Timestamps without a date part pass through.
fn time_of_day(timestamp: &str) -> &str {
    timestamp.split_once(' ').map_or(timestamp, |(_, time)| time)
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_store::Status;

    fn alert() -> AlertRecord {
        AlertRecord {
            id: "1635149439253".into(),
            timestamp: "2021-Oct-25 13:00:10".into(),
            source: "srv01".into(),
            task_name: "cpu".into(),
            short_message: "cpu usage on > 10%. take action immediately".into(),
            long_message: "details".into(),
            status: Status::ActionRequired,
        }
    }

    #[test]
    fn header_columns() {
        assert_eq!(header(), "TIME      ID                      Host             Message");
    }

    #[test]
    fn row_shows_time_only() {
        assert_eq!(
            row(&alert()),
            "13:00:10  1635149439253           srv01            cpu usage on > 10%. take action immediately"
        );
    }

    #[test]
    fn timestamp_without_space_is_kept() {
        assert_eq!(time_of_day("13:00:10"), "13:00:10");
    }

    #[test]
    fn header_printed_once() {
        let mut table = AlertTable::default();
        assert!(!table.header_printed);
        table.print(&alert());
        table.print(&alert());
        assert!(table.header_printed);
    }
}
