use std::fmt::Write;

use alert_store::{AlertRecord, LogSearcher, StoreError};

use crate::config::{Effective, InspectArgs};
use crate::error::WdcError;

pub async fn run(args: InspectArgs) -> Result<(), WdcError> {
    let eff = Effective::new(&args.common)?;
    let searcher = LogSearcher::from_config(&eff.store);

    match searcher.find(&args.id).await {
        Ok(alert) => {
            print!("{}", format_alert(&alert));
            Ok(())
        }
        Err(e @ StoreError::NotFound { .. }) => {
            println!("Could not find info on given log id: {e}");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}

fn format_alert(alert: &AlertRecord) -> String {
    let mut out = String::new();
    let rows = [
        ("ID", alert.id.as_str()),
        ("Time", alert.timestamp.as_str()),
        ("Hostname", alert.source.as_str()),
        ("Task Name", alert.task_name.as_str()),
        ("Message", alert.short_message.as_str()),
        ("Status", alert.status.describe()),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<14} {value}");
    }
    let _ = writeln!(out, "\nCommand output:\n{}", alert.long_message);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use alert_store::Status;

    #[test]
    fn tabular_layout() {
        let alert = AlertRecord {
            id: "A1".into(),
            timestamp: "2021-Oct-27 13:40:04".into(),
            source: "mC".into(),
            task_name: "cpu-usage-gt-10".into(),
            short_message: "cpu usage on > 10%".into(),
            long_message: "line1\nline2".into(),
            status: Status::ActionRequired,
        };
        let expected = "\
ID             A1
Time           2021-Oct-27 13:40:04
Hostname       mC
Task Name      cpu-usage-gt-10
Message        cpu usage on > 10%
Status         Require manual effort

Command output:
line1
line2
";
        assert_eq!(format_alert(&alert), expected);
    }
}
