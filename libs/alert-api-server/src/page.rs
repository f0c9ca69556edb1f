use std::fmt::Write;

use alert_store::AlertRecord;

/// Full HTML page describing one alert. Every field is escaped.
pub fn render_alert(alert: &AlertRecord) -> String {
    let mut html = String::with_capacity(1024 + alert.long_message.len());
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    let _ = writeln!(html, "<title>Alert {}</title>", escape(&alert.id));
    html.push_str(STYLE);
    html.push_str("</head>\n<body>\n<table>\n");

    let rows = [
        ("ID", alert.id.as_str()),
        ("Time", alert.timestamp.as_str()),
        ("Hostname", alert.source.as_str()),
        ("Task Name", alert.task_name.as_str()),
        ("Message", alert.short_message.as_str()),
        ("Status", alert.status.describe()),
    ];
    for (label, value) in rows {
        let _ = writeln!(html, "<tr><th>{label}</th><td>{}</td></tr>", escape(value));
    }

    html.push_str("</table>\n<h3>Command output</h3>\n");
    let _ = writeln!(html, "<pre>{}</pre>", escape(&alert.long_message));
    html.push_str("</body>\n</html>\n");
    html
}

const STYLE: &str = "<style>\n\
body { font-family: sans-serif; margin: 2em; }\n\
th { text-align: left; padding-right: 2em; }\n\
pre { background: #f4f4f4; padding: 1em; }\n\
</style>\n";

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
