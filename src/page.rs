use audit_dashboard::model::Instant;
use audit_dashboard::view::TELEMETRY_VIEW_LIMIT;
use audit_dashboard::Snapshot;
use chrono::Local;
use html_escape::{encode_double_quoted_attribute, encode_text};

/// Local time for parsed instants, the service's own text otherwise.
fn display_time(instant: &Instant) -> String {
    match instant {
        Instant::Parsed(dt) => dt.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Instant::Raw(s) => encode_text(s).into_owned(),
    }
}

/// Render `snapshot` as the dashboard page.
pub fn render(snapshot: &Snapshot) -> String {
    let mut html = String::new();

    html.push_str(&format!(
        "<html><head><title>Audit dashboard</title></head>\
         <body style=\"padding: 20px; font-family: Arial, sans-serif; max-width: 800px\">\
         <h2>Minimal Audit Interface</h2>\
         <form action=\"/select\" method=\"get\"><label>Select Device: \
         <input type=\"text\" name=\"device_id\" value=\"{}\"></label> \
         <button type=\"submit\">Load</button></form>\
         <form action=\"/refresh\" method=\"post\"><button type=\"submit\">Refresh</button></form>",
        encode_double_quoted_attribute(&snapshot.device_id)
    ));

    if snapshot.loading {
        html.push_str("<p>Loading data...</p>");
    }
    if let Some(error) = &snapshot.error {
        html.push_str(&format!(
            "<p style=\"color: red\">Error: {}</p>",
            encode_text(error)
        ));
    }

    if let Some(stats) = &snapshot.stats {
        html.push_str(&format!(
            "<div><h3>Summary for device: {}</h3>\
             <p>Total accepted records: {}</p>\
             <p>Duplicate records discarded: {}</p>\
             <p>Other discarded records: {}</p>\
             <p>Active alerts: {}</p></div>",
            encode_text(&snapshot.device_id),
            stats.total_entries,
            stats.duplicates_count,
            stats.discarded_count,
            snapshot.alerts.len()
        ));
    }

    if !snapshot.alerts.is_empty() {
        html.push_str("<div><h3>Active Alerts</h3><ul>");
        for alert in &snapshot.alerts {
            html.push_str(&format!(
                "<li id=\"alert-{}\"><strong>{}</strong> - {} (Triggered at: {})</li>",
                encode_double_quoted_attribute(&alert.id.to_string()),
                encode_text(&alert.alert_type),
                encode_text(&alert.details),
                display_time(&alert.triggered_at)
            ));
        }
        html.push_str("</ul></div>");
    }

    html.push_str(&format!(
        "<div><h3>Last {} Telemetry Records</h3>\
         <table style=\"width: 100%; border-collapse: collapse\" border=\"1\">\
         <thead><tr><th>Timestamp</th><th>Voltage</th><th>Current</th><th>Power</th>\
         <th>Is Duplicate</th></tr></thead><tbody>",
        TELEMETRY_VIEW_LIMIT
    ));
    for record in &snapshot.telemetry_view {
        html.push_str(&format!(
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            display_time(&record.timestamp),
            record.voltage,
            record.current,
            record.power,
            if record.is_duplicate { "Yes" } else { "No" }
        ));
    }
    if snapshot.telemetry_view.is_empty() {
        html.push_str(
            "<tr><td colspan=\"5\" style=\"text-align: center\">No telemetry records found.</td></tr>",
        );
    }
    html.push_str("</tbody></table></div></body></html>");

    html
}
