pub mod get_alerts;
pub mod get_stats;
pub mod get_telemetry;

use crate::model::Instant;
use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::Deserialize;

const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];
const DATE_FORMAT: &str = "%Y-%m-%d";

/* Instants arrive either as ISO-8601 text or as epoch milliseconds */
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(untagged)]
pub enum RawInstant {
    EpochMillis(i64),
    Fractional(f64),
    Text(String),
}

impl RawInstant {
    /// Date-only text is midnight UTC, date-time text without an offset is local time.
    /// Anything unreadable is kept as text.
    pub fn into_instant(self) -> Instant {
        match self {
            RawInstant::EpochMillis(ms) => from_millis(ms),
            RawInstant::Fractional(ms) if ms.is_finite() => from_millis(ms.round() as i64),
            RawInstant::Fractional(ms) => Instant::Raw(ms.to_string()),
            RawInstant::Text(s) => parse_text(&s).map(Instant::Parsed).unwrap_or(Instant::Raw(s)),
        }
    }
}

fn from_millis(ms: i64) -> Instant {
    Utc.timestamp_millis_opt(ms)
        .single()
        .map(Instant::Parsed)
        .unwrap_or_else(|| Instant::Raw(ms.to_string()))
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(naive) = NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
    {
        return Local
            .from_local_datetime(&naive)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(s, DATE_FORMAT)
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

#[cfg(test)]
mod test {
    use super::get_alerts::GetAlerts;
    use super::get_stats::GetStats;
    use super::get_telemetry::GetTelemetry;
    use super::RawInstant;
    use crate::model::{AlertId, Instant};
    use chrono::{Local, NaiveDateTime, TimeZone, Utc};
    use std::fs;
    use std::path::PathBuf;

    fn read_resource(filename: &str) -> String {
        let mut d = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
        d.push(format!("resources/test/{}", filename));
        fs::read_to_string(d.as_path()).unwrap()
    }

    #[test]
    fn get_telemetry() {
        let input = read_resource("telemetry.json");
        let output: GetTelemetry = serde_json::from_str(&input).unwrap();
        assert_eq!(30, output.len());
        assert_eq!(230.0, output[0].voltage);
        assert!(output[0].is_duplicate);
        assert!(!output[1].is_duplicate);
    }

    #[test]
    fn get_stats() {
        let input = read_resource("stats.json");
        let output: GetStats = serde_json::from_str(&input).unwrap();
        assert_eq!(100, output.total_entries);
        assert_eq!(5, output.duplicates_count);
        assert_eq!(2, output.discarded_count);
    }

    #[test]
    fn get_alerts() {
        let input = read_resource("alerts.json");
        let output: GetAlerts = serde_json::from_str(&input).unwrap();
        assert_eq!(2, output.len());
        assert_eq!(AlertId::Number(17), output[0].id);
        assert_eq!(AlertId::Text("a-18".to_string()), output[1].id);
        assert_eq!("OVERVOLTAGE", output[0].alert_type);
    }

    #[test]
    #[should_panic]
    fn get_stats_valid_json() {
        let valid_json_input = read_resource("valid_json.json");
        let _output: GetStats = serde_json::from_str(&valid_json_input).unwrap();
    }

    #[test]
    #[should_panic]
    fn get_telemetry_invalid_json() {
        let invalid_json_input = read_resource("invalid_json.json");
        let _output: GetTelemetry = serde_json::from_str(&invalid_json_input).unwrap();
    }

    fn text(s: &str) -> Instant {
        RawInstant::Text(s.to_string()).into_instant()
    }

    fn local(s: &str, fmt: &str) -> Instant {
        let naive = NaiveDateTime::parse_from_str(s, fmt).unwrap();
        Instant::Parsed(Local.from_local_datetime(&naive).earliest().unwrap().with_timezone(&Utc))
    }

    #[test]
    fn instants() {
        let expected = RawInstant::EpochMillis(1_714_565_700_000).into_instant();

        assert_eq!(expected, text("2024-05-01T14:15:00+02:00"));
        assert_eq!(expected, text("2024-05-01T12:15:00Z"));
        assert_eq!(expected, RawInstant::Fractional(1_714_565_700_000.2).into_instant());
        assert_eq!(
            Instant::Parsed(Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap()),
            text("2024-05-01")
        );
    }

    #[test]
    fn offsetless_instants_are_local() {
        assert_eq!(
            local("2024-05-01T12:15:00.000", "%Y-%m-%dT%H:%M:%S%.f"),
            text("2024-05-01T12:15:00.000")
        );
        assert_eq!(
            local("2024-05-01 12:15:00", "%Y-%m-%d %H:%M:%S"),
            text("2024-05-01 12:15:00")
        );
        assert_eq!(
            local("2024-05-01T12:15", "%Y-%m-%dT%H:%M"),
            text("2024-05-01T12:15")
        );
    }

    #[test]
    fn unreadable_instants_kept_verbatim() {
        assert_eq!(Instant::Raw("yesterday".to_string()), text("yesterday"));
        assert_eq!(
            Instant::Raw(i64::MAX.to_string()),
            RawInstant::EpochMillis(i64::MAX).into_instant()
        );
    }
}
