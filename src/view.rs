use crate::model::TelemetryRecord;

/// Maximum number of records shown to the operator.
pub const TELEMETRY_VIEW_LIMIT: usize = 25;

/// Take the `TELEMETRY_VIEW_LIMIT` most recent records of an oldest-first `history` and return
/// them newest first.
pub fn telemetry_view(history: &[TelemetryRecord]) -> Vec<TelemetryRecord> {
    let start = history.len().saturating_sub(TELEMETRY_VIEW_LIMIT);
    history[start..].iter().rev().cloned().collect()
}
