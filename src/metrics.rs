use audit_dashboard::Snapshot;
use prometheus::{Encoder, IntGauge, IntGaugeVec, TextEncoder};
use rocket::http::Status;

lazy_static! {
    static ref TOTAL_ENTRIES_GAUGE: IntGaugeVec = register_int_gauge_vec!(
        opts!(
            "device_total_entries",
            "records accepted by the service for the device",
        ),
        &["device_id"],
    )
    .unwrap();
    static ref DUPLICATES_GAUGE: IntGaugeVec = register_int_gauge_vec!(
        opts!(
            "device_duplicates_count",
            "records discarded by the service as duplicates",
        ),
        &["device_id"],
    )
    .unwrap();
    static ref DISCARDED_GAUGE: IntGaugeVec = register_int_gauge_vec!(
        opts!(
            "device_discarded_count",
            "records discarded by the service for other reasons",
        ),
        &["device_id"],
    )
    .unwrap();
    static ref ACTIVE_ALERTS_GAUGE: IntGaugeVec = register_int_gauge_vec!(
        opts!("device_active_alerts", "active alerts of the device",),
        &["device_id"],
    )
    .unwrap();
    static ref TELEMETRY_VIEW_GAUGE: IntGaugeVec = register_int_gauge_vec!(
        opts!(
            "device_telemetry_view_len",
            "telemetry records currently shown",
        ),
        &["device_id"],
    )
    .unwrap();
    static ref LOADING_GAUGE: IntGauge =
        register_int_gauge!("dashboard_loading", "1 while a refresh cycle is in flight").unwrap();
    static ref ERROR_GAUGE: IntGauge =
        register_int_gauge!("dashboard_error", "1 if the current cycle reported an error").unwrap();
}

/// Counters beyond `i64::MAX` saturate.
fn gauge_value(count: u64) -> i64 {
    i64::try_from(count).unwrap_or(i64::MAX)
}

/// Feed the current snapshot into the Prometheus registry. Series of previously selected devices
/// are dropped.
pub fn collect(snapshot: &Snapshot) {
    for gauge in [
        &*TOTAL_ENTRIES_GAUGE,
        &*DUPLICATES_GAUGE,
        &*DISCARDED_GAUGE,
        &*ACTIVE_ALERTS_GAUGE,
        &*TELEMETRY_VIEW_GAUGE,
    ] {
        gauge.reset();
    }

    let labels = [snapshot.device_id.as_str()];

    if let Some(stats) = snapshot.stats {
        TOTAL_ENTRIES_GAUGE
            .with_label_values(&labels)
            .set(gauge_value(stats.total_entries));
        DUPLICATES_GAUGE
            .with_label_values(&labels)
            .set(gauge_value(stats.duplicates_count));
        DISCARDED_GAUGE
            .with_label_values(&labels)
            .set(gauge_value(stats.discarded_count));
    }

    ACTIVE_ALERTS_GAUGE
        .with_label_values(&labels)
        .set(gauge_value(snapshot.alerts.len() as u64));
    TELEMETRY_VIEW_GAUGE
        .with_label_values(&labels)
        .set(gauge_value(snapshot.telemetry_view.len() as u64));
    LOADING_GAUGE.set(snapshot.loading as i64);
    ERROR_GAUGE.set(snapshot.error.is_some() as i64);
}

/// Read metrics from Prometheus exporter registry.
pub fn read() -> Result<String, Status> {
    let mut buffer = Vec::new();
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    encoder.encode(&metric_families, &mut buffer).map_err(|e| {
        log::error!("Error encoding metrics: {}", e);
        Status::InternalServerError
    })?;
    String::from_utf8(buffer).or(Err(Status::InternalServerError))
}
