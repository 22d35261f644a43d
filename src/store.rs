use crate::api::Error;
use crate::model::{Alert, StatsSummary, TelemetryRecord};
use crate::view;
use serde::Serialize;
use tokio::sync::watch;

/// Everything the presentation layer renders at a given instant.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub device_id: String,
    /// Number of the refresh cycle this snapshot belongs to; 0 before the first one.
    pub cycle: u64,
    pub telemetry_view: Vec<TelemetryRecord>,
    pub stats: Option<StatsSummary>,
    pub alerts: Vec<Alert>,
    pub error: Option<String>,
    pub loading: bool,
}

impl Snapshot {
    fn idle(device_id: String) -> Self {
        Snapshot {
            device_id,
            cycle: 0,
            telemetry_view: Vec::new(),
            stats: None,
            alerts: Vec::new(),
            error: None,
            loading: false,
        }
    }
}

/// Outcome of one fetch adapter.
#[derive(Debug)]
pub enum Settled {
    Telemetry(Result<Vec<TelemetryRecord>, Error>),
    Stats(Result<StatsSummary, Error>),
    Alerts(Result<Vec<Alert>, Error>),
}

impl Settled {
    fn name(&self) -> &'static str {
        match self {
            Settled::Telemetry(_) => "telemetry",
            Settled::Stats(_) => "stats",
            Settled::Alerts(_) => "alerts",
        }
    }
}

/// Holds the current snapshot. Every transition is checked against the cycle number under the
/// channel lock, so events from a superseded cycle cannot leak into a newer one.
pub struct Store {
    tx: watch::Sender<Snapshot>,
}

impl Store {
    pub fn new(device_id: impl Into<String>) -> Self {
        let (tx, _rx) = watch::channel(Snapshot::idle(device_id.into()));
        Store { tx }
    }

    /// Reset the snapshot for `device_id` and return the number of the new cycle.
    pub fn begin(&self, device_id: String) -> u64 {
        let mut cycle = 0;
        self.tx.send_modify(|snapshot| {
            cycle = snapshot.cycle + 1;
            *snapshot = Snapshot {
                cycle,
                loading: true,
                ..Snapshot::idle(device_id)
            };
        });
        cycle
    }

    /// Apply one adapter outcome. Returns `false` if `cycle` is no longer current.
    pub fn settle(&self, cycle: u64, settled: Settled) -> bool {
        let name = settled.name();
        let applied = self.tx.send_if_modified(|snapshot| {
            if snapshot.cycle != cycle {
                return false;
            }

            let error = match settled {
                Settled::Telemetry(Ok(history)) => {
                    snapshot.telemetry_view = view::telemetry_view(&history);
                    None
                }
                Settled::Stats(Ok(stats)) => {
                    snapshot.stats = Some(stats);
                    None
                }
                Settled::Alerts(Ok(alerts)) => {
                    snapshot.alerts = alerts;
                    None
                }
                Settled::Telemetry(Err(e)) | Settled::Stats(Err(e)) | Settled::Alerts(Err(e)) => {
                    Some(e)
                }
            };

            /* last failure wins, successes never clear it */
            if let Some(e) = error {
                log::warn!("{} for device {}", e, snapshot.device_id);
                snapshot.error = Some(e.to_string());
            }
            true
        });

        if applied {
            log::debug!("cycle {}: {} settled", cycle, name);
        } else {
            log::warn!("cycle {}: discarding stale {} result", cycle, name);
        }
        applied
    }

    /// Clear `loading` once all adapters of `cycle` have settled.
    pub fn finish(&self, cycle: u64) -> bool {
        self.tx.send_if_modified(|snapshot| {
            if snapshot.cycle != cycle || !snapshot.loading {
                return false;
            }
            snapshot.loading = false;
            true
        })
    }

    pub fn current(&self) -> Snapshot {
        self.tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod test {
    use super::{Settled, Store};
    use crate::api::endpoint::Resource;
    use crate::api::Error;
    use crate::model::{StatsSummary, TelemetryRecord};
    use chrono::{TimeZone, Utc};

    fn history(len: usize) -> Vec<TelemetryRecord> {
        (0..len)
            .map(|i| TelemetryRecord {
                timestamp: Utc.timestamp_opt(1_714_521_600 + 60 * i as i64, 0).unwrap().into(),
                voltage: 230.0,
                current: 4.0,
                power: 920.0,
                is_duplicate: false,
            })
            .collect()
    }

    const STATS: StatsSummary = StatsSummary {
        total_entries: 100,
        duplicates_count: 5,
        discarded_count: 2,
    };

    #[test]
    fn starts_idle() {
        let store = Store::new("SOL-XL1001");
        let snapshot = store.current();

        assert_eq!("SOL-XL1001", snapshot.device_id);
        assert_eq!(0, snapshot.cycle);
        assert!(!snapshot.loading);
        assert!(snapshot.error.is_none());
    }

    #[test]
    fn begin_resets_everything() {
        let store = Store::new("A");
        let first = store.begin(String::from("A"));
        store.settle(first, Settled::Stats(Ok(STATS)));
        store.settle(
            first,
            Settled::Alerts(Err(Error::RequestError(Resource::Alerts, "boom".into()))),
        );
        store.finish(first);

        let second = store.begin(String::from("B"));
        let snapshot = store.current();

        assert_eq!(first + 1, second);
        assert_eq!("B", snapshot.device_id);
        assert!(snapshot.loading);
        assert!(snapshot.error.is_none());
        assert!(snapshot.stats.is_none());
    }

    #[test]
    fn telemetry_goes_through_the_view() {
        let store = Store::new("A");
        let cycle = store.begin(String::from("A"));

        assert!(store.settle(cycle, Settled::Telemetry(Ok(history(30)))));

        let view = store.current().telemetry_view;
        assert_eq!(25, view.len());
        assert!(view[0].timestamp > view[24].timestamp);
    }

    #[test]
    fn failure_keeps_sibling_data() {
        let store = Store::new("A");
        let cycle = store.begin(String::from("A"));

        store.settle(cycle, Settled::Stats(Ok(STATS)));
        store.settle(
            cycle,
            Settled::Telemetry(Err(Error::ParseError(Resource::Telemetry, "eof".into()))),
        );
        store.settle(cycle, Settled::Alerts(Ok(Vec::new())));

        let snapshot = store.current();
        assert_eq!(Some(STATS), snapshot.stats);
        assert_eq!(
            Some(String::from("Failed to fetch telemetry: invalid response (eof)")),
            snapshot.error
        );
    }

    #[test]
    fn last_failure_wins() {
        let store = Store::new("A");
        let cycle = store.begin(String::from("A"));

        store.settle(
            cycle,
            Settled::Stats(Err(Error::RequestError(Resource::Stats, "first".into()))),
        );
        store.settle(
            cycle,
            Settled::Alerts(Err(Error::RequestError(Resource::Alerts, "second".into()))),
        );

        assert_eq!(
            Some(String::from("Failed to fetch alerts: second")),
            store.current().error
        );
    }

    #[test]
    fn stale_cycle_is_discarded() {
        let store = Store::new("A");
        let old = store.begin(String::from("A"));
        let new = store.begin(String::from("B"));

        assert!(!store.settle(old, Settled::Stats(Ok(STATS))));
        assert!(!store.finish(old));

        let snapshot = store.current();
        assert!(snapshot.stats.is_none());
        assert!(snapshot.loading);

        assert!(store.finish(new));
        assert!(!store.current().loading);
    }
}
