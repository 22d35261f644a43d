use crate::api::DataSource;
use crate::store::{Settled, Snapshot, Store};

use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tokio::task::JoinHandle;

/// Device shown when the operator has not picked one yet.
pub const DEFAULT_DEVICE_ID: &str = "SOL-XL1001";

/// Owns the snapshot and runs one refresh cycle per device selection.
pub struct Dashboard<S: DataSource> {
    source: Arc<S>,
    store: Arc<Store>,
    in_flight: Mutex<Option<JoinHandle<()>>>,
}

impl<S: DataSource> Dashboard<S> {
    /// Idle dashboard; nothing is fetched until `refresh()` or `set_device_id()`.
    pub fn new(source: S, device_id: impl Into<String>) -> Self {
        Dashboard {
            source: Arc::new(source),
            store: Arc::new(Store::new(device_id)),
            in_flight: Mutex::new(None),
        }
    }

    /// Create the dashboard and start the initial cycle. Must be called within a tokio runtime.
    pub fn start(source: S, device_id: impl Into<String>) -> Self {
        let dashboard = Dashboard::new(source, device_id);
        dashboard.refresh();
        dashboard
    }

    /// Select another device (or the same one again) and start a new cycle for it.
    pub fn set_device_id(&self, device_id: impl Into<String>) -> u64 {
        self.begin(device_id.into())
    }

    /// Re-run the cycle for the current device.
    pub fn refresh(&self) -> u64 {
        self.begin(self.store.current().device_id)
    }

    pub fn current_snapshot(&self) -> Snapshot {
        self.store.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<Snapshot> {
        self.store.subscribe()
    }

    fn begin(&self, device_id: String) -> u64 {
        let mut in_flight = self
            .in_flight
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        if let Some(previous) = in_flight.take() {
            previous.abort();
        }

        let cycle = self.store.begin(device_id.clone());
        log::info!("cycle {}: refreshing device {:?}", cycle, device_id);

        *in_flight = Some(tokio::spawn(run_cycle(
            self.source.clone(),
            self.store.clone(),
            cycle,
            device_id,
        )));

        cycle
    }
}

impl<S: DataSource> Drop for Dashboard<S> {
    fn drop(&mut self) {
        if let Some(handle) = self
            .in_flight
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

/// Fetch all three resources concurrently, applying each as soon as it settles, and clear
/// `loading` once every one of them has.
async fn run_cycle<S: DataSource>(source: Arc<S>, store: Arc<Store>, cycle: u64, device_id: String) {
    let source = source.as_ref();
    let store = store.as_ref();
    let device_id = device_id.as_str();

    tokio::join!(
        async { store.settle(cycle, Settled::Telemetry(source.telemetry(device_id).await)) },
        async { store.settle(cycle, Settled::Stats(source.stats(device_id).await)) },
        async { store.settle(cycle, Settled::Alerts(source.alerts(device_id).await)) },
    );

    if store.finish(cycle) {
        let snapshot = store.current();
        log::info!(
            "cycle {}: done for device {:?} ({} records, {} alerts, error: {:?})",
            cycle,
            device_id,
            snapshot.telemetry_view.len(),
            snapshot.alerts.len(),
            snapshot.error
        );
    }
}
