pub mod api;
pub mod dashboard;
pub mod model;
pub mod store;
pub mod view;

pub use api::{alerts, api, stats, telemetry, DataSource, Error};
pub use dashboard::{Dashboard, DEFAULT_DEVICE_ID};
pub use store::Snapshot;
