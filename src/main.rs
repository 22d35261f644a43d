#[macro_use]
extern crate lazy_static;
#[macro_use]
extern crate prometheus;
#[macro_use]
extern crate rocket;

use audit_dashboard::model::Api;
use audit_dashboard::{Dashboard, Snapshot, DEFAULT_DEVICE_ID};
use config::Config;
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::response::Redirect;
use rocket::serde::json::Json;
use rocket::State;
use std::time::Duration;

mod metrics;
mod page;

const API_URL: &str = "http://localhost:8000";

#[derive(Clone, serde::Deserialize)]
pub struct DashboardConfig {
    api_url: String,
    device_id: String,
    /// Transport timeout in seconds; unset leaves the client default.
    timeout: Option<u64>,
}

type AppDashboard = Dashboard<Api>;

pub fn read_settings() -> Result<DashboardConfig, config::ConfigError> {
    let mut settings = Config::default();
    settings
        .merge(config::Environment::with_prefix("AUDIT"))?
        .set_default("api_url", API_URL)?
        .set_default("device_id", DEFAULT_DEVICE_ID)?;

    settings.try_into()
}

#[get("/")]
fn index(dashboard: &State<AppDashboard>) -> RawHtml<String> {
    RawHtml(page::render(&dashboard.current_snapshot()))
}

#[get("/select?<device_id>")]
fn select(dashboard: &State<AppDashboard>, device_id: String) -> Redirect {
    dashboard.set_device_id(device_id);
    Redirect::to(uri!(index))
}

#[get("/device/<device_id>")]
fn device(dashboard: &State<AppDashboard>, device_id: String) -> Redirect {
    dashboard.set_device_id(device_id);
    Redirect::to(uri!(index))
}

#[post("/refresh")]
fn refresh(dashboard: &State<AppDashboard>) -> Redirect {
    dashboard.refresh();
    Redirect::to(uri!(index))
}

#[get("/snapshot")]
fn snapshot(dashboard: &State<AppDashboard>) -> Json<Snapshot> {
    Json(dashboard.current_snapshot())
}

#[get("/metrics")]
fn metrics_route(dashboard: &State<AppDashboard>) -> Result<String, Status> {
    metrics::collect(&dashboard.current_snapshot());
    metrics::read()
}

#[rocket::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let settings = read_settings()?;
    log::info!(
        "Reading from {} (initial device {:?})",
        settings.api_url,
        settings.device_id
    );

    let api = audit_dashboard::api(settings.api_url, settings.timeout.map(Duration::from_secs))?;
    let dashboard = Dashboard::start(api, settings.device_id);

    let _rocket = rocket::build()
        .manage(dashboard)
        .mount(
            "/",
            routes![index, select, device, refresh, snapshot, metrics_route],
        )
        .launch()
        .await?;

    Ok(())
}
