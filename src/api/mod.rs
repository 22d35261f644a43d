pub mod endpoint;
pub mod error;
pub mod response;

use crate::model;
use endpoint::Resource;
pub use error::Error;
use reqwest::{Response, Url};
use response::get_alerts::GetAlerts;
use response::get_stats::GetStats;
use response::get_telemetry::GetTelemetry;
use serde::de::DeserializeOwned;

use std::future::Future;
use std::time::Duration;

/// Build the client handle for the service at `api_url`. Without `timeout` the transport's own
/// behaviour applies.
pub fn api(api_url: String, timeout: Option<Duration>) -> Result<model::Api, Error> {
    let builder = reqwest::ClientBuilder::new();
    let builder = match timeout {
        Some(timeout) => builder.timeout(timeout),
        None => builder,
    };

    builder
        .build()
        .map_err(|e| Error::InternalError(e.to_string()))
        .map(|client| model::Api { api_url, client })
}

/// `{api_url}/{resource}/{device_id}`, with the device id percent-encoded as one path segment.
fn resource_url(api: &model::Api, resource: Resource, device_id: &str) -> Result<Url, Error> {
    let mut url = Url::parse(&api.api_url)
        .map_err(|e| Error::InternalError(format!("invalid api_url {:?}: {}", api.api_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| Error::InternalError(format!("api_url cannot be a base: {}", api.api_url)))?
        .pop_if_empty()
        .push(resource.endpoint())
        .push(device_id);
    url.set_query(resource.query());

    Ok(url)
}

/// Map transport-level failure to Error
fn map_api_err(resource: Resource, error: reqwest::Error) -> Error {
    if error.is_timeout() {
        Error::RequestError(resource, String::from("request timed out"))
    } else {
        Error::RequestError(resource, error.to_string())
    }
}

/// Any non-2xx status fails the whole call; the body is not looked at.
fn check_status(resource: Resource, response: Response) -> Result<Response, Error> {
    let status = response.status();

    if status.is_success() {
        return Ok(response);
    }

    Err(Error::RequestError(
        resource,
        match status {
            http::StatusCode::NOT_FOUND => format!("not found (server responded {})", status),
            _ => format!("server responded {}", status),
        },
    ))
}

async fn get<T: DeserializeOwned>(
    api: &model::Api,
    resource: Resource,
    device_id: &str,
) -> Result<T, Error> {
    let url = resource_url(api, resource, device_id)?;
    log::trace!("GET {}", url);

    let response_text = api
        .client
        .get(url)
        .send()
        .await
        .map_err(|e| map_api_err(resource, e))
        .and_then(|r| check_status(resource, r))?
        .text()
        .await
        .map_err(|e| Error::RequestError(resource, format!("error reading response: {}", e)))?;

    log::trace!(
        "resource: {}, device_id: {}, response_text: {}",
        resource,
        device_id,
        response_text
    );

    serde_json::from_str::<T>(&response_text).map_err(|e| Error::ParseError(resource, e.to_string()))
}

/// Read the full telemetry history of `device_id`, oldest first.
pub async fn telemetry(
    api: &model::Api,
    device_id: &str,
) -> Result<Vec<model::TelemetryRecord>, Error> {
    get::<GetTelemetry>(api, Resource::Telemetry, device_id)
        .await
        .map(|response| {
            response
                .into_iter()
                .map(|resp| model::TelemetryRecord {
                    timestamp: resp.timestamp.into_instant(),
                    voltage: resp.voltage,
                    current: resp.current,
                    power: resp.power,
                    is_duplicate: resp.is_duplicate,
                })
                .collect()
        })
}

pub async fn stats(api: &model::Api, device_id: &str) -> Result<model::StatsSummary, Error> {
    get::<GetStats>(api, Resource::Stats, device_id)
        .await
        .map(|resp| model::StatsSummary {
            total_entries: resp.total_entries,
            duplicates_count: resp.duplicates_count,
            discarded_count: resp.discarded_count,
        })
}

/// Read active alerts of `device_id`. Filtering is done by the service.
pub async fn alerts(api: &model::Api, device_id: &str) -> Result<Vec<model::Alert>, Error> {
    get::<GetAlerts>(api, Resource::Alerts, device_id)
        .await
        .map(|response| {
            response
                .into_iter()
                .map(|resp| model::Alert {
                    id: resp.id,
                    alert_type: resp.alert_type,
                    details: resp.details.unwrap_or_default(),
                    triggered_at: resp.triggered_at.into_instant(),
                })
                .collect()
        })
}

/// Where the dashboard reads its three resources from.
pub trait DataSource: Send + Sync + 'static {
    fn telemetry(
        &self,
        device_id: &str,
    ) -> impl Future<Output = Result<Vec<model::TelemetryRecord>, Error>> + Send;

    fn stats(&self, device_id: &str) -> impl Future<Output = Result<model::StatsSummary, Error>> + Send;

    fn alerts(&self, device_id: &str) -> impl Future<Output = Result<Vec<model::Alert>, Error>> + Send;
}

impl DataSource for model::Api {
    async fn telemetry(&self, device_id: &str) -> Result<Vec<model::TelemetryRecord>, Error> {
        telemetry(self, device_id).await
    }

    async fn stats(&self, device_id: &str) -> Result<model::StatsSummary, Error> {
        stats(self, device_id).await
    }

    async fn alerts(&self, device_id: &str) -> Result<Vec<model::Alert>, Error> {
        alerts(self, device_id).await
    }
}
