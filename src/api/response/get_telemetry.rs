use super::RawInstant;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Data {
    pub timestamp: RawInstant,
    pub voltage: f64,
    pub current: f64,
    pub power: f64,
    #[serde(default)]
    pub is_duplicate: bool,
}

/* Full history, oldest first */
pub type GetTelemetry = Vec<Data>;
