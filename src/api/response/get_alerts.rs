use super::RawInstant;
use crate::model::AlertId;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct Data {
    pub id: AlertId,
    pub alert_type: String,
    #[serde(default)]
    pub details: Option<String>,
    pub triggered_at: RawInstant,
}

pub type GetAlerts = Vec<Data>;
