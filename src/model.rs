use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Volts = f64;
pub type Amperes = f64;
pub type Watts = f64;

#[derive(Debug, Clone)]
pub struct Api {
    pub api_url: String,
    pub client: reqwest::Client,
}

/// A point in time as sent by the service. Text that cannot be read as a date is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(untagged)]
pub enum Instant {
    Parsed(DateTime<Utc>),
    Raw(String),
}

impl Instant {
    pub fn parsed(&self) -> Option<&DateTime<Utc>> {
        match self {
            Instant::Parsed(dt) => Some(dt),
            Instant::Raw(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for Instant {
    fn from(dt: DateTime<Utc>) -> Self {
        Instant::Parsed(dt)
    }
}

/// One sampled reading as reported by the remote service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryRecord {
    pub timestamp: Instant,
    pub voltage: Volts,
    pub current: Amperes,
    pub power: Watts,
    pub is_duplicate: bool,
}

/// Server-computed counters; never recomputed on this side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSummary {
    pub total_entries: u64,
    pub duplicates_count: u64,
    pub discarded_count: u64,
}

/// Alert identifiers are kept exactly as sent, numeric or textual.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AlertId {
    Number(i64),
    Text(String),
}

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlertId::Number(n) => write!(f, "{}", n),
            AlertId::Text(s) => f.write_str(s),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alert {
    pub id: AlertId,
    pub alert_type: String,
    pub details: String,
    pub triggered_at: Instant,
}
