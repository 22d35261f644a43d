use std::fmt;

pub type Endpoint = str;

pub const TELEMETRY: &Endpoint = "telemetry";
pub const STATS: &Endpoint = "stats";
pub const ALERTS: &Endpoint = "alerts";

/// The three read-only resources the remote service exposes per device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Telemetry,
    Stats,
    Alerts,
}

impl Resource {
    pub fn endpoint(self) -> &'static Endpoint {
        match self {
            Resource::Telemetry => TELEMETRY,
            Resource::Stats => STATS,
            Resource::Alerts => ALERTS,
        }
    }

    /// Query string sent along with the request, if any.
    pub fn query(self) -> Option<&'static str> {
        match self {
            Resource::Alerts => Some("active_only=true"),
            _ => None,
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.endpoint())
    }
}
