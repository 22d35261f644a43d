use super::endpoint::Resource;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Transport failure or non-2xx status.
    RequestError(Resource, String),
    /// Body could not be decoded into the expected shape.
    ParseError(Resource, String),
    InternalError(String),
}

impl Error {
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Error::RequestError(r, _) | Error::ParseError(r, _) => Some(*r),
            Error::InternalError(_) => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::RequestError(resource, s) => write!(f, "Failed to fetch {}: {}", resource, s),
            Error::ParseError(resource, s) => {
                write!(f, "Failed to fetch {}: invalid response ({})", resource, s)
            }
            Error::InternalError(s) => write!(f, "Internal error: {}", s),
        }
    }
}

impl std::error::Error for Error {}
