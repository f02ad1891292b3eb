use std::fmt;

use thiserror::Error;

/// Convenient result alias for the Nearby Eats library.
pub type Result<T> = std::result::Result<T, Error>;

/// External data providers the library talks to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    /// Reverse-geocoding provider (Nominatim).
    Geocoder,
    /// Restaurant search provider (SerpAPI).
    Search,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Provider::Geocoder => write!(f, "reverse geocoding"),
            Provider::Search => write!(f, "restaurant search"),
        }
    }
}

/// Top-level library error type.
#[derive(Debug, Error)]
pub enum Error {
    /// An external provider answered with a non-success status.
    #[error("{provider} failed: {status} {body}")]
    Upstream {
        provider: Provider,
        status: u16,
        body: String,
    },

    /// The inbound request body was missing or not valid JSON.
    #[error("malformed request body: {0}")]
    MalformedRequest(String),

    /// Coordinates were supplied but fall outside the valid range.
    #[error("invalid coordinates: latitude {latitude}, longitude {longitude}")]
    InvalidCoordinates { latitude: f64, longitude: f64 },

    /// The search payload did not contain a list of results.
    #[error("unexpected search payload shape: {0}")]
    UnexpectedShape(String),

    /// Required configuration was missing or unparsable.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// Wrapper for HTTP client errors.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Description that is safe to hand back to a caller.
    ///
    /// Identical to the `Display` output except for [`Error::Upstream`], whose
    /// response body stays in the server logs.
    pub fn public_message(&self) -> String {
        match self {
            Error::Upstream {
                provider, status, ..
            } => format!("{} failed with status {}", provider, status),
            Error::Http(err) => match err.status() {
                Some(status) => format!("upstream request failed with status {}", status),
                None => "upstream request failed".to_string(),
            },
            other => other.to_string(),
        }
    }
}
