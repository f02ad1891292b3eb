//! Process-wide configuration resolved once at cold start.
//!
//! The search-provider API key is the only required value. Endpoint URLs,
//! the geocoder identity header and the HTTP timeout can be overridden
//! through environment variables, which is how the integration tests point
//! the clients at a local mock server.

use std::env;
use std::fmt;
use std::time::Duration;

use reqwest::{Client, Url};

use crate::error::{Error, Result};

/// Environment variable holding the search-provider API key.
pub const API_KEY_ENV: &str = "SERP_API_KEY";
/// Overrides the search endpoint.
pub const SEARCH_URL_ENV: &str = "NEARBY_EATS_SEARCH_URL";
/// Overrides the reverse-geocoding endpoint.
pub const GEOCODE_URL_ENV: &str = "NEARBY_EATS_GEOCODE_URL";
/// Overrides the identifying `User-Agent` sent to the geocoder.
pub const USER_AGENT_ENV: &str = "NEARBY_EATS_USER_AGENT";
/// Overrides the per-request HTTP timeout, in whole seconds.
pub const HTTP_TIMEOUT_ENV: &str = "NEARBY_EATS_HTTP_TIMEOUT_SECS";

const DEFAULT_SEARCH_URL: &str = "https://serpapi.com/search.json";
const DEFAULT_GEOCODE_URL: &str = "https://nominatim.openstreetmap.org/reverse";
const DEFAULT_USER_AGENT: &str = "NearbyEats/1.0 (+https://github.com/nearby-eats/nearby-eats)";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;

/// Runtime configuration shared by the geocoder and the restaurant finder.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub search_url: Url,
    pub geocode_url: Url,
    pub user_agent: String,
    pub http_timeout: Duration,
}

impl Config {
    /// Create a configuration with default endpoints for the given API key.
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Ok(Self {
            api_key: api_key.into(),
            search_url: parse_url(SEARCH_URL_ENV, DEFAULT_SEARCH_URL)?,
            geocode_url: parse_url(GEOCODE_URL_ENV, DEFAULT_GEOCODE_URL)?,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        })
    }

    /// Resolve configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Resolve configuration from an arbitrary key lookup.
    ///
    /// Tests pass a closure over a map so they never touch the real process
    /// environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(API_KEY_ENV)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| Error::Config(format!("{} is not set", API_KEY_ENV)))?;

        let mut config = Self::new(api_key)?;

        if let Some(raw) = lookup(SEARCH_URL_ENV) {
            config.search_url = parse_url(SEARCH_URL_ENV, &raw)?;
        }
        if let Some(raw) = lookup(GEOCODE_URL_ENV) {
            config.geocode_url = parse_url(GEOCODE_URL_ENV, &raw)?;
        }
        if let Some(agent) = lookup(USER_AGENT_ENV).filter(|value| !value.trim().is_empty()) {
            config.user_agent = agent;
        }
        if let Some(raw) = lookup(HTTP_TIMEOUT_ENV) {
            let secs: u64 = raw.trim().parse().map_err(|_| {
                Error::Config(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    HTTP_TIMEOUT_ENV, raw
                ))
            })?;
            config.http_timeout = Duration::from_secs(secs);
        }

        Ok(config)
    }

    /// Point the search client at a different endpoint.
    pub fn with_search_url(mut self, url: Url) -> Self {
        self.search_url = url;
        self
    }

    /// Point the geocoder at a different endpoint.
    pub fn with_geocode_url(mut self, url: Url) -> Self {
        self.geocode_url = url;
        self
    }

    /// Build the HTTP client shared by both outbound integrations.
    pub fn http_client(&self) -> Result<Client> {
        Ok(Client::builder().timeout(self.http_timeout).build()?)
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("search_url", &self.search_url.as_str())
            .field("geocode_url", &self.geocode_url.as_str())
            .field("user_agent", &self.user_agent)
            .field("http_timeout", &self.http_timeout)
            .finish()
    }
}

fn parse_url(name: &str, raw: &str) -> Result<Url> {
    Url::parse(raw.trim())
        .map_err(|e| Error::Config(format!("{} is not a valid URL ('{}'): {}", name, raw, e)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn requires_api_key() {
        let err = Config::from_lookup(lookup_from(&[])).unwrap_err();
        assert!(err.to_string().contains(API_KEY_ENV));
    }

    #[test]
    fn blank_api_key_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[(API_KEY_ENV, "   ")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn defaults_apply_when_only_key_is_set() {
        let config = Config::from_lookup(lookup_from(&[(API_KEY_ENV, "secret")])).unwrap();
        assert_eq!(config.api_key, "secret");
        assert_eq!(config.search_url.as_str(), DEFAULT_SEARCH_URL);
        assert_eq!(config.geocode_url.as_str(), DEFAULT_GEOCODE_URL);
        assert_eq!(config.http_timeout, Duration::from_secs(10));
    }

    #[test]
    fn overrides_are_honoured() {
        let config = Config::from_lookup(lookup_from(&[
            (API_KEY_ENV, "secret"),
            (SEARCH_URL_ENV, "http://127.0.0.1:9000/search.json"),
            (GEOCODE_URL_ENV, "http://127.0.0.1:9001/reverse"),
            (USER_AGENT_ENV, "TestAgent/0.1"),
            (HTTP_TIMEOUT_ENV, "3"),
        ]))
        .unwrap();

        assert_eq!(
            config.search_url.as_str(),
            "http://127.0.0.1:9000/search.json"
        );
        assert_eq!(config.geocode_url.as_str(), "http://127.0.0.1:9001/reverse");
        assert_eq!(config.user_agent, "TestAgent/0.1");
        assert_eq!(config.http_timeout, Duration::from_secs(3));
    }

    #[test]
    fn invalid_timeout_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            (API_KEY_ENV, "secret"),
            (HTTP_TIMEOUT_ENV, "soon"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(HTTP_TIMEOUT_ENV));
    }

    #[test]
    fn invalid_url_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            (API_KEY_ENV, "secret"),
            (SEARCH_URL_ENV, "not a url"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains(SEARCH_URL_ENV));
    }

    #[test]
    fn debug_output_redacts_api_key() {
        let config = Config::new("super-secret").unwrap();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("<redacted>"));
    }
}
