//! Restaurant search against a SerpAPI-compatible endpoint.

use std::fmt;

use reqwest::header::ACCEPT;
use reqwest::{Client, Url};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Provider, Result};
use crate::geocode::ResolvedAddress;
use crate::results::{normalize, RestaurantRecord};

/// How the search locality was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchMode {
    /// The caller supplied a postal code directly.
    ZipCode { zipcode: String },
    /// The locality was resolved from coordinates.
    LatLong {
        postcode: Option<String>,
        city: Option<String>,
        state: Option<String>,
    },
}

impl SearchMode {
    pub fn zip_code(zipcode: impl Into<String>) -> Self {
        SearchMode::ZipCode {
            zipcode: zipcode.into().trim().to_string(),
        }
    }

    pub fn lat_long(address: &ResolvedAddress) -> Self {
        SearchMode::LatLong {
            postcode: address.postcode().map(String::from),
            city: address.locality_name().map(String::from),
            state: address.state().map(String::from),
        }
    }

    /// Locality the query is anchored to.
    ///
    /// Both modes anchor on a postal code. A coordinate lookup whose address
    /// has no postal code has no locality, so the search is skipped.
    pub fn locality(&self) -> Option<String> {
        match self {
            SearchMode::ZipCode { zipcode } => {
                Some(zipcode.clone()).filter(|zip| !zip.is_empty())
            }
            SearchMode::LatLong { postcode, .. } => postcode.clone(),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::ZipCode { .. } => write!(f, "zipCode"),
            SearchMode::LatLong { .. } => write!(f, "latLong"),
        }
    }
}

/// Build the free-text query sent to the search provider.
///
/// Radii that are missing, zero, negative or non-finite fall back to a plain
/// "near" query.
pub fn build_query(name: &str, locality: &str, radius_miles: Option<f64>) -> String {
    let name = name.trim();
    match radius_miles.filter(|r| r.is_finite() && *r > 0.0) {
        Some(radius) => format!("{} within {} miles of {}", name, radius, locality),
        None => format!("{} near {}", name, locality),
    }
}

/// Restaurant search client.
#[derive(Clone)]
pub struct RestaurantFinder {
    client: Client,
    endpoint: Url,
    api_key: String,
}

impl fmt::Debug for RestaurantFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RestaurantFinder")
            .field("endpoint", &self.endpoint.as_str())
            .finish_non_exhaustive()
    }
}

impl RestaurantFinder {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            endpoint: config.search_url.clone(),
            api_key: config.api_key.clone(),
        }
    }

    /// Search for restaurants named `name` around the mode's locality.
    ///
    /// Returns an empty list without calling the provider when the mode has
    /// no usable locality. Payloads without a result list are logged and
    /// also produce an empty list.
    pub async fn find(
        &self,
        name: &str,
        mode: &SearchMode,
        radius_miles: Option<f64>,
    ) -> Result<Vec<RestaurantRecord>> {
        let Some(locality) = mode.locality() else {
            info!(
                mode = %mode,
                details = ?mode,
                "no postal code available, skipping restaurant search"
            );
            return Ok(Vec::new());
        };

        let query = build_query(name, &locality, radius_miles);
        let url = self.search_url(&query);
        info!(mode = %mode, url = %redact_api_key(&url), "calling restaurant search");

        let response = self
            .client
            .get(url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                provider: Provider::Search,
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value = response.json().await?;
        debug!(payload = %payload, "raw search payload");

        match normalize(&payload) {
            Ok(records) => {
                info!(count = records.len(), "restaurant search complete");
                Ok(records)
            }
            Err(Error::UnexpectedShape(detail)) => {
                warn!(detail = %detail, "unexpected search payload shape, returning no results");
                Ok(Vec::new())
            }
            Err(other) => Err(other),
        }
    }

    fn search_url(&self, query: &str) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("api_key", &self.api_key)
            .append_pair("hl", "en")
            .append_pair("gl", "us");
        url
    }
}

/// Copy of `url` with the `api_key` query value masked, for logging.
pub fn redact_api_key(url: &Url) -> Url {
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let value = if k == "api_key" {
                "REDACTED".to_string()
            } else {
                v.into_owned()
            };
            (k.into_owned(), value)
        })
        .collect();

    let mut redacted = url.clone();
    redacted.query_pairs_mut().clear().extend_pairs(pairs);
    redacted
}
