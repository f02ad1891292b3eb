//! Reverse geocoding against a Nominatim-compatible endpoint.

use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{Error, Provider, Result};

/// Structured address returned by the geocoding provider.
///
/// Only the fields the lookup needs are typed; everything else the provider
/// sends is carried through untouched in `extra`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAddress {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub postcode: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResolvedAddress {
    /// Postal code, if the provider returned a non-blank one.
    pub fn postcode(&self) -> Option<&str> {
        non_blank(self.postcode.as_deref())
    }

    /// Best available locality name.
    ///
    /// Smaller settlements come back as `town`, `village` or `hamlet` rather
    /// than `city`.
    pub fn locality_name(&self) -> Option<&str> {
        non_blank(self.city.as_deref()).or_else(|| {
            ["town", "village", "hamlet"]
                .iter()
                .find_map(|key| non_blank(self.extra.get(*key).and_then(Value::as_str)))
        })
    }

    pub fn state(&self) -> Option<&str> {
        non_blank(self.state.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    #[serde(default)]
    address: Option<ResolvedAddress>,
    #[serde(default)]
    error: Option<String>,
}

/// Reverse-geocoding client.
#[derive(Debug, Clone)]
pub struct Geocoder {
    client: Client,
    endpoint: Url,
    user_agent: String,
}

impl Geocoder {
    pub fn new(config: &Config, client: Client) -> Self {
        Self {
            client,
            endpoint: config.geocode_url.clone(),
            user_agent: config.user_agent.clone(),
        }
    }

    /// Resolve coordinates into a structured address.
    ///
    /// A non-success status becomes [`Error::Upstream`] carrying the status
    /// and response text. A success payload without an `address` object
    /// (the provider's "Unable to geocode" answer) yields an empty address.
    pub async fn reverse(&self, latitude: f64, longitude: f64) -> Result<ResolvedAddress> {
        let url = self.reverse_url(latitude, longitude);
        debug!(url = %url, "calling reverse geocoder");

        let response = self
            .client
            .get(url)
            .header(USER_AGENT, self.user_agent.as_str())
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                provider: Provider::Geocoder,
                status: status.as_u16(),
                body,
            });
        }

        let payload: ReverseResponse = response.json().await?;
        match payload.address {
            Some(address) => Ok(address),
            None => {
                warn!(
                    latitude,
                    longitude,
                    provider_error = payload.error.as_deref().unwrap_or("<none>"),
                    "geocoder returned no address"
                );
                Ok(ResolvedAddress::default())
            }
        }
    }

    fn reverse_url(&self, latitude: f64, longitude: f64) -> Url {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("lat", &latitude.to_string())
            .append_pair("lon", &longitude.to_string())
            .append_pair("format", "json");
        url
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    const TEST_AGENT: &str = "GeocoderTest/1.0 (tests@example.com)";

    fn geocoder_for(server: &MockServer) -> Geocoder {
        let mut config = Config::new("test-key")
            .unwrap()
            .with_geocode_url(Url::parse(&format!("{}/reverse", server.uri())).unwrap());
        config.user_agent = TEST_AGENT.to_string();
        let client = config.http_client().unwrap();
        Geocoder::new(&config, client)
    }

    #[test]
    fn address_keeps_unknown_fields() {
        let address: ResolvedAddress = serde_json::from_value(json!({
            "postcode": "10001",
            "city": "New York",
            "state": "NY",
            "country_code": "us",
            "road": "West 34th Street"
        }))
        .unwrap();

        assert_eq!(address.postcode(), Some("10001"));
        assert_eq!(address.extra.get("country_code"), Some(&json!("us")));

        let round_trip = serde_json::to_value(&address).unwrap();
        assert_eq!(round_trip["road"], "West 34th Street");
        assert_eq!(round_trip["city"], "New York");
    }

    #[test]
    fn locality_falls_back_to_town_then_village() {
        let town: ResolvedAddress =
            serde_json::from_value(json!({ "town": "Hoboken", "village": "Ignored" })).unwrap();
        assert_eq!(town.locality_name(), Some("Hoboken"));

        let village: ResolvedAddress =
            serde_json::from_value(json!({ "city": " ", "village": "Cold Spring" })).unwrap();
        assert_eq!(village.locality_name(), Some("Cold Spring"));

        assert_eq!(ResolvedAddress::default().locality_name(), None);
    }

    #[test]
    fn blank_postcode_is_treated_as_missing() {
        let address: ResolvedAddress = serde_json::from_value(json!({ "postcode": "" })).unwrap();
        assert_eq!(address.postcode(), None);
    }

    #[tokio::test]
    async fn reverse_sends_coordinates_and_identity() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "40.7"))
            .and(query_param("lon", "-74"))
            .and(query_param("format", "json"))
            .and(header("user-agent", TEST_AGENT))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "display_name": "New York, NY",
                "address": { "postcode": "10001", "city": "New York", "state": "NY" }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let address = geocoder_for(&server).reverse(40.7, -74.0).await.unwrap();
        assert_eq!(address.postcode(), Some("10001"));
        assert_eq!(address.locality_name(), Some("New York"));
        assert_eq!(address.state(), Some("NY"));
    }

    #[tokio::test]
    async fn reverse_maps_failure_status_to_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
            .mount(&server)
            .await;

        let err = geocoder_for(&server).reverse(1.0, 2.0).await.unwrap_err();
        match err {
            Error::Upstream {
                provider,
                status,
                body,
            } => {
                assert_eq!(provider, Provider::Geocoder);
                assert_eq!(status, 503);
                assert_eq!(body, "try later");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reverse_without_address_yields_empty_address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "error": "Unable to geocode" })),
            )
            .mount(&server)
            .await;

        let address = geocoder_for(&server).reverse(0.0, 0.0).await.unwrap();
        assert_eq!(address, ResolvedAddress::default());
    }
}
