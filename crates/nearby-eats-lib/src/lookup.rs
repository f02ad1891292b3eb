//! Lookup orchestration: coordinates or postal code in, restaurants out.
//!
//! Branching rules:
//!
//! - Coordinates present: reverse geocode, then search around the resolved
//!   postal code.
//! - Otherwise a postal code present: search around it directly.
//! - Neither: no outbound calls; the restaurant list stays empty.
//!
//! Calls are awaited one after another; nothing runs concurrently.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};
use tracing::info;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::geocode::{Geocoder, ResolvedAddress};
use crate::results::RestaurantRecord;
use crate::search::{RestaurantFinder, SearchMode};

/// Location and restaurant name sent by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationInput {
    #[serde(default)]
    pub latitude: Option<Number>,

    #[serde(default)]
    pub longitude: Option<Number>,

    /// Search radius hint in miles.
    #[serde(default)]
    pub accuracy: Option<Number>,

    #[serde(default, deserialize_with = "zipcode_from_string_or_number")]
    pub zipcode: Option<String>,

    pub restaurant_name: String,
}

impl LocationInput {
    /// Parse a raw request body.
    pub fn from_json(body: &str) -> Result<Self> {
        serde_json::from_str(body).map_err(|e| Error::MalformedRequest(e.to_string()))
    }

    /// Both coordinates, when supplied together.
    pub fn coordinates(&self) -> Option<(f64, f64)> {
        let latitude = self.latitude.as_ref()?.as_f64()?;
        let longitude = self.longitude.as_ref()?.as_f64()?;
        Some((latitude, longitude))
    }

    /// Search radius in miles, when supplied.
    pub fn radius_miles(&self) -> Option<f64> {
        self.accuracy.as_ref().and_then(Number::as_f64)
    }

    /// Postal code, when supplied and not blank.
    pub fn zipcode(&self) -> Option<&str> {
        self.zipcode
            .as_deref()
            .map(str::trim)
            .filter(|zip| !zip.is_empty())
    }

    /// Reject coordinates outside the valid latitude/longitude range.
    pub fn validate(&self) -> Result<()> {
        if let Some((latitude, longitude)) = self.coordinates() {
            if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
                return Err(Error::InvalidCoordinates {
                    latitude,
                    longitude,
                });
            }
        }
        Ok(())
    }
}

// Clients occasionally send the postal code as a bare JSON number.
fn zipcode_from_string_or_number<'de, D>(
    deserializer: D,
) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!(
            "zipcode must be a string or number, got {}",
            other
        ))),
    }
}

/// Coordinates echoed back to the caller exactly as received, so `2` stays
/// `2` rather than becoming `2.0`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Coords {
    pub latitude: Option<Number>,
    pub longitude: Option<Number>,
    pub accuracy: Option<Number>,
}

/// Address derived from a raw postal code.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComputedAddress {
    pub postcode: String,
    pub city: String,
    pub state: String,
}

/// Address section of the response; the variant decides the JSON key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum AddressPayload {
    #[serde(rename = "address")]
    Resolved(ResolvedAddress),
    #[serde(rename = "computedAddressForUser")]
    Computed(ComputedAddress),
}

/// Successful lookup result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LookupResponse {
    pub coords: Coords,

    #[serde(flatten)]
    pub address: Option<AddressPayload>,

    pub restaurants: Vec<RestaurantRecord>,
}

/// Geocoder and restaurant finder wired together.
#[derive(Debug, Clone)]
pub struct RestaurantLookup {
    geocoder: Geocoder,
    finder: RestaurantFinder,
}

impl RestaurantLookup {
    /// Build both clients from configuration, sharing one HTTP client.
    pub fn new(config: &Config) -> Result<Self> {
        let client = config.http_client()?;
        Ok(Self {
            geocoder: Geocoder::new(config, client.clone()),
            finder: RestaurantFinder::new(config, client),
        })
    }

    /// Run the lookup for one request.
    pub async fn lookup(&self, input: &LocationInput) -> Result<LookupResponse> {
        input.validate()?;

        info!(
            latitude = ?input.latitude,
            longitude = ?input.longitude,
            accuracy = ?input.accuracy,
            zipcode = ?input.zipcode(),
            restaurant_name = %input.restaurant_name,
            "received location"
        );

        let coords = Coords {
            latitude: input.latitude.clone(),
            longitude: input.longitude.clone(),
            accuracy: input.accuracy.clone(),
        };

        let (address, restaurants) = if let Some((latitude, longitude)) = input.coordinates() {
            let resolved = self.geocoder.reverse(latitude, longitude).await?;
            info!(
                postcode = ?resolved.postcode(),
                city = ?resolved.locality_name(),
                state = ?resolved.state(),
                "resolved address"
            );

            let mode = SearchMode::lat_long(&resolved);
            let restaurants = self
                .finder
                .find(&input.restaurant_name, &mode, input.radius_miles())
                .await?;
            (Some(AddressPayload::Resolved(resolved)), restaurants)
        } else if let Some(zipcode) = input.zipcode() {
            let mode = SearchMode::zip_code(zipcode);
            let restaurants = self
                .finder
                .find(&input.restaurant_name, &mode, input.radius_miles())
                .await?;
            let computed = ComputedAddress {
                postcode: zipcode.to_string(),
                city: String::new(),
                state: String::new(),
            };
            (Some(AddressPayload::Computed(computed)), restaurants)
        } else {
            info!("no coordinates or postal code supplied, skipping restaurant search");
            (None, Vec::new())
        };

        info!(count = restaurants.len(), "found restaurants");

        Ok(LookupResponse {
            coords,
            address,
            restaurants,
        })
    }
}
