//! Normalization of search-provider payloads into restaurant records.
//!
//! The provider answers with one of two list shapes depending on how it
//! interpreted the query: `local_results` (map-pack entries with ratings and
//! coordinates) or `organic_results` (plain web results). Each shape has its
//! own typed entry and its own mapping into [`RestaurantRecord`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{Error, Result};

/// Latitude/longitude pair attached to a restaurant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsCoordinates {
    pub lat: f64,
    pub lng: f64,
}

/// Uniform restaurant entry returned to callers.
///
/// Optional fields serialize as `null` so clients always see the same keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RestaurantRecord {
    pub name: String,
    pub address: String,
    pub rating: Option<f64>,
    pub reviews: Option<u64>,
    pub gps: Option<GpsCoordinates>,
    pub thumbnail: Option<String>,
    pub link: Option<String>,
}

/// Entry from the provider's `local_results` list.
///
/// Every field is optional and decoded leniently: a value of the wrong type
/// reads as absent instead of rejecting the whole entry.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reviews: Option<u64>,
    #[serde(default, deserialize_with = "lenient")]
    pub gps_coordinates: Option<RawCoordinates>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub website: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub links: Option<LocalLinks>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct RawCoordinates {
    #[serde(default, deserialize_with = "lenient_float")]
    pub latitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_float")]
    pub longitude: Option<f64>,
}

impl RawCoordinates {
    /// Both halves of the pair, or nothing.
    fn complete(self) -> Option<GpsCoordinates> {
        let (lat, lng) = self.latitude.zip(self.longitude)?;
        Some(GpsCoordinates { lat, lng })
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalLinks {
    #[serde(default, deserialize_with = "lenient_text")]
    pub website: Option<String>,
}

/// Entry from the provider's `organic_results` list.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrganicResult {
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub displayed_link: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub thumbnail: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub rich_snippet: Option<RichSnippet>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichSnippet {
    #[serde(default, deserialize_with = "lenient")]
    pub top: Option<RichSnippetSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RichSnippetSection {
    #[serde(default, deserialize_with = "lenient")]
    pub detected_extensions: Option<DetectedExtensions>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectedExtensions {
    #[serde(default, deserialize_with = "lenient_float")]
    pub rating: Option<f64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub reviews: Option<u64>,
}

// Any value that does not decode as `T` reads as `None`.
fn lenient<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

// Strings pass through; numbers and booleans are rendered as text.
fn lenient_text<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

// Numbers, or strings holding a plain number such as "4.5".
fn lenient_float<'de, D>(deserializer: D) -> std::result::Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let parsed = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(parsed.filter(|v| v.is_finite()))
}

// Review counts arrive as integers, floats or strings like "1,204".
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n
            .as_u64()
            .or_else(|| n.as_f64().filter(|v| *v >= 0.0).map(|v| v.round() as u64)),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    })
}

/// A single provider result, tagged by the list it came from.
#[derive(Debug, Clone)]
pub enum ProviderResult {
    Local(LocalResult),
    Organic(OrganicResult),
}

impl ProviderResult {
    pub fn into_record(self) -> RestaurantRecord {
        match self {
            ProviderResult::Local(local) => local.into_record(),
            ProviderResult::Organic(organic) => organic.into_record(),
        }
    }
}

impl LocalResult {
    fn into_record(self) -> RestaurantRecord {
        let link = self
            .website
            .or_else(|| self.links.and_then(|links| links.website));
        RestaurantRecord {
            name: first_present([self.title, self.name]),
            address: first_present([self.address]),
            rating: self.rating,
            reviews: self.reviews,
            gps: self.gps_coordinates.and_then(RawCoordinates::complete),
            thumbnail: self.thumbnail,
            link,
        }
    }
}

impl OrganicResult {
    fn into_record(self) -> RestaurantRecord {
        let extensions = self
            .rich_snippet
            .and_then(|snippet| snippet.top)
            .and_then(|top| top.detected_extensions)
            .unwrap_or_default();
        RestaurantRecord {
            name: first_present([self.title]),
            address: first_present([self.address, self.displayed_link]),
            rating: extensions.rating,
            reviews: extensions.reviews,
            gps: None,
            thumbnail: self.thumbnail,
            link: self.link,
        }
    }
}

fn first_present<const N: usize>(candidates: [Option<String>; N]) -> String {
    candidates
        .into_iter()
        .flatten()
        .find(|value| !value.trim().is_empty())
        .unwrap_or_default()
}

/// Pick the result list to use from a raw provider payload.
///
/// A non-empty `local_results` list always wins; otherwise a non-empty
/// `organic_results` list is used. Both fields being present but empty gives
/// an empty list. [`Error::UnexpectedShape`] is returned when neither field
/// holds a list at all.
pub fn select_results(payload: &Value) -> Result<Vec<ProviderResult>> {
    let local = local_entries(payload);
    let organic = payload.get("organic_results").and_then(Value::as_array);

    match (local, organic) {
        (Some(entries), _) if !entries.is_empty() => {
            Ok(decode_entries(entries, ProviderResult::Local))
        }
        (_, Some(entries)) if !entries.is_empty() => {
            Ok(decode_entries(entries, ProviderResult::Organic))
        }
        (Some(_), _) | (_, Some(_)) => Ok(Vec::new()),
        (None, None) => Err(Error::UnexpectedShape(describe_shape(payload))),
    }
}

/// Normalize a raw provider payload into restaurant records.
pub fn normalize(payload: &Value) -> Result<Vec<RestaurantRecord>> {
    Ok(select_results(payload)?
        .into_iter()
        .map(ProviderResult::into_record)
        .collect())
}

// `local_results` is either a bare array or an object wrapping `places`.
fn local_entries(payload: &Value) -> Option<&Vec<Value>> {
    let local = payload.get("local_results")?;
    local
        .get("places")
        .and_then(Value::as_array)
        .or_else(|| local.as_array())
}

fn decode_entries<T, F>(entries: &[Value], wrap: F) -> Vec<ProviderResult>
where
    T: for<'de> Deserialize<'de>,
    F: Fn(T) -> ProviderResult,
{
    entries
        .iter()
        .filter(|entry| {
            let keep = entry.is_object();
            if !keep {
                debug!(entry = %entry, "skipping non-object search result entry");
            }
            keep
        })
        .filter_map(|entry| match serde_json::from_value::<T>(entry.clone()) {
            Ok(parsed) => Some(wrap(parsed)),
            Err(e) => {
                debug!(error = %e, "skipping unparsable search result entry");
                None
            }
        })
        .collect()
}

fn describe_shape(payload: &Value) -> String {
    let kind = |value: Option<&Value>| match value {
        None => "missing",
        Some(Value::Null) => "null",
        Some(Value::Bool(_)) => "boolean",
        Some(Value::Number(_)) => "number",
        Some(Value::String(_)) => "string",
        Some(Value::Array(_)) => "array",
        Some(Value::Object(_)) => "object",
    };
    format!(
        "local_results is {}, organic_results is {}",
        kind(payload.get("local_results")),
        kind(payload.get("organic_results"))
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn local_results_win_over_organic() {
        let payload = json!({
            "local_results": [
                { "title": "Pizza Place NYC", "address": "1 Main St", "rating": 4.5, "reviews": 120 }
            ],
            "organic_results": [
                { "title": "Pizza Place - Official Site", "link": "https://pizza.example" }
            ]
        });

        let records = normalize(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Pizza Place NYC");
        assert_eq!(records[0].address, "1 Main St");
        assert_eq!(records[0].rating, Some(4.5));
        assert_eq!(records[0].reviews, Some(120));
    }

    #[test]
    fn nested_places_list_is_accepted() {
        let payload = json!({
            "local_results": {
                "places": [
                    {
                        "title": "Joe's",
                        "address": "7 Carmine St",
                        "gps_coordinates": { "latitude": 40.73, "longitude": -74.0 },
                        "links": { "website": "https://joes.example" }
                    }
                ],
                "more_locations_link": "https://serpapi.com/..."
            }
        });

        let records = normalize(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(
            records[0].gps,
            Some(GpsCoordinates {
                lat: 40.73,
                lng: -74.0
            })
        );
        assert_eq!(records[0].link.as_deref(), Some("https://joes.example"));
    }

    #[test]
    fn local_name_falls_back_to_name_field() {
        let payload = json!({ "local_results": [ { "name": "Fallback Diner" } ] });
        let records = normalize(&payload).unwrap();
        assert_eq!(records[0].name, "Fallback Diner");
        assert_eq!(records[0].address, "");
        assert_eq!(records[0].rating, None);
    }

    #[test]
    fn organic_used_when_local_is_empty() {
        let payload = json!({
            "local_results": [],
            "organic_results": [
                {
                    "title": "Best Pizza in Town",
                    "displayed_link": "pizza.example › menu",
                    "link": "https://pizza.example/menu",
                    "rich_snippet": {
                        "top": { "detected_extensions": { "rating": 4.2, "reviews": 88 } }
                    }
                }
            ]
        });

        let records = normalize(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Best Pizza in Town");
        assert_eq!(records[0].address, "pizza.example › menu");
        assert_eq!(records[0].link.as_deref(), Some("https://pizza.example/menu"));
        assert_eq!(records[0].rating, Some(4.2));
        assert_eq!(records[0].reviews, Some(88));
        assert_eq!(records[0].gps, None);
    }

    #[test]
    fn organic_used_when_local_is_absent() {
        let payload = json!({
            "organic_results": [ { "title": "Corner Slice", "address": "9 Elm St" } ]
        });
        let records = normalize(&payload).unwrap();
        assert_eq!(records[0].name, "Corner Slice");
        assert_eq!(records[0].address, "9 Elm St");
    }

    #[test]
    fn empty_lists_give_empty_result() {
        let payload = json!({ "local_results": [], "organic_results": [] });
        assert!(normalize(&payload).unwrap().is_empty());
    }

    #[test]
    fn non_list_shapes_are_reported() {
        let payload = json!({ "local_results": "none", "search_metadata": {} });
        let err = normalize(&payload).unwrap_err();
        match err {
            Error::UnexpectedShape(detail) => {
                assert!(detail.contains("local_results is string"));
                assert!(detail.contains("organic_results is missing"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn non_object_entries_are_skipped() {
        let payload = json!({ "local_results": [ 42, { "title": "Real Place" } ] });
        let records = normalize(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].name, "Real Place");
    }

    #[test]
    fn odd_field_types_keep_the_entry() {
        let payload = json!({
            "local_results": [
                { "title": "Joe's", "address": "7 Carmine St", "reviews": "1.2K" },
                { "title": "Kept", "gps_coordinates": { "latitude": 40.7 } },
                { "title": 12, "rating": "4.5", "reviews": "1,204", "links": "none" }
            ]
        });

        let records = normalize(&payload).unwrap();
        assert_eq!(records.len(), 3);

        assert_eq!(records[0].name, "Joe's");
        assert_eq!(records[0].address, "7 Carmine St");
        assert_eq!(records[0].reviews, None);

        assert_eq!(records[1].name, "Kept");
        assert_eq!(records[1].gps, None);

        assert_eq!(records[2].name, "12");
        assert_eq!(records[2].rating, Some(4.5));
        assert_eq!(records[2].reviews, Some(1204));
        assert_eq!(records[2].link, None);
    }

    #[test]
    fn organic_snippet_with_wrong_shape_is_ignored() {
        let payload = json!({
            "organic_results": [
                { "title": "Slice", "rich_snippet": { "top": "n/a" }, "thumbnail": null }
            ]
        });
        let records = normalize(&payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].rating, None);
        assert_eq!(records[0].thumbnail, None);
    }

    #[test]
    fn record_serializes_missing_fields_as_null() {
        let record = RestaurantRecord {
            name: "Somewhere".to_string(),
            address: String::new(),
            rating: None,
            reviews: None,
            gps: None,
            thumbnail: None,
            link: None,
        };
        let value = serde_json::to_value(record).unwrap();
        assert!(value["rating"].is_null());
        assert!(value["gps"].is_null());
        assert!(value.as_object().unwrap().contains_key("link"));
    }
}
