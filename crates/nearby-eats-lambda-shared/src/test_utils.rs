//! Test utilities for Lambda handler testing.
//!
//! Builders for the proxy events the Lambda host delivers, plus a
//! configuration helper that points both outbound clients at one mock
//! server.
//!
//! # Usage
//!
//! ```ignore
//! use nearby_eats_lambda_shared::test_utils::{mock_request_id, post_event};
//!
//! let event = post_event(&serde_json::json!({ "restaurantName": "Deli" }));
//! let request_id = mock_request_id("deli");
//! ```

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};

use nearby_eats_lib::Config;

/// Create a mock request ID for testing.
///
/// `lambda_runtime::Context` cannot be built directly in tests, so handler
/// entry points take the request ID as a plain string.
pub fn mock_request_id(suffix: &str) -> String {
    format!("test-request-{}", suffix)
}

/// Function URL event for the given method and raw body.
pub fn http_event(method: &str, body: Option<&str>) -> Value {
    json!({
        "version": "2.0",
        "rawPath": "/",
        "requestContext": {
            "requestId": "test-request-context",
            "http": { "method": method, "path": "/" }
        },
        "headers": { "content-type": "application/json" },
        "body": body,
        "isBase64Encoded": false
    })
}

/// `POST` event carrying `payload` as its JSON body.
pub fn post_event(payload: &Value) -> Value {
    http_event("POST", Some(&payload.to_string()))
}

/// `POST` event carrying `payload` base64-encoded, as API Gateway does for
/// some content types.
pub fn base64_post_event(payload: &Value) -> Value {
    let mut event = http_event("POST", Some(&STANDARD.encode(payload.to_string())));
    event["isBase64Encoded"] = Value::Bool(true);
    event
}

/// `OPTIONS` pre-flight event.
pub fn preflight_event() -> Value {
    http_event("OPTIONS", None)
}

/// Configuration whose geocode and search endpoints live on `base_uri`
/// under `/reverse` and `/search.json`.
pub fn mock_config(base_uri: &str) -> Config {
    let base = base_uri.trim_end_matches('/');
    let geocode = format!("{}/reverse", base);
    let search = format!("{}/search.json", base);
    Config::from_lookup(|key| match key {
        nearby_eats_lib::config::API_KEY_ENV => Some("test-key".to_string()),
        nearby_eats_lib::config::GEOCODE_URL_ENV => Some(geocode.clone()),
        nearby_eats_lib::config::SEARCH_URL_ENV => Some(search.clone()),
        _ => None,
    })
    .expect("mock configuration should be valid")
}
