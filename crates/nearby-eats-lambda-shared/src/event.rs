//! Inbound HTTP event decoding.
//!
//! Accepts both the function URL / HTTP API (payload v2) shape, where the
//! method lives under `requestContext.http.method`, and the REST API
//! (payload v1) shape with a top-level `httpMethod`.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use nearby_eats_lib::{Error as LibError, Result as LibResult};

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpDescription {
    #[serde(default, deserialize_with = "lenient")]
    pub method: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestContext {
    #[serde(default, deserialize_with = "lenient")]
    pub http: Option<HttpDescription>,
}

/// Proxy event delivered by the Lambda host.
///
/// Decoding never looks at the body's shape, so a pre-flight probe is
/// recognised whatever it carries. The body is checked in [`body_text`].
///
/// [`body_text`]: HttpEvent::body_text
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpEvent {
    #[serde(default, deserialize_with = "lenient")]
    pub request_context: Option<RequestContext>,
    #[serde(default, deserialize_with = "lenient")]
    pub http_method: Option<String>,
    #[serde(default)]
    pub body: Option<Value>,
    #[serde(default, deserialize_with = "lenient")]
    pub is_base64_encoded: Option<bool>,
}

// A field of the wrong type reads as absent.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

impl HttpEvent {
    /// Decode a raw Lambda payload. Only a payload that is not a JSON object
    /// is rejected.
    pub fn from_payload(payload: Value) -> LibResult<Self> {
        serde_json::from_value(payload)
            .map_err(|e| LibError::MalformedRequest(format!("unrecognised event: {}", e)))
    }

    /// HTTP method of the original request, if the host supplied one.
    pub fn method(&self) -> Option<&str> {
        self.request_context
            .as_ref()
            .and_then(|ctx| ctx.http.as_ref())
            .and_then(|http| http.method.as_deref())
            .or(self.http_method.as_deref())
    }

    /// Whether this is a cross-origin pre-flight probe.
    pub fn is_preflight(&self) -> bool {
        self.method()
            .is_some_and(|method| method.eq_ignore_ascii_case("OPTIONS"))
    }

    pub fn is_base64_encoded(&self) -> bool {
        self.is_base64_encoded.unwrap_or(false)
    }

    /// Request body as text, base64-decoded when the host flagged it.
    pub fn body_text(&self) -> LibResult<String> {
        let body = match &self.body {
            None | Some(Value::Null) => {
                return Err(LibError::MalformedRequest(
                    "request body is missing".to_string(),
                ))
            }
            Some(Value::String(body)) => body,
            Some(_) => {
                return Err(LibError::MalformedRequest(
                    "request body must be a string".to_string(),
                ))
            }
        };

        if !self.is_base64_encoded() {
            return Ok(body.clone());
        }

        let bytes = STANDARD
            .decode(body.trim())
            .map_err(|e| LibError::MalformedRequest(format!("invalid base64 body: {}", e)))?;
        String::from_utf8(bytes)
            .map_err(|e| LibError::MalformedRequest(format!("body is not UTF-8: {}", e)))
    }
}
