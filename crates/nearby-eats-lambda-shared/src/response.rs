//! Proxy response envelope returned to the Lambda host.

use std::collections::BTreeMap;

use http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::error_body::ErrorBody;

pub const HEADER_CONTENT_TYPE: &str = "Content-Type";
pub const HEADER_ALLOW_ORIGIN: &str = "Access-Control-Allow-Origin";
pub const HEADER_ALLOW_METHODS: &str = "Access-Control-Allow-Methods";
pub const HEADER_ALLOW_HEADERS: &str = "Access-Control-Allow-Headers";

/// Methods advertised to browsers during pre-flight.
pub const ALLOWED_METHODS: &str = "POST, OPTIONS";
/// Request headers advertised to browsers during pre-flight.
pub const ALLOWED_HEADERS: &str = "Content-Type";

const JSON_CONTENT_TYPE: &str = "application/json";
const FALLBACK_ERROR_BODY: &str = r#"{"message":"Internal Server Error"}"#;

/// `{ statusCode, headers, body }` response understood by function URLs and
/// API Gateway proxy integrations.
///
/// # Example
///
/// ```
/// use nearby_eats_lambda_shared::HttpResponse;
/// use serde::Serialize;
///
/// #[derive(Serialize)]
/// struct Greeting {
///     hello: &'static str,
/// }
///
/// let response = HttpResponse::ok(&Greeting { hello: "world" });
/// assert_eq!(response.status_code, 200);
/// assert_eq!(response.body, r#"{"hello":"world"}"#);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HttpResponse {
    pub status_code: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

impl HttpResponse {
    /// Fixed answer to a cross-origin pre-flight request.
    pub fn preflight() -> Self {
        let headers = BTreeMap::from([
            (HEADER_ALLOW_ORIGIN.to_string(), "*".to_string()),
            (HEADER_ALLOW_METHODS.to_string(), ALLOWED_METHODS.to_string()),
            (HEADER_ALLOW_HEADERS.to_string(), ALLOWED_HEADERS.to_string()),
        ]);
        Self {
            status_code: StatusCode::OK.as_u16(),
            headers,
            body: String::new(),
        }
    }

    /// 200 response with a JSON body.
    pub fn ok<T: Serialize>(data: &T) -> Self {
        Self::json(StatusCode::OK, data)
    }

    /// 500 response carrying an [`ErrorBody`].
    pub fn internal_error(body: &ErrorBody) -> Self {
        Self::json(StatusCode::INTERNAL_SERVER_ERROR, body)
    }

    /// JSON response with the given status and permissive origin header.
    ///
    /// A payload that fails to serialize degrades to a bare 500.
    pub fn json<T: Serialize>(status: StatusCode, data: &T) -> Self {
        match serde_json::to_string(data) {
            Ok(body) => Self::with_json_headers(status, body),
            Err(e) => {
                error!(error = %e, "failed to serialize response body");
                Self::with_json_headers(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    FALLBACK_ERROR_BODY.to_string(),
                )
            }
        }
    }

    fn with_json_headers(status: StatusCode, body: String) -> Self {
        let headers = BTreeMap::from([
            (HEADER_CONTENT_TYPE.to_string(), JSON_CONTENT_TYPE.to_string()),
            (HEADER_ALLOW_ORIGIN.to_string(), "*".to_string()),
        ]);
        Self {
            status_code: status.as_u16(),
            headers,
            body,
        }
    }

    /// Header value by exact name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }
}
