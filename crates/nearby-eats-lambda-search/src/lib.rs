//! Request handling for the nearby restaurant Lambda.
//!
//! Every invocation ends in exactly one of three responses: the fixed
//! pre-flight answer, a 200 lookup envelope, or a 500 `{ message, error }`
//! body. Errors never escape to the Lambda host.

use lambda_runtime::{service_fn, Error, LambdaEvent};
use serde_json::Value;
use tracing::{error, info};

use nearby_eats_lambda_shared::{
    get_runtime, init_runtime, init_tracing, ErrorBody, HttpEvent, HttpResponse,
};
use nearby_eats_lib::{Error as LibError, LocationInput, LookupResponse, RestaurantLookup};

/// Entry point used by the Lambda runtime.
pub async fn run() -> Result<(), Error> {
    init_tracing();

    // Fails the cold start outright when the API key is missing.
    init_runtime()?;

    lambda_runtime::run(service_fn(handler)).await
}

/// Lambda handler invoked per request.
pub async fn handler(event: LambdaEvent<Value>) -> Result<HttpResponse, Error> {
    let request_id = event.context.request_id.clone();

    let runtime = match get_runtime() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(request_id = %request_id, error = %e, "runtime unavailable");
            return Ok(HttpResponse::internal_error(&ErrorBody::internal(
                e.message,
            )));
        }
    };

    Ok(handle_event(runtime.lookup(), event.payload, &request_id).await)
}

/// Core handler logic separated for reuse in tests.
pub async fn handle_event(
    lookup: &RestaurantLookup,
    payload: Value,
    request_id: &str,
) -> HttpResponse {
    let event = match HttpEvent::from_payload(payload) {
        Ok(event) => event,
        Err(e) => return failure(&e, request_id),
    };

    if event.is_preflight() {
        info!(request_id = %request_id, "answering pre-flight request");
        return HttpResponse::preflight();
    }

    match process(lookup, &event, request_id).await {
        Ok(response) => {
            info!(
                request_id = %request_id,
                restaurants = response.restaurants.len(),
                "lookup completed"
            );
            HttpResponse::ok(&response)
        }
        Err(e) => failure(&e, request_id),
    }
}

async fn process(
    lookup: &RestaurantLookup,
    event: &HttpEvent,
    request_id: &str,
) -> Result<LookupResponse, LibError> {
    let body = event.body_text()?;
    let input = LocationInput::from_json(&body)?;

    info!(
        request_id = %request_id,
        method = event.method().unwrap_or("<unknown>"),
        restaurant_name = %input.restaurant_name,
        "handling lookup request"
    );

    lookup.lookup(&input).await
}

fn failure(err: &LibError, request_id: &str) -> HttpResponse {
    // Full detail (including upstream bodies) stays in the logs.
    error!(request_id = %request_id, error = %err, debug = ?err, "request failed");
    HttpResponse::internal_error(&ErrorBody::from(err))
}
