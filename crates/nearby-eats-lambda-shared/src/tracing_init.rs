//! Tracing initialization for Lambda functions.
//!
//! Configures JSON-formatted tracing output suitable for CloudWatch Logs.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is not set.
///
/// HTTP client internals are noisy at `info`, so they are held to `warn`.
const DEFAULT_FILTER: &str = "info,hyper=warn,hyper_util=warn,reqwest=warn";

/// Initialize tracing with JSON formatting for CloudWatch Logs.
///
/// Call this once at the start of the Lambda `main` function, before
/// `lambda_runtime::run()`. The log level can be controlled via the
/// `RUST_LOG` environment variable.
///
/// Returns `false` if a global subscriber was already installed, which only
/// happens when a test harness got there first.
///
/// # Example
///
/// ```no_run
/// use nearby_eats_lambda_shared::init_tracing;
///
/// #[tokio::main]
/// async fn main() -> Result<(), lambda_runtime::Error> {
///     init_tracing();
///     // ... rest of Lambda setup
///     Ok(())
/// }
/// ```
pub fn init_tracing() -> bool {
    let fmt_layer = fmt::layer()
        .json()
        .with_target(true)
        .with_level(true)
        .with_current_span(false)
        .with_span_list(false)
        .flatten_event(true)
        // CloudWatch stamps every line already.
        .without_time();

    tracing_subscriber::registry()
        .with(env_filter())
        .with(fmt_layer)
        .try_init()
        .is_ok()
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}
