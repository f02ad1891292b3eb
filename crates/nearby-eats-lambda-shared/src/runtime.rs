//! Lambda runtime initialization.
//!
//! Configuration is read from the environment exactly once, at cold start,
//! and the resulting HTTP clients are reused by every invocation served by
//! the same execution environment. Nothing in here is mutated afterwards.
//!
//! # Cold-Start Performance
//!
//! Initialization logs `total_init_ms` so slow starts can be spotted in
//! CloudWatch.

use std::sync::OnceLock;
use std::time::Instant;

use tracing::{error, info};

use nearby_eats_lib::{Config, Error as LibError, RestaurantLookup};

/// Lazily-initialized Lambda runtime state.
static RUNTIME: OnceLock<Result<LambdaRuntime, InitError>> = OnceLock::new();

/// Error during runtime initialization.
#[derive(Debug, Clone)]
pub struct InitError {
    pub message: String,
}

impl std::fmt::Display for InitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lambda initialization failed: {}", self.message)
    }
}

impl std::error::Error for InitError {}

impl From<LibError> for InitError {
    fn from(err: LibError) -> Self {
        Self {
            message: err.to_string(),
        }
    }
}

/// Configuration and clients shared across invocations.
#[derive(Debug)]
pub struct LambdaRuntime {
    config: Config,
    lookup: RestaurantLookup,
}

impl LambdaRuntime {
    /// Build the runtime from an explicit configuration.
    pub fn from_config(config: Config) -> Result<Self, InitError> {
        let lookup = RestaurantLookup::new(&config)?;
        Ok(Self { config, lookup })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Geocoder and restaurant finder wired to the configured endpoints.
    pub fn lookup(&self) -> &RestaurantLookup {
        &self.lookup
    }
}

/// Initialize the runtime from the process environment.
///
/// Subsequent calls return the cached result of the first call, including a
/// cached failure.
pub fn init_runtime() -> Result<&'static LambdaRuntime, InitError> {
    init_runtime_with(Config::from_env)
}

/// Initialize the runtime with a caller-supplied configuration source.
///
/// Tests use this to inject a configuration pointing at mock servers. Only
/// the first caller's source is ever evaluated.
pub fn init_runtime_with<F>(source: F) -> Result<&'static LambdaRuntime, InitError>
where
    F: FnOnce() -> nearby_eats_lib::Result<Config>,
{
    let result = RUNTIME.get_or_init(|| {
        let total_start = Instant::now();
        info!("initializing Lambda runtime");

        let runtime = source()
            .map_err(InitError::from)
            .and_then(LambdaRuntime::from_config);

        match &runtime {
            Ok(rt) => info!(
                total_init_ms = total_start.elapsed().as_millis() as u64,
                search_url = %rt.config.search_url,
                geocode_url = %rt.config.geocode_url,
                http_timeout_secs = rt.config.http_timeout.as_secs(),
                "Lambda runtime initialization complete"
            ),
            Err(e) => error!(error = %e, "Lambda runtime initialization failed"),
        }

        runtime
    });

    result.as_ref().map_err(|e| e.clone())
}

/// Get the initialized runtime.
pub fn get_runtime() -> Result<&'static LambdaRuntime, InitError> {
    match RUNTIME.get() {
        Some(Ok(runtime)) => Ok(runtime),
        Some(Err(e)) => Err(e.clone()),
        None => Err(InitError {
            message: "runtime not initialized; call init_runtime() first".to_string(),
        }),
    }
}
