use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::Number;
use tracing::info;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use nearby_eats_lib::config::API_KEY_ENV;
use nearby_eats_lib::{Config, LocationInput, RestaurantLookup};

#[derive(Parser, Debug)]
#[command(author, version, about = "Find restaurants near a location")]
struct Cli {
    /// Search API key. Falls back to the SERP_API_KEY environment variable.
    #[arg(long, env = "SERP_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Look up restaurants by name near coordinates or a postal code.
    Search {
        /// Restaurant name or cuisine to search for.
        #[arg(long)]
        name: String,
        /// Latitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        /// Longitude in decimal degrees.
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
        /// Postal code, used when no coordinates are given.
        #[arg(long)]
        zipcode: Option<String>,
        /// Search radius in miles.
        #[arg(long)]
        accuracy: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Search {
            name,
            lat,
            lon,
            zipcode,
            accuracy,
        } => {
            let input = LocationInput {
                latitude: lat.and_then(Number::from_f64),
                longitude: lon.and_then(Number::from_f64),
                accuracy: accuracy.and_then(Number::from_f64),
                zipcode,
                restaurant_name: name,
            };
            handle_search(cli.api_key.as_deref(), &input).await
        }
    }
}

async fn handle_search(api_key: Option<&str>, input: &LocationInput) -> Result<()> {
    let config = load_config(api_key)?;
    let lookup = RestaurantLookup::new(&config).context("failed to build HTTP clients")?;

    let response = lookup
        .lookup(input)
        .await
        .with_context(|| format!("lookup for '{}' failed", input.restaurant_name))?;
    info!(count = response.restaurants.len(), "lookup finished");

    let rendered =
        serde_json::to_string_pretty(&response).context("failed to render lookup response")?;
    println!("{}", rendered);
    Ok(())
}

fn load_config(api_key: Option<&str>) -> Result<Config> {
    Config::from_lookup(|key| {
        if key == API_KEY_ENV {
            api_key.map(str::to_string)
        } else {
            std::env::var(key).ok()
        }
    })
    .context("failed to load configuration")
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .finish();

    let _ = tracing::subscriber::set_global_default(subscriber);
}
