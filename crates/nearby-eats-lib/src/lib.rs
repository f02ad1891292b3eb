//! Nearby Eats library entry points.
//!
//! This crate resolves a caller's location (coordinates or postal code) into
//! a locality, queries the restaurant search provider around it, and
//! normalizes the provider's answer into uniform restaurant records.
//! Higher-level consumers (CLI, Lambda) should only depend on the items
//! exported here instead of reimplementing behavior.

#![deny(warnings)]

pub mod config;
pub mod error;
pub mod geocode;
pub mod lookup;
pub mod results;
pub mod search;

pub use config::Config;
pub use error::{Error, Provider, Result};
pub use geocode::{Geocoder, ResolvedAddress};
pub use lookup::{
    AddressPayload, ComputedAddress, Coords, LocationInput, LookupResponse, RestaurantLookup,
};
pub use results::{normalize, GpsCoordinates, ProviderResult, RestaurantRecord};
pub use search::{build_query, RestaurantFinder, SearchMode};
