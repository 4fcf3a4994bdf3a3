//! Core library for the `nimbus` weather dashboard.
//!
//! This crate defines:
//! - The Open-Meteo client and its normalized domain records
//! - Device positioning with a fallback-free resolver
//! - Debounced place search and the recent-locations list
//! - The weather session state machine that ties them together
//! - Configuration and local preference storage
//!
//! It is used by `nimbus-cli`, but carries no presentation logic and can be
//! driven by any front end.

pub mod config;
pub mod describe;
pub mod error;
pub mod location;
pub mod model;
pub mod normalize;
pub mod provider;
pub mod recent;
pub mod search;
pub mod session;
pub mod store;

#[cfg(test)]
mod testing;

pub use config::Config;
pub use describe::{WeatherDescription, describe_weather_code};
pub use error::{Endpoint, PositioningError, StoreError, WeatherError};
pub use location::{LocationResolver, PositionOptions, PositionSource};
pub use model::{
    Coordinate, CurrentConditions, DailyForecast, FALLBACK_COORDINATE, NamedLocation,
    WeatherSnapshot,
};
pub use provider::{OpenMeteoEndpoints, OpenMeteoProvider, WeatherProvider};
pub use recent::RecentLocations;
pub use search::LocationSearch;
pub use session::{CycleOutcome, LoadedWeather, SessionState, WeatherSession};
pub use store::{FileStore, KeyValueStore, MemoryStore, Theme};
