use async_trait::async_trait;
use std::fmt::Debug;

use crate::{
    error::WeatherError,
    model::{Coordinate, DailyForecast, NamedLocation, WeatherSnapshot},
};

pub mod open_meteo;

pub use open_meteo::{OpenMeteoEndpoints, OpenMeteoProvider};

/// Searches shorter than this never reach the network.
pub const MIN_SEARCH_CHARS: usize = 2;

/// Cap on the number of geocoding matches requested.
pub const SEARCH_RESULT_LIMIT: u32 = 10;

/// Days covered by a daily forecast.
pub const FORECAST_DAYS: u32 = 7;

/// Source of weather and geocoding data.
///
/// Implementations hold no per-call state and may be called concurrently.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Current conditions plus a display name for the coordinate.
    async fn fetch_current_conditions(
        &self,
        coord: Coordinate,
    ) -> Result<WeatherSnapshot, WeatherError>;

    async fn fetch_forecast(&self, coord: Coordinate) -> Result<DailyForecast, WeatherError>;

    async fn search_places(&self, text: &str) -> Result<Vec<NamedLocation>, WeatherError>;

    /// Display name for a coordinate, `None` when it cannot be resolved.
    async fn reverse_geocode(&self, coord: Coordinate) -> Option<String>;
}

pub(crate) fn is_searchable(text: &str) -> bool {
    text.chars().count() >= MIN_SEARCH_CHARS
}
