//! Scripted provider for exercising the search and session logic without
//! a network.

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use std::time::Duration;

use crate::{
    error::{Endpoint, WeatherError},
    model::{
        Coordinate, CurrentConditions, DailyForecast, NamedLocation, UNKNOWN_LOCATION,
        WeatherSnapshot,
    },
    provider::WeatherProvider,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Failure {
    None,
    Current,
    Forecast,
}

#[derive(Debug, Default)]
pub(crate) struct ScriptedProvider {
    delays: Mutex<Vec<(Coordinate, Duration)>>,
    failing: Mutex<Vec<(Coordinate, Failure)>>,
    places: Mutex<Vec<(String, Duration, Option<Vec<NamedLocation>>)>>,
    pub fetched: Mutex<Vec<Coordinate>>,
    pub searched: Mutex<Vec<String>>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn delay(self, coord: Coordinate, delay: Duration) -> Self {
        self.delays.lock().push((coord, delay));
        self
    }

    pub fn fail(self, coord: Coordinate, failure: Failure) -> Self {
        self.failing.lock().push((coord, failure));
        self
    }

    /// `None` makes the search for `text` fail.
    pub fn places(
        self,
        text: &str,
        delay: Duration,
        results: Option<Vec<NamedLocation>>,
    ) -> Self {
        self.places.lock().push((text.to_string(), delay, results));
        self
    }

    fn delay_for(&self, coord: Coordinate) -> Duration {
        self.delays
            .lock()
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|(_, d)| *d)
            .unwrap_or(Duration::from_millis(10))
    }

    fn failure_for(&self, coord: Coordinate) -> Failure {
        self.failing
            .lock()
            .iter()
            .find(|(c, _)| *c == coord)
            .map(|(_, f)| *f)
            .unwrap_or(Failure::None)
    }
}

pub(crate) fn place(id: u64, name: &str, latitude: f64, longitude: f64) -> NamedLocation {
    NamedLocation {
        id,
        name: name.to_string(),
        latitude,
        longitude,
        country: Some("Testland".to_string()),
        region: None,
    }
}

/// Snapshot whose temperature encodes the latitude, so tests can tell
/// which cycle produced the committed state.
pub(crate) fn snapshot_for(coord: Coordinate) -> WeatherSnapshot {
    WeatherSnapshot {
        current: CurrentConditions {
            temperature: coord.latitude.round(),
            feels_like: coord.latitude.round(),
            humidity: 50,
            wind_speed: 10.0,
            wind_direction: 180,
            pressure: 1013.0,
            visibility: 10.0,
            uv_index: 3.2,
            cloud_cover: 20,
            dew_point: 8.0,
            weather_code: 1,
            is_day: true,
        },
        location_name: UNKNOWN_LOCATION.to_string(),
        coordinate: coord,
        timezone: "UTC".to_string(),
    }
}

pub(crate) fn forecast_for(coord: Coordinate) -> DailyForecast {
    let date = NaiveDate::from_ymd_opt(2026, 10, 16).unwrap_or_default();
    DailyForecast::new(
        vec![date],
        vec![coord.latitude.round()],
        vec![coord.latitude.round() - 8.0],
        vec![1],
        vec![0.4],
        vec![20.0],
    )
    .expect("aligned forecast")
}

#[async_trait]
impl WeatherProvider for ScriptedProvider {
    async fn fetch_current_conditions(
        &self,
        coord: Coordinate,
    ) -> Result<WeatherSnapshot, WeatherError> {
        self.fetched.lock().push(coord);
        tokio::time::sleep(self.delay_for(coord)).await;
        if self.failure_for(coord) == Failure::Current {
            return Err(WeatherError::upstream(Endpoint::Current, "status 500 Internal Server Error"));
        }
        Ok(snapshot_for(coord))
    }

    async fn fetch_forecast(&self, coord: Coordinate) -> Result<DailyForecast, WeatherError> {
        tokio::time::sleep(self.delay_for(coord)).await;
        if self.failure_for(coord) == Failure::Forecast {
            return Err(WeatherError::upstream(Endpoint::Forecast, "status 502 Bad Gateway"));
        }
        Ok(forecast_for(coord))
    }

    async fn search_places(&self, text: &str) -> Result<Vec<NamedLocation>, WeatherError> {
        self.searched.lock().push(text.to_string());
        let scripted = self
            .places
            .lock()
            .iter()
            .find(|(t, _, _)| t == text)
            .map(|(_, d, r)| (*d, r.clone()));

        let Some((delay, results)) = scripted else {
            return Ok(Vec::new());
        };
        tokio::time::sleep(delay).await;
        results.ok_or_else(|| WeatherError::upstream(Endpoint::Geocoding, "connection reset"))
    }

    async fn reverse_geocode(&self, _coord: Coordinate) -> Option<String> {
        None
    }
}
