//! Open-Meteo forecast and geocoding client.
//! See: https://open-meteo.com/en/docs and https://open-meteo.com/en/docs/geocoding-api

use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use std::time::Duration;

use crate::{
    error::{Endpoint, WeatherError},
    model::{
        Coordinate, CurrentConditions, DailyForecast, NamedLocation, UNKNOWN_LOCATION,
        WeatherSnapshot,
    },
    normalize::{bearing, meters_to_km, percent, round_tenth, round_whole},
    provider::{FORECAST_DAYS, SEARCH_RESULT_LIMIT, WeatherProvider, is_searchable},
};

pub const DEFAULT_FORECAST_URL: &str = "https://api.open-meteo.com/v1/forecast";
pub const DEFAULT_GEOCODING_URL: &str = "https://geocoding-api.open-meteo.com/v1/search";

const CURRENT_FIELDS: &str = "temperature_2m,relative_humidity_2m,wind_speed_10m,\
wind_direction_10m,weather_code,is_day,surface_pressure,visibility,uv_index,cloud_cover,\
dew_point_2m,apparent_temperature";

const DAILY_FIELDS: &str =
    "temperature_2m_max,temperature_2m_min,weather_code,precipitation_sum,wind_speed_10m_max";

/// Base URLs for the upstream services.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenMeteoEndpoints {
    pub forecast: String,
    pub geocoding: String,
    pub reverse_geocoding: String,
}

impl Default for OpenMeteoEndpoints {
    fn default() -> Self {
        Self {
            forecast: DEFAULT_FORECAST_URL.to_string(),
            geocoding: DEFAULT_GEOCODING_URL.to_string(),
            reverse_geocoding: DEFAULT_GEOCODING_URL.to_string(),
        }
    }
}

impl OpenMeteoEndpoints {
    /// All endpoints under one base URL, e.g. a mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            forecast: format!("{base}/v1/forecast"),
            geocoding: format!("{base}/v1/search"),
            reverse_geocoding: format!("{base}/v1/search"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    endpoints: OpenMeteoEndpoints,
}

impl OpenMeteoProvider {
    pub fn new(
        endpoints: OpenMeteoEndpoints,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self, reqwest::Error> {
        let http = Client::builder().timeout(timeout).user_agent(user_agent).build()?;
        Ok(Self::with_client(http, endpoints))
    }

    pub fn with_client(http: Client, endpoints: OpenMeteoEndpoints) -> Self {
        Self { http, endpoints }
    }

    pub fn endpoints(&self) -> &OpenMeteoEndpoints {
        &self.endpoints
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: Endpoint,
        url: &str,
        query: &[(&str, String)],
    ) -> Result<T, WeatherError> {
        tracing::debug!(%endpoint, url, "sending request");

        let res = self
            .http
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| WeatherError::upstream(endpoint, e.to_string()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| WeatherError::upstream(endpoint, format!("failed to read body: {e}")))?;

        if !status.is_success() {
            return Err(WeatherError::upstream(
                endpoint,
                format!("status {}: {}", status, truncate_body(&body)),
            ));
        }

        serde_json::from_str(&body).map_err(|e| WeatherError::schema(endpoint, e.to_string()))
    }

    async fn lookup_name(&self, coord: Coordinate) -> Result<Option<String>, WeatherError> {
        let parsed: OmGeocodingResponse = self
            .get_json(
                Endpoint::ReverseGeocoding,
                &self.endpoints.reverse_geocoding,
                &[
                    ("latitude", coord.latitude.to_string()),
                    ("longitude", coord.longitude.to_string()),
                    ("count", "1".to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        Ok(parsed
            .results
            .unwrap_or_default()
            .first()
            .map(NamedLocation::display_name))
    }
}

fn coord_query(coord: Coordinate) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", coord.latitude.to_string()),
        ("longitude", coord.longitude.to_string()),
    ]
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    async fn fetch_current_conditions(
        &self,
        coord: Coordinate,
    ) -> Result<WeatherSnapshot, WeatherError> {
        let mut query = coord_query(coord);
        query.push(("current", CURRENT_FIELDS.to_string()));
        query.push(("timezone", "auto".to_string()));

        let (weather, name) = tokio::join!(
            self.get_json::<OmCurrentResponse>(Endpoint::Current, &self.endpoints.forecast, &query),
            self.reverse_geocode(coord),
        );
        let parsed = weather?;

        Ok(WeatherSnapshot {
            current: parsed.current.normalize(),
            location_name: name.unwrap_or_else(|| UNKNOWN_LOCATION.to_string()),
            coordinate: Coordinate::new(parsed.latitude, parsed.longitude),
            timezone: parsed.timezone,
        })
    }

    async fn fetch_forecast(&self, coord: Coordinate) -> Result<DailyForecast, WeatherError> {
        let mut query = coord_query(coord);
        query.push(("daily", DAILY_FIELDS.to_string()));
        query.push(("timezone", "auto".to_string()));
        query.push(("forecast_days", FORECAST_DAYS.to_string()));

        let parsed: OmForecastResponse =
            self.get_json(Endpoint::Forecast, &self.endpoints.forecast, &query).await?;
        let daily = parsed.daily;

        DailyForecast::new(
            daily.time,
            daily.temperature_2m_max.into_iter().map(round_whole).collect(),
            daily.temperature_2m_min.into_iter().map(round_whole).collect(),
            daily.weather_code,
            daily.precipitation_sum,
            daily.wind_speed_10m_max.into_iter().map(round_whole).collect(),
        )
        .map_err(|e| WeatherError::schema(Endpoint::Forecast, e.to_string()))
    }

    async fn search_places(&self, text: &str) -> Result<Vec<NamedLocation>, WeatherError> {
        if !is_searchable(text) {
            return Ok(Vec::new());
        }

        let parsed: OmGeocodingResponse = self
            .get_json(
                Endpoint::Geocoding,
                &self.endpoints.geocoding,
                &[
                    ("name", text.to_string()),
                    ("count", SEARCH_RESULT_LIMIT.to_string()),
                    ("language", "en".to_string()),
                    ("format", "json".to_string()),
                ],
            )
            .await?;

        Ok(parsed.results.unwrap_or_default())
    }

    async fn reverse_geocode(&self, coord: Coordinate) -> Option<String> {
        match self.lookup_name(coord).await {
            Ok(Some(name)) => Some(name),
            Ok(None) => {
                tracing::debug!(%coord, "reverse geocoding found no match");
                None
            }
            Err(e) => {
                tracing::warn!(%coord, "reverse geocoding failed: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature_2m: f64,
    relative_humidity_2m: f64,
    wind_speed_10m: f64,
    wind_direction_10m: f64,
    weather_code: u16,
    is_day: u8,
    surface_pressure: f64,
    visibility: f64,
    uv_index: f64,
    cloud_cover: f64,
    dew_point_2m: f64,
    apparent_temperature: f64,
}

impl OmCurrent {
    fn normalize(self) -> CurrentConditions {
        CurrentConditions {
            temperature: round_whole(self.temperature_2m),
            feels_like: round_whole(self.apparent_temperature),
            humidity: percent(self.relative_humidity_2m),
            wind_speed: round_whole(self.wind_speed_10m),
            wind_direction: bearing(self.wind_direction_10m),
            pressure: round_whole(self.surface_pressure),
            visibility: meters_to_km(self.visibility),
            uv_index: round_tenth(self.uv_index),
            cloud_cover: percent(self.cloud_cover),
            dew_point: round_whole(self.dew_point_2m),
            weather_code: self.weather_code,
            is_day: self.is_day == 1,
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentResponse {
    latitude: f64,
    longitude: f64,
    timezone: String,
    current: OmCurrent,
}

#[derive(Debug, Deserialize)]
struct OmDaily {
    time: Vec<NaiveDate>,
    temperature_2m_max: Vec<f64>,
    temperature_2m_min: Vec<f64>,
    weather_code: Vec<u16>,
    precipitation_sum: Vec<f64>,
    wind_speed_10m_max: Vec<f64>,
}

#[derive(Debug, Deserialize)]
struct OmForecastResponse {
    daily: OmDaily,
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    #[serde(default)]
    results: Option<Vec<NamedLocation>>,
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.chars().count() > MAX {
        format!("{}...", body.chars().take(MAX).collect::<String>())
    } else {
        body.to_string()
    }
}
