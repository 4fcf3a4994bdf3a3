use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A point on Earth.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4}, {:.4}", self.latitude, self.longitude)
    }
}

/// Used when the device position cannot be resolved (New York).
pub const FALLBACK_COORDINATE: Coordinate = Coordinate::new(40.7128, -74.0060);

/// Place name used when reverse geocoding yields nothing.
pub const UNKNOWN_LOCATION: &str = "Unknown Location";

/// Normalized current conditions. Temperatures, speeds, pressure and
/// visibility are whole numbers; the UV index has one decimal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: u8,
    pub wind_speed: f64,
    pub wind_direction: u16,
    /// Surface pressure in hPa.
    pub pressure: f64,
    /// Visibility in km.
    pub visibility: f64,
    pub uv_index: f64,
    pub cloud_cover: u8,
    pub dew_point: f64,
    pub weather_code: u16,
    pub is_day: bool,
}

/// Current conditions for a place, as handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherSnapshot {
    pub current: CurrentConditions,
    pub location_name: String,
    pub coordinate: Coordinate,
    pub timezone: String,
}

/// Daily forecast as index-aligned sequences, one entry per day.
///
/// Only constructible through [`DailyForecast::new`], which rejects
/// sequences of unequal length.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyForecast {
    time: Vec<NaiveDate>,
    temperature_max: Vec<f64>,
    temperature_min: Vec<f64>,
    weather_code: Vec<u16>,
    precipitation_sum: Vec<f64>,
    wind_speed_max: Vec<f64>,
}

/// Returned by [`DailyForecast::new`] when the sequences disagree in length.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LengthMismatch {
    pub field: &'static str,
    pub expected: usize,
    pub found: usize,
}

impl fmt::Display for LengthMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "daily `{}` has {} entries, expected {}",
            self.field, self.found, self.expected
        )
    }
}

/// One day of a [`DailyForecast`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DayForecast {
    pub date: NaiveDate,
    pub temperature_max: f64,
    pub temperature_min: f64,
    pub weather_code: u16,
    pub precipitation_sum: f64,
    pub wind_speed_max: f64,
}

impl DailyForecast {
    pub fn new(
        time: Vec<NaiveDate>,
        temperature_max: Vec<f64>,
        temperature_min: Vec<f64>,
        weather_code: Vec<u16>,
        precipitation_sum: Vec<f64>,
        wind_speed_max: Vec<f64>,
    ) -> Result<Self, LengthMismatch> {
        let expected = time.len();
        let lengths = [
            ("temperature_max", temperature_max.len()),
            ("temperature_min", temperature_min.len()),
            ("weather_code", weather_code.len()),
            ("precipitation_sum", precipitation_sum.len()),
            ("wind_speed_max", wind_speed_max.len()),
        ];

        if let Some((field, found)) = lengths.into_iter().find(|(_, len)| *len != expected) {
            return Err(LengthMismatch { field, expected, found });
        }

        Ok(Self {
            time,
            temperature_max,
            temperature_min,
            weather_code,
            precipitation_sum,
            wind_speed_max,
        })
    }

    pub fn len(&self) -> usize {
        self.time.len()
    }

    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    pub fn time(&self) -> &[NaiveDate] {
        &self.time
    }

    pub fn temperature_max(&self) -> &[f64] {
        &self.temperature_max
    }

    pub fn temperature_min(&self) -> &[f64] {
        &self.temperature_min
    }

    pub fn weather_code(&self) -> &[u16] {
        &self.weather_code
    }

    /// Millimeters, at upstream precision.
    pub fn precipitation_sum(&self) -> &[f64] {
        &self.precipitation_sum
    }

    pub fn wind_speed_max(&self) -> &[f64] {
        &self.wind_speed_max
    }

    pub fn day(&self, index: usize) -> Option<DayForecast> {
        Some(DayForecast {
            date: *self.time.get(index)?,
            temperature_max: self.temperature_max[index],
            temperature_min: self.temperature_min[index],
            weather_code: self.weather_code[index],
            precipitation_sum: self.precipitation_sum[index],
            wind_speed_max: self.wind_speed_max[index],
        })
    }

    pub fn days(&self) -> impl Iterator<Item = DayForecast> + '_ {
        (0..self.len()).filter_map(|i| self.day(i))
    }

    pub fn total_precipitation(&self) -> f64 {
        self.precipitation_sum.iter().sum()
    }

    pub fn rainy_days(&self) -> usize {
        self.precipitation_sum.iter().filter(|mm| **mm > 0.0).count()
    }
}

/// A geocoded place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NamedLocation {
    pub id: u64,
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, rename = "admin1", skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

impl NamedLocation {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.latitude, self.longitude)
    }

    /// "Name, Region, Country", skipping whichever parts are missing.
    pub fn display_name(&self) -> String {
        [Some(&self.name), self.region.as_ref(), self.country.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, day).expect("valid date")
    }

    fn three_days() -> DailyForecast {
        DailyForecast::new(
            vec![date(1), date(2), date(3)],
            vec![20.0, 18.0, 15.0],
            vec![11.0, 9.0, 7.0],
            vec![0, 61, 3],
            vec![0.0, 4.2, 0.3],
            vec![12.0, 30.0, 8.0],
        )
        .expect("aligned sequences")
    }

    #[test]
    fn forecast_rejects_unequal_lengths() {
        let err = DailyForecast::new(
            vec![date(1), date(2)],
            vec![20.0, 18.0],
            vec![11.0],
            vec![0, 61],
            vec![0.0, 4.2],
            vec![12.0, 30.0],
        )
        .unwrap_err();

        assert_eq!(err.field, "temperature_min");
        assert_eq!(err.expected, 2);
        assert_eq!(err.found, 1);
    }

    #[test]
    fn days_are_index_aligned() {
        let forecast = three_days();
        let days: Vec<_> = forecast.days().collect();

        assert_eq!(days.len(), 3);
        assert_eq!(days[1].date, date(2));
        assert_eq!(days[1].weather_code, 61);
        assert_eq!(days[1].precipitation_sum, 4.2);
        assert!(forecast.day(3).is_none());
    }

    #[test]
    fn precipitation_summary() {
        let forecast = three_days();
        assert!((forecast.total_precipitation() - 4.5).abs() < 1e-9);
        assert_eq!(forecast.rainy_days(), 2);
    }

    #[test]
    fn display_name_omits_missing_parts() {
        let mut loc = NamedLocation {
            id: 2643743,
            name: "London".into(),
            latitude: 51.50853,
            longitude: -0.12574,
            country: Some("United Kingdom".into()),
            region: Some("England".into()),
        };
        assert_eq!(loc.display_name(), "London, England, United Kingdom");

        loc.region = None;
        assert_eq!(loc.display_name(), "London, United Kingdom");

        loc.country = None;
        assert_eq!(loc.display_name(), "London");
    }

    #[test]
    fn named_location_uses_upstream_region_key() {
        let loc: NamedLocation = serde_json::from_value(serde_json::json!({
            "id": 1, "name": "Lyon", "latitude": 45.75, "longitude": 4.85,
            "country": "France", "admin1": "Auvergne-Rhône-Alpes"
        }))
        .expect("valid location");

        assert_eq!(loc.region.as_deref(), Some("Auvergne-Rhône-Alpes"));
    }

    #[test]
    fn named_location_tolerates_missing_country() {
        let loc: NamedLocation = serde_json::from_value(serde_json::json!({
            "id": 2, "name": "Null Island", "latitude": 0.0, "longitude": 0.0
        }))
        .expect("country is optional");

        assert_eq!(loc.country, None);
        assert_eq!(loc.display_name(), "Null Island");
    }
}
