use std::fmt::Write;

use nimbus_core::{
    LoadedWeather, NamedLocation,
    describe::{PrecipitationIntensity, UvLevel, WindLevel, compass_point},
    describe_weather_code,
};

pub fn weather(weather: &LoadedWeather) -> String {
    let snapshot = &weather.snapshot;
    let current = &snapshot.current;
    let desc = describe_weather_code(current.weather_code);
    let mut out = String::new();

    let _ = writeln!(out, "{}", snapshot.location_name);
    let _ = writeln!(out, "  {} · {}", snapshot.coordinate, snapshot.timezone);
    let _ = writeln!(
        out,
        "  {}  {}, {}°C (feels like {}°C), {}",
        desc.icon,
        desc.description,
        current.temperature,
        current.feels_like,
        if current.is_day { "day" } else { "night" },
    );
    let _ = writeln!(
        out,
        "  Humidity {}% · Wind {} km/h {} ({}) · Pressure {} hPa",
        current.humidity,
        current.wind_speed,
        compass_point(current.wind_direction),
        WindLevel::classify(current.wind_speed).label(),
        current.pressure,
    );
    let _ = writeln!(
        out,
        "  Visibility {} km · UV {:.1} ({}) · Clouds {}% · Dew point {}°C",
        current.visibility,
        current.uv_index,
        UvLevel::classify(current.uv_index).label(),
        current.cloud_cover,
        current.dew_point,
    );

    let forecast = &weather.forecast;
    if forecast.is_empty() {
        return out;
    }

    let _ = writeln!(out);
    let _ = writeln!(out, "{}-day forecast", forecast.len());
    for day in forecast.days() {
        let desc = describe_weather_code(day.weather_code);
        let _ = writeln!(
            out,
            "  {}  {} {:<28} {:>4}° / {:>4}°  {:>5.1} mm {:<9} {:>3} km/h",
            day.date.format("%a %d %b"),
            desc.icon,
            desc.description,
            day.temperature_max,
            day.temperature_min,
            day.precipitation_sum,
            format!("({})", PrecipitationIntensity::classify(day.precipitation_sum).label()),
            day.wind_speed_max,
        );
    }
    let _ = writeln!(
        out,
        "  Total precipitation {:.1} mm over {} rainy day(s)",
        forecast.total_precipitation(),
        forecast.rainy_days(),
    );

    out
}

pub fn places(places: &[NamedLocation]) -> String {
    let mut out = String::new();
    for (i, place) in places.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  [id {}] ({:.4}, {:.4})",
            i + 1,
            place.display_name(),
            place.id,
            place.latitude,
            place.longitude,
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use nimbus_core::{Coordinate, CurrentConditions, DailyForecast, WeatherSnapshot};

    fn sample() -> LoadedWeather {
        let date = NaiveDate::from_ymd_opt(2026, 10, 16).expect("valid date");
        LoadedWeather {
            snapshot: WeatherSnapshot {
                current: CurrentConditions {
                    temperature: 18.0,
                    feels_like: 17.0,
                    humidity: 72,
                    wind_speed: 15.0,
                    wind_direction: 250,
                    pressure: 1017.0,
                    visibility: 16.0,
                    uv_index: 0.0,
                    cloud_cover: 100,
                    dew_point: 13.0,
                    weather_code: 3,
                    is_day: false,
                },
                location_name: "New York, New York, United States".into(),
                coordinate: Coordinate::new(40.7103, -73.9931),
                timezone: "America/New_York".into(),
            },
            forecast: DailyForecast::new(
                vec![date],
                vec![20.0],
                vec![11.0],
                vec![61],
                vec![4.3],
                vec![19.0],
            )
            .expect("aligned forecast"),
        }
    }

    #[test]
    fn weather_includes_current_and_forecast() {
        let text = weather(&sample());

        assert!(text.starts_with("New York, New York, United States\n"));
        assert!(text.contains("Overcast, 18°C (feels like 17°C), night"));
        assert!(text.contains("Wind 15 km/h WSW (Moderate)"));
        assert!(text.contains("1-day forecast"));
        assert!(text.contains("Fri 16 Oct"));
        assert!(text.contains("(moderate)"));
        assert!(text.contains("Total precipitation 4.3 mm over 1 rainy day(s)"));
    }

    #[test]
    fn places_are_numbered() {
        let list = places(&[NamedLocation {
            id: 2643743,
            name: "London".into(),
            latitude: 51.50853,
            longitude: -0.12574,
            country: Some("United Kingdom".into()),
            region: Some("England".into()),
        }]);

        assert_eq!(list, " 1. London, England, United Kingdom  [id 2643743] (51.5085, -0.1257)\n");
    }
}
