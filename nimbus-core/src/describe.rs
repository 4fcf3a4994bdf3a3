//! Static weather knowledge: WMO weather codes and the display
//! classifications derived from normalized values.
//! See: https://open-meteo.com/en/docs#weathervariables

use serde::Serialize;

/// Human-readable description of a weather code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WeatherDescription {
    pub description: &'static str,
    pub icon: &'static str,
}

const UNKNOWN: WeatherDescription = WeatherDescription { description: "Unknown", icon: "❓" };

/// Look up a WMO weather code. Unknown codes map to a placeholder.
pub fn describe_weather_code(code: u16) -> WeatherDescription {
    let (description, icon) = match code {
        0 => ("Clear sky", "☀️"),
        1 => ("Mainly clear", "🌤️"),
        2 => ("Partly cloudy", "⛅"),
        3 => ("Overcast", "☁️"),
        45 => ("Fog", "🌫️"),
        48 => ("Depositing rime fog", "🌫️"),
        51 => ("Light drizzle", "🌦️"),
        53 => ("Moderate drizzle", "🌦️"),
        55 => ("Dense drizzle", "🌧️"),
        61 => ("Slight rain", "🌧️"),
        63 => ("Moderate rain", "🌧️"),
        65 => ("Heavy rain", "⛈️"),
        71 => ("Slight snow", "🌨️"),
        73 => ("Moderate snow", "❄️"),
        75 => ("Heavy snow", "❄️"),
        95 => ("Thunderstorm", "⛈️"),
        96 => ("Thunderstorm with hail", "⛈️"),
        99 => ("Thunderstorm with heavy hail", "⛈️"),
        _ => return UNKNOWN,
    };

    WeatherDescription { description, icon }
}

const COMPASS_POINTS: [&str; 16] = [
    "N", "NNE", "NE", "ENE", "E", "ESE", "SE", "SSE", "S", "SSW", "SW", "WSW", "W", "WNW", "NW",
    "NNW",
];

/// 16-point compass name for a bearing in degrees.
pub fn compass_point(degrees: u16) -> &'static str {
    let index = ((f64::from(degrees) / 22.5) + 0.5).floor() as usize % COMPASS_POINTS.len();
    COMPASS_POINTS[index]
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WindLevel {
    Light,
    Moderate,
    Strong,
    VeryStrong,
}

impl WindLevel {
    /// Classify a wind speed in km/h.
    pub fn classify(speed: f64) -> Self {
        if speed < 10.0 {
            Self::Light
        } else if speed < 25.0 {
            Self::Moderate
        } else if speed < 40.0 {
            Self::Strong
        } else {
            Self::VeryStrong
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Light => "Light",
            Self::Moderate => "Moderate",
            Self::Strong => "Strong",
            Self::VeryStrong => "Very Strong",
        }
    }
}

/// Intensity of a daily precipitation sum. Depends on fractional
/// thresholds, which is why precipitation is never rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PrecipitationIntensity {
    None,
    Light,
    Moderate,
    Heavy,
}

impl PrecipitationIntensity {
    pub fn classify(millimeters: f64) -> Self {
        if millimeters <= 0.0 {
            Self::None
        } else if millimeters < 2.5 {
            Self::Light
        } else if millimeters < 10.0 {
            Self::Moderate
        } else {
            Self::Heavy
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Light => "light",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
    Extreme,
}

impl UvLevel {
    pub fn classify(index: f64) -> Self {
        if index < 3.0 {
            Self::Low
        } else if index < 6.0 {
            Self::Moderate
        } else if index < 8.0 {
            Self::High
        } else if index < 11.0 {
            Self::VeryHigh
        } else {
            Self::Extreme
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::VeryHigh => "Very High",
            Self::Extreme => "Extreme",
        }
    }
}
