use std::fmt;

use thiserror::Error;

/// Upstream endpoint a request was sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Endpoint {
    Current,
    Forecast,
    Geocoding,
    ReverseGeocoding,
}

impl Endpoint {
    pub fn as_str(&self) -> &'static str {
        match self {
            Endpoint::Current => "current",
            Endpoint::Forecast => "forecast",
            Endpoint::Geocoding => "geocoding",
            Endpoint::ReverseGeocoding => "reverse-geocoding",
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device positioning failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PositioningError {
    #[error("Positioning is not available on this host")]
    Unavailable,
    #[error("Positioning permission denied")]
    Denied,
    #[error("Positioning request timed out")]
    Timeout,
}

/// Errors produced while acquiring weather data.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Non-success HTTP status, or the request never got a response.
    #[error("{endpoint} request failed: {reason}")]
    Upstream { endpoint: Endpoint, reason: String },

    /// Success status, but the body is not the shape we expect.
    #[error("unexpected {endpoint} response: {reason}")]
    Schema { endpoint: Endpoint, reason: String },

    #[error(transparent)]
    Positioning(#[from] PositioningError),
}

impl WeatherError {
    pub(crate) fn upstream(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        WeatherError::Upstream { endpoint, reason: reason.into() }
    }

    pub(crate) fn schema(endpoint: Endpoint, reason: impl Into<String>) -> Self {
        WeatherError::Schema { endpoint, reason: reason.into() }
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        match self {
            WeatherError::Upstream { endpoint, .. } | WeatherError::Schema { endpoint, .. } => {
                Some(*endpoint)
            }
            WeatherError::Positioning(_) => None,
        }
    }

    /// Short message suitable for showing next to a retry prompt.
    pub fn user_message(&self) -> String {
        match self {
            WeatherError::Upstream { endpoint, .. } => {
                format!("The weather service is unavailable ({endpoint}). Please try again.")
            }
            WeatherError::Schema { endpoint, .. } => {
                format!("The weather service sent an unexpected response ({endpoint}).")
            }
            WeatherError::Positioning(e) => e.to_string(),
        }
    }
}

/// Failures of the local preference store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Failed to access preference store at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to encode preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}
