//! Weather session state machine.
//!
//! ```text
//! Initializing -> Loaded | Failed
//! Loaded | Failed -> Loading -> Loaded | Failed
//! ```
//!
//! Each fetch cycle takes a generation number before it starts. A cycle
//! commits its result only if no newer cycle has started since; otherwise
//! the result is dropped. In-flight requests are never cancelled.

use parking_lot::Mutex;
use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use crate::{
    error::PositioningError,
    location::LocationResolver,
    model::{Coordinate, DailyForecast, FALLBACK_COORDINATE, NamedLocation, WeatherSnapshot},
    provider::WeatherProvider,
    search::LocationSearch,
};

/// Current conditions and forecast from the same fetch cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadedWeather {
    pub snapshot: WeatherSnapshot,
    pub forecast: DailyForecast,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Initializing,
    /// A cycle is running; `previous` is what was loaded before it, if anything.
    Loading {
        coordinate: Coordinate,
        previous: Option<Arc<LoadedWeather>>,
    },
    Loaded(Arc<LoadedWeather>),
    Failed {
        message: String,
        coordinate: Option<Coordinate>,
    },
}

impl SessionState {
    /// The weather to display, including stale data shown while loading.
    pub fn weather(&self) -> Option<&Arc<LoadedWeather>> {
        match self {
            SessionState::Loaded(weather) => Some(weather),
            SessionState::Loading { previous, .. } => previous.as_ref(),
            SessionState::Initializing | SessionState::Failed { .. } => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, SessionState::Initializing | SessionState::Loading { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            SessionState::Failed { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// Result of a fetch cycle from the caller's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// The cycle's result (success or failure) is now the session state.
    Committed,
    /// A newer cycle started first; this result was dropped.
    Superseded,
}

#[derive(Debug)]
struct Inner {
    state: SessionState,
    last_coordinate: Option<Coordinate>,
}

#[derive(Debug)]
pub struct WeatherSession {
    provider: Arc<dyn WeatherProvider>,
    resolver: LocationResolver,
    generation: AtomicU64,
    inner: Mutex<Inner>,
}

impl WeatherSession {
    pub fn new(provider: Arc<dyn WeatherProvider>, resolver: LocationResolver) -> Self {
        Self {
            provider,
            resolver,
            generation: AtomicU64::new(0),
            inner: Mutex::new(Inner { state: SessionState::Initializing, last_coordinate: None }),
        }
    }

    pub fn state(&self) -> SessionState {
        self.inner.lock().state.clone()
    }

    pub fn weather(&self) -> Option<Arc<LoadedWeather>> {
        self.inner.lock().state.weather().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.lock().state.is_loading()
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner.lock().state.error_message().map(str::to_string)
    }

    pub fn last_coordinate(&self) -> Option<Coordinate> {
        self.inner.lock().last_coordinate
    }

    /// Resolve the device position, falling back to
    /// [`FALLBACK_COORDINATE`] on any positioning failure, then fetch.
    ///
    /// If another cycle starts while the position is being resolved, that
    /// cycle wins and this returns [`CycleOutcome::Superseded`].
    pub async fn initialize(&self) -> CycleOutcome {
        let started_at = self.generation.load(Ordering::SeqCst);

        let coord = match self.resolver.resolve_current_position().await {
            Ok(coord) => coord,
            Err(e) => {
                tracing::warn!("{}; using fallback location {}", e, FALLBACK_COORDINATE);
                FALLBACK_COORDINATE
            }
        };

        if self.generation.load(Ordering::SeqCst) != started_at {
            tracing::debug!("another fetch started while resolving position");
            return CycleOutcome::Superseded;
        }

        self.fetch(coord).await
    }

    /// Re-fetch the loaded place. `None` when nothing has been loaded yet.
    pub async fn refresh(&self) -> Option<CycleOutcome> {
        let coord = self.weather()?.snapshot.coordinate;
        Some(self.fetch(coord).await)
    }

    /// Fetch weather for an explicit coordinate, superseding any cycle
    /// already in flight.
    pub async fn load_for_location(&self, coord: Coordinate) -> CycleOutcome {
        self.fetch(coord).await
    }

    /// Fetch again for the last requested coordinate, or start over when no
    /// coordinate was ever resolved.
    pub async fn retry(&self) -> CycleOutcome {
        match self.last_coordinate() {
            Some(coord) => self.fetch(coord).await,
            None => self.initialize().await,
        }
    }

    /// Record a search selection and load its weather. Failing to persist
    /// the recency list does not stop the load.
    pub async fn select(&self, search: &LocationSearch, location: NamedLocation) -> CycleOutcome {
        let coord = location.coordinate();
        if let Err(e) = search.select(location) {
            tracing::warn!("Failed to save recent location: {}", e);
        }
        self.load_for_location(coord).await
    }

    /// Load weather for the device position. Unlike [`initialize`], a
    /// positioning failure is returned and the state is left untouched.
    ///
    /// [`initialize`]: WeatherSession::initialize
    pub async fn use_device_position(&self) -> Result<CycleOutcome, PositioningError> {
        let coord = self.resolver.resolve_current_position().await?;
        Ok(self.load_for_location(coord).await)
    }

    async fn fetch(&self, coord: Coordinate) -> CycleOutcome {
        let generation = self.begin(coord);
        tracing::debug!(generation, %coord, "starting weather fetch");

        let (current, forecast) = tokio::join!(
            self.provider.fetch_current_conditions(coord),
            self.provider.fetch_forecast(coord),
        );

        let mut inner = self.inner.lock();
        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!(generation, %coord, "discarding result of superseded fetch");
            return CycleOutcome::Superseded;
        }

        inner.state = match (current, forecast) {
            (Ok(snapshot), Ok(forecast)) => {
                tracing::info!(
                    generation,
                    location = %snapshot.location_name,
                    days = forecast.len(),
                    "weather loaded"
                );
                SessionState::Loaded(Arc::new(LoadedWeather { snapshot, forecast }))
            }
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(generation, %coord, "weather fetch failed: {}", e);
                SessionState::Failed { message: e.user_message(), coordinate: Some(coord) }
            }
        };

        CycleOutcome::Committed
    }

    fn begin(&self, coord: Coordinate) -> u64 {
        let mut inner = self.inner.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let previous = inner.state.weather().cloned();

        inner.state = SessionState::Loading { coordinate: coord, previous };
        inner.last_coordinate = Some(coord);
        generation
    }
}
