use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{
    location::{FixedPosition, NoPositioning, PositionSource},
    model::Coordinate,
    provider::open_meteo::{OpenMeteoEndpoints, OpenMeteoProvider},
    search::SEARCH_DEBOUNCE,
};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_USER_AGENT: &str = concat!("nimbus/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: DEFAULT_TIMEOUT_SECS, user_agent: DEFAULT_USER_AGENT.to_string() }
    }
}

/// Fixed device position for hosts without a positioning service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionConfig {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// search_debounce_ms = 300
///
/// [endpoints]
/// forecast = "https://api.open-meteo.com/v1/forecast"
///
/// [http]
/// timeout_secs = 10
///
/// [position]
/// latitude = 47.3769
/// longitude = 8.5417
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search_debounce_ms: u64,
    pub endpoints: OpenMeteoEndpoints,
    pub http: HttpConfig,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<PositionConfig>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search_debounce_ms: SEARCH_DEBOUNCE.as_millis() as u64,
            endpoints: OpenMeteoEndpoints::default(),
            http: HttpConfig::default(),
            position: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "nimbus", "nimbus")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the preference store (recent locations, theme).
    pub fn preferences_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.data_dir().join("preferences.json"))
    }

    pub fn set_position(&mut self, coord: Coordinate) {
        self.position = Some(PositionConfig { latitude: coord.latitude, longitude: coord.longitude });
    }

    pub fn clear_position(&mut self) {
        self.position = None;
    }

    pub fn position(&self) -> Option<Coordinate> {
        self.position.map(|p| Coordinate::new(p.latitude, p.longitude))
    }

    /// Positioning capability described by this config.
    pub fn position_source(&self) -> Arc<dyn PositionSource> {
        match self.position() {
            Some(coord) => Arc::new(FixedPosition(coord)),
            None => Arc::new(NoPositioning),
        }
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    /// Build the weather client described by this config.
    pub fn provider(&self) -> Result<OpenMeteoProvider> {
        OpenMeteoProvider::new(
            self.endpoints.clone(),
            Duration::from_secs(self.http.timeout_secs),
            &self.http.user_agent,
        )
        .context("Failed to build HTTP client")
    }
}
