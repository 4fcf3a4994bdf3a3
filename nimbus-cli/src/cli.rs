use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand, ValueEnum};
use inquire::{Confirm, CustomType, Select, validator::Validation};
use std::sync::Arc;

use nimbus_core::{
    Config, Coordinate, FileStore, KeyValueStore, LocationResolver, LocationSearch, SessionState,
    Theme, WeatherProvider, WeatherSession,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "nimbus", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current conditions and the 7-day forecast.
    Show {
        /// Latitude; requires --lon. Without a coordinate the device position is used.
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,

        /// Longitude; requires --lat.
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,

        /// Use the device position and fail instead of falling back to the default location.
        #[arg(long, conflicts_with_all = ["lat", "lon"])]
        here: bool,

        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Search for a place by name.
    Search {
        /// Place name, at least two characters.
        query: String,

        /// Interactively pick a result and show its weather.
        #[arg(long)]
        pick: bool,
    },

    /// Manage recently selected places.
    Recent {
        #[command(subcommand)]
        action: Option<RecentAction>,
    },

    /// Show or change the color theme preference.
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },

    /// Configure the fixed device position.
    Configure {
        /// Remove the configured position instead of setting one.
        #[arg(long)]
        clear: bool,
    },
}

#[derive(Debug, Subcommand)]
pub enum RecentAction {
    /// List recent places, newest first.
    List,
    /// Forget a recent place.
    Remove { id: u64 },
    /// Show the weather for a recent place.
    Open { id: u64 },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Show,
    Toggle,
    Dark,
    Light,
}

/// Everything a command needs, built from the on-disk config.
struct App {
    config: Config,
    store: Arc<FileStore>,
    provider: Arc<dyn WeatherProvider>,
}

impl App {
    fn load() -> Result<Self> {
        let config = Config::load()?;
        let path = Config::preferences_file_path()?;
        tracing::debug!(path = %path.display(), "opening preferences");
        let store = FileStore::open(&path)
            .with_context(|| format!("Failed to open preferences: {}", path.display()))?;
        let provider = config.provider()?;

        Ok(Self { config, store: Arc::new(store), provider: Arc::new(provider) })
    }

    fn session(&self) -> WeatherSession {
        let resolver = LocationResolver::new(self.config.position_source());
        WeatherSession::new(self.provider.clone(), resolver)
    }

    fn search(&self) -> LocationSearch {
        LocationSearch::new(self.provider.clone(), self.store.clone())
            .with_debounce(self.config.search_debounce())
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Show { lat, lon, here, json } => {
                let app = App::load()?;
                let session = app.session();

                match (lat, lon) {
                    (Some(lat), Some(lon)) => {
                        session.load_for_location(Coordinate::new(lat, lon)).await;
                    }
                    _ if here => {
                        session.use_device_position().await.map_err(|e| {
                            anyhow!(
                                "{e}.\nHint: run `nimbus configure` to set a fixed position."
                            )
                        })?;
                    }
                    _ => {
                        session.initialize().await;
                    }
                }

                report(&session, json).await
            }
            Command::Search { query, pick } => {
                let app = App::load()?;
                let search = app.search();
                let found = search.search(&query).await.unwrap_or_default();

                if found.is_empty() {
                    println!("No places found for '{query}'.");
                    return Ok(());
                }

                if !pick {
                    print!("{}", render::places(&found));
                    return Ok(());
                }

                let names: Vec<String> = found.iter().map(|p| p.display_name()).collect();
                let choice = Select::new("Choose a place:", names)
                    .raw_prompt()
                    .context("No place selected")?;
                let location = found
                    .get(choice.index)
                    .cloned()
                    .ok_or_else(|| anyhow!("Selected place is no longer available"))?;

                let session = app.session();
                session.select(&search, location).await;
                report(&session, false).await
            }
            Command::Recent { action } => {
                let app = App::load()?;
                let search = app.search();

                match action.unwrap_or(RecentAction::List) {
                    RecentAction::List => {
                        let recents = search.recents();
                        if recents.is_empty() {
                            println!("No recent places yet. Try `nimbus search <name> --pick`.");
                        } else {
                            print!("{}", render::places(&recents));
                        }
                    }
                    RecentAction::Remove { id } => {
                        if search.recent(id).is_none() {
                            bail!("No recent place with id {id}.");
                        }
                        let remaining = search.remove_from_recents(id)?;
                        println!("Removed. {} recent place(s) left.", remaining.len());
                    }
                    RecentAction::Open { id } => {
                        let location = search
                            .recent(id)
                            .ok_or_else(|| anyhow!("No recent place with id {id}."))?;
                        let session = app.session();
                        session.select(&search, location).await;
                        report(&session, false).await?;
                    }
                }

                Ok(())
            }
            Command::Theme { action } => {
                let app = App::load()?;
                let store: &dyn KeyValueStore = app.store.as_ref();
                let current = Theme::load(store).unwrap_or_default();

                let next = match action {
                    None | Some(ThemeAction::Show) => {
                        println!("{current}");
                        return Ok(());
                    }
                    Some(ThemeAction::Toggle) => current.toggled(),
                    Some(ThemeAction::Dark) => Theme::Dark,
                    Some(ThemeAction::Light) => Theme::Light,
                };

                next.save(store)?;
                println!("Theme set to {next}.");
                Ok(())
            }
            Command::Configure { clear } => {
                let mut config = Config::load()?;

                if clear {
                    config.clear_position();
                } else {
                    let coord = prompt_position(config.position())?;
                    config.set_position(coord);
                }

                config.save()?;
                match config.position() {
                    Some(coord) => println!("Device position set to {coord}."),
                    None => println!("Device position cleared; New York is used as fallback."),
                }
                println!("Saved to {}", Config::config_file_path()?.display());
                Ok(())
            }
        }
    }
}

/// Print the session result, offering a retry while it has failed.
async fn report(session: &WeatherSession, json: bool) -> Result<()> {
    loop {
        match session.state() {
            SessionState::Loaded(weather) => {
                if json {
                    println!("{}", serde_json::to_string_pretty(weather.as_ref())?);
                } else {
                    print!("{}", render::weather(&weather));
                }
                return Ok(());
            }
            SessionState::Failed { message, .. } => {
                eprintln!("Weather unavailable: {message}");
                if !offer_retry(json) {
                    bail!("{message}\nHint: run `nimbus show` again or check your network.");
                }
                session.retry().await;
            }
            other => bail!("Weather is still loading ({other:?})"),
        }
    }
}

/// JSON output is for scripts, so it never prompts.
fn offer_retry(json: bool) -> bool {
    !json && Confirm::new("Try again?").with_default(true).prompt().unwrap_or(false)
}

fn prompt_position(current: Option<Coordinate>) -> Result<Coordinate> {
    let latitude = CustomType::<f64>::new("Latitude:")
        .with_default(current.map(|c| c.latitude).unwrap_or_default())
        .with_validator(|v: &f64| {
            Ok(if (-90.0..=90.0).contains(v) {
                Validation::Valid
            } else {
                Validation::Invalid("Latitude must be between -90 and 90".into())
            })
        })
        .prompt()
        .context("Failed to read latitude")?;

    let longitude = CustomType::<f64>::new("Longitude:")
        .with_default(current.map(|c| c.longitude).unwrap_or_default())
        .with_validator(|v: &f64| {
            Ok(if (-180.0..=180.0).contains(v) {
                Validation::Valid
            } else {
                Validation::Invalid("Longitude must be between -180 and 180".into())
            })
        })
        .prompt()
        .context("Failed to read longitude")?;

    Ok(Coordinate::new(latitude, longitude))
}
