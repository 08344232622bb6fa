use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;

use skycast_core::{
    FavoritesRegistry, FileStore, ForecastPoint, ForecastSession, KeyValueStore, OpenMeteoProvider,
    Preferences, SessionOptions, TemperatureUnit,
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "City weather lookup with favorites")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show current conditions for a city.
    Current {
        /// City name; falls back to the stored default city.
        city: Option<String>,
    },

    /// Show a multi-day forecast for a city.
    Forecast {
        /// City name; with none given, pick one of your favorites.
        city: Option<String>,

        /// Number of forecast days to request.
        #[arg(long, default_value_t = 7)]
        days: u8,
    },

    /// Manage the favorites list.
    #[command(subcommand)]
    Fav(FavCommand),

    /// Read or change stored preferences.
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Debug, Subcommand)]
pub enum FavCommand {
    /// Add a city to the favorites.
    Add { city: String },
    /// Remove a city from the favorites.
    Remove { city: String },
    /// List all favorite cities.
    List,
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Set the default city used when no city argument is given.
    SetDefault { city: String },
    /// Set the temperature unit used for display.
    Unit { unit: UnitArg },
    /// Show the stored preferences.
    Show,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum UnitArg {
    Celsius,
    Fahrenheit,
}

impl From<UnitArg> for TemperatureUnit {
    fn from(arg: UnitArg) -> Self {
        match arg {
            UnitArg::Celsius => TemperatureUnit::Celsius,
            UnitArg::Fahrenheit => TemperatureUnit::Fahrenheit,
        }
    }
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let store: Arc<dyn KeyValueStore> =
            Arc::new(FileStore::open_default().context("Failed to open local store")?);
        let prefs = Preferences::new(store.clone());

        match self.command {
            Command::Current { city } => {
                let city = match city {
                    Some(city) => city,
                    None => default_city_or_hint(&prefs).await?,
                };

                let session = ForecastSession::new(
                    Arc::new(OpenMeteoProvider::new()),
                    SessionOptions {
                        days: 1,
                        ..SessionOptions::default()
                    },
                );
                session.select_city(&city).await?;
                let current = session.current_conditions().await?;

                let unit = prefs.unit().await?;
                println!(
                    "{} {} {} — observed {}",
                    city,
                    current.icon.glyph(),
                    format_temp(current.temperature, unit),
                    current.observed_at.format("%H:%M UTC"),
                );
            }

            Command::Forecast { city, days } => {
                let city = match city {
                    Some(city) => city,
                    None => pick_city(&store, &prefs).await?,
                };

                let session = ForecastSession::new(
                    Arc::new(OpenMeteoProvider::new()),
                    SessionOptions {
                        days,
                        ..SessionOptions::default()
                    },
                );
                session.select_city(&city).await?;

                let snapshot = session.snapshot().await;
                let unit = prefs.unit().await?;
                println!("{days}-day forecast for {city}:");
                for point in &snapshot.forecast {
                    print_forecast_line(point, unit);
                }
            }

            Command::Fav(fav) => {
                let registry = FavoritesRegistry::load(store).await;
                match fav {
                    FavCommand::Add { city } => {
                        let updated = registry.add(&city).await?;
                        println!("Saved. Favorites: {}", updated.join(", "));
                    }
                    FavCommand::Remove { city } => {
                        let updated = registry.remove(&city).await?;
                        if updated.is_empty() {
                            println!("Removed. No favorites left.");
                        } else {
                            println!("Removed. Favorites: {}", updated.join(", "));
                        }
                    }
                    FavCommand::List => {
                        let favorites = registry.list().await;
                        if favorites.is_empty() {
                            println!("No favorites saved yet. Add one with `skycast fav add <city>`.");
                        } else {
                            for city in favorites {
                                println!("{city}");
                            }
                        }
                    }
                }
            }

            Command::Config(config) => match config {
                ConfigCommand::SetDefault { city } => {
                    prefs.set_default_city(&city).await?;
                    println!("Default city set to {}", city.trim());
                }
                ConfigCommand::Unit { unit } => {
                    prefs.set_unit(unit.into()).await?;
                    println!("Temperature unit set.");
                }
                ConfigCommand::Show => {
                    let city = prefs.default_city().await?;
                    let unit = prefs.unit().await?;
                    println!(
                        "default city: {}",
                        city.as_deref().unwrap_or("(not set)")
                    );
                    println!("unit: {}", unit.symbol());
                }
            },
        }

        Ok(())
    }
}

async fn default_city_or_hint(prefs: &Preferences) -> Result<String> {
    match prefs.default_city().await? {
        Some(city) => Ok(city),
        None => bail!(
            "No city given and no default city configured.\n\
             Hint: run `skycast config set-default <city>` first."
        ),
    }
}

/// Pick a city for the forecast: an interactive choice over the favorites
/// when any exist, otherwise the default city.
async fn pick_city(store: &Arc<dyn KeyValueStore>, prefs: &Preferences) -> Result<String> {
    let registry = FavoritesRegistry::load(store.clone()).await;
    let favorites = registry.list().await;

    if favorites.is_empty() {
        return default_city_or_hint(prefs).await;
    }

    let choice = inquire::Select::new("Pick a favorite city:", favorites)
        .prompt()
        .context("Favorite selection was cancelled")?;

    Ok(choice)
}

fn format_temp(celsius: f64, unit: TemperatureUnit) -> String {
    format!("{:.1}{}", unit.convert_from_celsius(celsius), unit.symbol())
}

fn print_forecast_line(point: &ForecastPoint, unit: TemperatureUnit) {
    let mut line = format!(
        "{}  {}  {} – {}",
        point.date.format("%a %d %b"),
        point.icon.glyph(),
        format_temp(point.temperature_min, unit),
        format_temp(point.temperature_max, unit),
    );
    if let Some(warning) = point.warning {
        line.push_str(&format!("  ⚠️ {warning}"));
    }
    println!("{line}");
}
