//! Core library for the `skycast` weather app.
//!
//! This crate defines:
//! - The favorites registry: a persisted, deduplicated set of city names
//! - The forecast session: per-selection geocode + fetch state machine
//! - Abstraction over the weather provider and the key-value store
//! - Shared domain models and the derived icon/warning policy
//!
//! It is used by `skycast-cli`, but any presentation layer can consume the
//! same capability interfaces.

pub mod error;
pub mod favorites;
pub mod model;
pub mod prefs;
pub mod provider;
pub mod session;
pub mod store;

pub use error::{CoreError, StoreError};
pub use favorites::FavoritesRegistry;
pub use model::{
    ConditionIcon, Coordinates, CurrentConditions, DailyEntry, ForecastPoint, IconThresholds,
    StormWarning, TemperatureUnit,
};
pub use prefs::Preferences;
pub use provider::{OpenMeteoProvider, WeatherProvider};
pub use session::{FailureReason, ForecastSession, SessionOptions, SessionSnapshot, SessionStatus};
pub use store::{FileStore, KeyValueStore, MemoryStore};
