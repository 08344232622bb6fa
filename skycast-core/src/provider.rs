use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{Coordinates, CurrentSample, DailyEntry};

pub mod openmeteo;

pub use openmeteo::OpenMeteoProvider;

/// Abstraction over the geocoding + forecast collaborator. Both calls are
/// read-only and idempotent; single attempt, no built-in retry.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Resolve a city name to coordinates. `Ok(None)` means the provider
    /// found no match; `Err` means the request itself failed.
    async fn geocode(&self, city: &str) -> anyhow::Result<Option<Coordinates>>;

    /// Daily forecast for the next `days` days, oldest first.
    async fn daily_forecast(
        &self,
        coordinates: Coordinates,
        days: u8,
    ) -> anyhow::Result<Vec<DailyEntry>>;

    /// Current conditions at the given coordinates.
    async fn current(&self, coordinates: Coordinates) -> anyhow::Result<CurrentSample>;
}
