use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

use crate::{
    error::CoreError,
    model::{Coordinates, CurrentConditions, ForecastPoint, IconThresholds},
    provider::WeatherProvider,
};

/// Why a session ended in [`SessionStatus::Failed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureReason {
    CityNotFound,
    ProviderError,
}

/// Per-selection fetch progress:
/// `Idle → Resolving → {Fetching → Ready | Failed} | Failed`.
/// A new selection always restarts at `Resolving`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionStatus {
    #[default]
    Idle,
    Resolving,
    Fetching,
    Ready,
    Failed(FailureReason),
}

/// Read-only view of the session state at one instant.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSnapshot {
    pub selected_city: Option<String>,
    pub coordinates: Option<Coordinates>,
    pub forecast: Vec<ForecastPoint>,
    pub status: SessionStatus,
}

#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// How many forecast days to request.
    pub days: u8,
    /// When a selection fails, restore the last successfully fetched
    /// forecast instead of leaving the cleared state. Selection always
    /// clears the visible forecast up front either way.
    pub keep_stale_on_error: bool,
    pub icon_thresholds: IconThresholds,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            days: 7,
            keep_stale_on_error: false,
            icon_thresholds: IconThresholds::default(),
        }
    }
}

#[derive(Debug, Default)]
struct SessionInner {
    selected_city: Option<String>,
    coordinates: Option<Coordinates>,
    forecast: Vec<ForecastPoint>,
    // Last forecast that reached Ready, kept for keep_stale_on_error.
    last_good: Vec<ForecastPoint>,
    status: SessionStatus,
}

impl SessionInner {
    fn fail(&mut self, reason: FailureReason, keep_stale: bool) {
        if keep_stale {
            self.forecast = self.last_good.clone();
        }
        self.status = SessionStatus::Failed(reason);
    }
}

/// Resolves a city name to coordinates, fetches its forecast, and tracks
/// progress, discarding results of superseded selections.
///
/// `select_city` calls may overlap freely; the last call wins. An in-flight
/// request is never cancelled at the transport level. Instead its target city
/// is compared against the live selection when the result arrives, and a
/// mismatch discards the result without touching state. Completion order is
/// irrelevant, only that comparison counts.
#[derive(Debug, Clone)]
pub struct ForecastSession {
    provider: Arc<dyn WeatherProvider>,
    options: SessionOptions,
    inner: Arc<Mutex<SessionInner>>,
}

impl ForecastSession {
    pub fn new(provider: Arc<dyn WeatherProvider>, options: SessionOptions) -> Self {
        Self {
            provider,
            options,
            inner: Arc::new(Mutex::new(SessionInner::default())),
        }
    }

    /// Select a city and drive it through geocode + forecast fetch.
    ///
    /// Returns `Ok(())` when the selection reached `Ready`, or when it was
    /// superseded by a newer selection before completing (the newer call
    /// reports its own outcome). An empty name fails with `InvalidInput` and
    /// leaves all prior state untouched.
    pub async fn select_city(&self, city: &str) -> Result<(), CoreError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(CoreError::empty_city());
        }
        let city = city.to_string();

        {
            let mut inner = self.inner.lock().await;
            inner.selected_city = Some(city.clone());
            inner.coordinates = None;
            inner.forecast.clear();
            inner.status = SessionStatus::Resolving;
        }

        let geocoded = self.provider.geocode(&city).await;

        let coordinates = {
            let mut inner = self.inner.lock().await;
            if inner.selected_city.as_deref() != Some(city.as_str()) {
                debug!(city = %city, "discarding geocode result for superseded selection");
                return Ok(());
            }

            match geocoded {
                Ok(Some(coordinates)) => {
                    inner.coordinates = Some(coordinates);
                    inner.status = SessionStatus::Fetching;
                    coordinates
                }
                Ok(None) => {
                    inner.fail(FailureReason::CityNotFound, self.options.keep_stale_on_error);
                    return Err(CoreError::CityNotFound(city));
                }
                Err(err) => {
                    inner.fail(FailureReason::ProviderError, self.options.keep_stale_on_error);
                    return Err(CoreError::Provider(err));
                }
            }
        };

        let fetched = self.provider.daily_forecast(coordinates, self.options.days).await;

        let mut inner = self.inner.lock().await;
        if inner.selected_city.as_deref() != Some(city.as_str()) {
            debug!(city = %city, "discarding forecast result for superseded selection");
            return Ok(());
        }

        match fetched {
            Ok(entries) => {
                inner.forecast = entries
                    .into_iter()
                    .map(|entry| ForecastPoint::from_entry(entry, &self.options.icon_thresholds))
                    .collect();
                inner.last_good = inner.forecast.clone();
                inner.status = SessionStatus::Ready;
                Ok(())
            }
            Err(err) => {
                inner.fail(FailureReason::ProviderError, self.options.keep_stale_on_error);
                Err(CoreError::Provider(err))
            }
        }
    }

    /// Current conditions for the selected city. Requires a completed
    /// geocode; the result goes straight to the caller and is not cached in
    /// session state.
    pub async fn current_conditions(&self) -> Result<CurrentConditions, CoreError> {
        let coordinates = {
            let inner = self.inner.lock().await;
            inner.coordinates.ok_or_else(|| {
                CoreError::InvalidInput("no city with resolved coordinates selected".to_string())
            })?
        };

        let sample = self
            .provider
            .current(coordinates)
            .await
            .map_err(CoreError::Provider)?;

        Ok(CurrentConditions::from_sample(sample, &self.options.icon_thresholds))
    }

    /// Read-only snapshot. No side effects.
    pub async fn snapshot(&self) -> SessionSnapshot {
        let inner = self.inner.lock().await;
        SessionSnapshot {
            selected_city: inner.selected_city.clone(),
            coordinates: inner.coordinates,
            forecast: inner.forecast.clone(),
            status: inner.status,
        }
    }
}
