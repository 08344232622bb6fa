use std::sync::Arc;

use crate::{
    error::CoreError,
    model::TemperatureUnit,
    store::{KeyValueStore, keys},
};

/// Thin get/set passthrough for the stored preferences: default city and
/// temperature unit.
#[derive(Debug, Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub async fn default_city(&self) -> Result<Option<String>, CoreError> {
        Ok(self.store.get(keys::DEFAULT_CITY).await?)
    }

    pub async fn set_default_city(&self, city: &str) -> Result<(), CoreError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(CoreError::empty_city());
        }

        self.store.set(keys::DEFAULT_CITY, city).await?;
        Ok(())
    }

    /// Stored unit preference; absent or unrecognized values fall back to
    /// Celsius.
    pub async fn unit(&self) -> Result<TemperatureUnit, CoreError> {
        let stored = self.store.get(keys::USE_FAHRENHEIT).await?;
        Ok(match stored.as_deref() {
            Some("true") => TemperatureUnit::Fahrenheit,
            _ => TemperatureUnit::Celsius,
        })
    }

    pub async fn set_unit(&self, unit: TemperatureUnit) -> Result<(), CoreError> {
        let value = matches!(unit, TemperatureUnit::Fahrenheit).to_string();
        self.store.set(keys::USE_FAHRENHEIT, &value).await?;
        Ok(())
    }
}
