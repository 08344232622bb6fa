use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

use crate::{
    error::{CoreError, StoreError},
    store::{KeyValueStore, keys},
};

/// Canonical ordered set of favorite city names, mirrored to the store.
///
/// Insertion order is preserved for display; duplicates are never kept.
/// Mutations are optimistic: the in-memory set is updated first and the full
/// serialized set is then written back. If the write fails the memory is NOT
/// rolled back and the caller gets a [`CoreError::Persistence`], so it knows
/// the mirror is behind.
#[derive(Debug)]
pub struct FavoritesRegistry {
    store: Arc<dyn KeyValueStore>,
    // Also serializes overlapping mutations: the whole set is re-written on
    // every change, so two concurrent writers must not interleave.
    cities: Mutex<Vec<String>>,
}

impl FavoritesRegistry {
    /// Load the registry from the store. Never fails the caller: a read error
    /// or malformed payload resets to empty and logs a warning.
    pub async fn load(store: Arc<dyn KeyValueStore>) -> Self {
        let cities = match store.get(keys::FAVORITES).await {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(list) => dedup_preserving_order(list),
                Err(err) => {
                    warn!(error = %err, "stored favorites were malformed, resetting to empty");
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(err) => {
                warn!(error = %err, "could not read stored favorites, starting empty");
                Vec::new()
            }
        };

        Self {
            store,
            cities: Mutex::new(cities),
        }
    }

    /// Add a city. No-op if already present, keeping its original position.
    /// Returns the updated ordered list.
    pub async fn add(&self, city: &str) -> Result<Vec<String>, CoreError> {
        let city = city.trim();
        if city.is_empty() {
            return Err(CoreError::empty_city());
        }

        let mut cities = self.cities.lock().await;
        if !cities.iter().any(|c| c == city) {
            cities.push(city.to_string());
        }

        self.persist(&cities).await?;
        Ok(cities.clone())
    }

    /// Remove a city. Absent is a no-op, not an error. Returns the updated
    /// ordered list.
    pub async fn remove(&self, city: &str) -> Result<Vec<String>, CoreError> {
        let city = city.trim();

        let mut cities = self.cities.lock().await;
        cities.retain(|c| c != city);

        self.persist(&cities).await?;
        Ok(cities.clone())
    }

    /// Snapshot of the current ordered list. Read-only.
    pub async fn list(&self) -> Vec<String> {
        self.cities.lock().await.clone()
    }

    async fn persist(&self, cities: &[String]) -> Result<(), CoreError> {
        let payload = serde_json::to_string(cities).map_err(|err| StoreError::Encode {
            key: keys::FAVORITES.to_string(),
            source: err.into(),
        })?;

        self.store.set(keys::FAVORITES, &payload).await?;
        Ok(())
    }
}

fn dedup_preserving_order(list: Vec<String>) -> Vec<String> {
    let mut seen = Vec::with_capacity(list.len());
    for city in list {
        if !seen.contains(&city) {
            seen.push(city);
        }
    }
    seen
}
