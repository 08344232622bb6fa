use thiserror::Error;

/// Failure of a single key-value store operation.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to read key '{key}' from store")]
    Read {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to write key '{key}' to store")]
    Write {
        key: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("failed to encode value for key '{key}'")]
    Encode {
        key: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Error taxonomy of the core. Every failure is scoped to the operation that
/// caused it; nothing here is fatal to the process.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Caller-supplied input was unusable (e.g. an empty city name).
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The geocoder returned no match for the requested city.
    #[error("no match found for city '{0}'")]
    CityNotFound(String),

    /// Network or parse failure from a provider call.
    #[error("weather provider request failed")]
    Provider(#[source] anyhow::Error),

    /// The store write (or read) did not complete. For registry mutations the
    /// in-memory state has already been updated when this is returned.
    #[error("persistence did not complete")]
    Persistence(#[from] StoreError),
}

impl CoreError {
    pub fn empty_city() -> Self {
        CoreError::InvalidInput("city name must not be empty".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_messages_are_human_readable() {
        let err = CoreError::empty_city();
        assert!(err.to_string().contains("city name must not be empty"));

        let err = CoreError::CityNotFound("Atlantis".to_string());
        assert!(err.to_string().contains("Atlantis"));
    }

    #[test]
    fn store_error_converts_into_persistence() {
        let store_err = StoreError::Write {
            key: "favorites".to_string(),
            source: anyhow::anyhow!("disk full"),
        };
        let err: CoreError = store_err.into();
        assert!(matches!(err, CoreError::Persistence(_)));
    }
}
