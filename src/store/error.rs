//! Remote store error types.

/// Errors from certificate store calls.
///
/// `Display` of [`StoreError::Api`] is the store's own human-readable
/// message, which is what gets surfaced to the user.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The store answered with an error object.
    #[error("{message}")]
    Api {
        endpoint: String,
        status: u16,
        message: String,
        code: Option<String>,
    },
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Response body did not match the expected shape.
    #[error("failed to decode response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
    /// Missing or malformed store settings.
    #[error("store configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub fn api(endpoint: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        StoreError::Api {
            endpoint: endpoint.into(),
            status,
            message: message.into(),
            code: None,
        }
    }

    /// HTTP status reported by the store, when there was a response at all
    pub fn status(&self) -> Option<u16> {
        match self {
            StoreError::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}
