// src/errors.rs
use thiserror::Error;

/// Main error type for the driver-notify engine.
///
/// Nothing in here is allowed to reach ride-lifecycle business logic: the
/// public engine surface swallows these at the boundary and logs them. The
/// variants exist for the internal seams (storage, platform port, backend
/// API) which do propagate with `?`.
#[derive(Debug, Error)]
pub enum NotifyError {
    // Durable storage
    #[error("Storage connection error: {0}")]
    StorageConnection(String),
    #[error("Storage operation error: {0}")]
    StorageOperation(String),

    // Serialization and parsing
    #[error("JSON parsing error: {0}")]
    JsonParsing(String),
    #[error("JSON serialization error: {0}")]
    JsonSerialization(String),
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    // Platform delivery capability
    #[error("Delivery capability unavailable: {0}")]
    DeliveryUnavailable(String),
    #[error("Delivery failed: {0}")]
    DeliveryFailed(String),
    #[error("Schedule operation failed: {0}")]
    ScheduleFailed(String),

    // Backend registration handshake
    #[error("Network request timed out")]
    NetworkTimeout,
    #[error("Network connection error: {0}")]
    NetworkConnection(String),
    #[error("HTTP client error: {0}")]
    HttpClient(String),
    #[error("Backend rejected request: {0}")]
    BackendRejected(String),

    // Engine lifecycle
    #[error("Engine is disposed")]
    EngineDisposed,
    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

// Convenience type alias for Results
pub type NotifyResult<T> = Result<T, NotifyError>;

impl From<redis::RedisError> for NotifyError {
    fn from(err: redis::RedisError) -> Self {
        match err.kind() {
            redis::ErrorKind::IoError => NotifyError::StorageConnection(err.to_string()),
            redis::ErrorKind::AuthenticationFailed => {
                NotifyError::StorageConnection("Authentication failed".to_string())
            }
            _ => NotifyError::StorageOperation(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for NotifyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            NotifyError::NetworkTimeout
        } else if err.is_connect() {
            NotifyError::NetworkConnection(err.to_string())
        } else {
            NotifyError::HttpClient(err.to_string())
        }
    }
}

impl From<serde_json::Error> for NotifyError {
    fn from(err: serde_json::Error) -> Self {
        if err.is_syntax() || err.is_data() {
            NotifyError::JsonParsing(err.to_string())
        } else {
            NotifyError::JsonSerialization(err.to_string())
        }
    }
}

impl From<chrono::ParseError> for NotifyError {
    fn from(err: chrono::ParseError) -> Self {
        NotifyError::InvalidFormat(format!("Invalid date/time format: {}", err))
    }
}

// Helper functions for creating common errors
impl NotifyError {
    pub fn storage(msg: impl Into<String>) -> Self {
        NotifyError::StorageOperation(msg.into())
    }

    pub fn delivery_unavailable(msg: impl Into<String>) -> Self {
        NotifyError::DeliveryUnavailable(msg.into())
    }

    pub fn delivery_failed(msg: impl Into<String>) -> Self {
        NotifyError::DeliveryFailed(msg.into())
    }

    pub fn configuration(msg: impl Into<String>) -> Self {
        NotifyError::ConfigurationError(msg.into())
    }
}
