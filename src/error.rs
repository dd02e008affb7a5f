//! Error types for the collector.

use thiserror::Error;

/// Main error type for the library and the CLI.
#[derive(Error, Debug)]
pub enum Error {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration value for '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    #[error("Missing required configuration: {0}")]
    MissingConfig(String),

    #[error("Unsupported platform: {0}")]
    UnsupportedPlatform(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Cannot operate on prices with different currencies ({left} and {right})")]
    CurrencyMismatch { left: String, right: String },

    // Client errors
    #[error(
        "The client is not connected yet. Call `connect` before performing any requests."
    )]
    NotConnected,

    #[error("Failed to retrieve user information. Maybe the provided {credential} is invalid or expired.")]
    RetrieveUser { credential: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("HTTP {status} returned for {url}")]
    Status {
        status: reqwest::StatusCode,
        url: String,
    },

    // Transport errors
    #[error("Network error: {0}")]
    Network(String),

    #[error("Cache store error: {0}")]
    Cache(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // File system errors
    #[error("Invalid filename: {0}")]
    InvalidFilename(String),

    // IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    // URL parsing errors
    #[error("Invalid URL: {0}")]
    UrlParse(#[from] url::ParseError),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Whether this error is an HTTP 404 from the server.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Status { status, .. } => *status == reqwest::StatusCode::NOT_FOUND,
            Error::NotFound(_) => true,
            _ => false,
        }
    }
}

/// Exit codes returned by the `collector` binary.
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const API_ERROR: i32 = 2;
    pub const CONFIG_ERROR: i32 = 3;
    pub const NETWORK_ERROR: i32 = 4;
    pub const UNEXPECTED_ERROR: i32 = 5;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_detection() {
        let err = Error::Status {
            status: reqwest::StatusCode::NOT_FOUND,
            url: "https://api.fanbox.cc/post.info".into(),
        };
        assert!(err.is_not_found());

        let err = Error::Status {
            status: reqwest::StatusCode::FORBIDDEN,
            url: "https://api.fanbox.cc/post.info".into(),
        };
        assert!(!err.is_not_found());
        assert!(Error::NotFound("creator".into()).is_not_found());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            Error::RetrieveUser {
                credential: "session_id".into()
            }
            .to_string(),
            "Failed to retrieve user information. Maybe the provided session_id is invalid or expired."
        );
        assert_eq!(
            Error::CurrencyMismatch {
                left: "JPY".into(),
                right: "USD".into()
            }
            .to_string(),
            "Cannot operate on prices with different currencies (JPY and USD)"
        );
    }
}
