//! Error types for medchat.

use thiserror::Error;

/// Primary error type for all medchat operations.
#[derive(Error, Debug)]
pub enum MedchatError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("API error (status {status}): {message}")]
    Api {
        status: u16,
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Authentication error: {0}")]
    Authentication(String),

    #[error("Rate limited: retry after {retry_after_ms:?}ms")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Stream error: {0}")]
    Stream(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Broad error category, used to pick the wording shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Authentication,
    RateLimit,
    Network,
    Server,
    Api,
    Configuration,
    Serialization,
    Unknown,
}

impl MedchatError {
    /// Create an API error without an underlying source.
    pub fn api(status: u16, message: impl Into<String>) -> Self {
        Self::Api {
            status,
            message: message.into(),
            source: None,
        }
    }

    /// Classify this error into a category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::Authentication(_) => ErrorCategory::Authentication,
            Self::RateLimited { .. } => ErrorCategory::RateLimit,
            Self::Network(_) | Self::Io(_) | Self::Stream(_) => ErrorCategory::Network,
            Self::Configuration(_) => ErrorCategory::Configuration,
            Self::Serialization(_) => ErrorCategory::Serialization,
            Self::Api { status, .. } => match status {
                401 | 403 => ErrorCategory::Authentication,
                429 => ErrorCategory::RateLimit,
                500..=599 => ErrorCategory::Server,
                _ => ErrorCategory::Api,
            },
            Self::InvalidArgument(_) => ErrorCategory::Unknown,
        }
    }

    /// Short text for the error banner in the chat view.
    pub fn user_message(&self) -> String {
        let headline = match self.category() {
            ErrorCategory::Authentication => "The answer service rejected the API key.",
            ErrorCategory::RateLimit => "The answer service is rate limiting requests.",
            ErrorCategory::Network => "Could not reach the answer service.",
            ErrorCategory::Server => "The answer service failed to respond.",
            ErrorCategory::Configuration => "The client is misconfigured.",
            ErrorCategory::Serialization => "The answer service sent an unreadable reply.",
            ErrorCategory::Api | ErrorCategory::Unknown => "Your question could not be answered.",
        };
        format!("{headline} ({self})")
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, MedchatError>;
