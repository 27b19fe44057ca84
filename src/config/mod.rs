//! Configuration (layered: explicit setters > env > `.env` file).

use std::fmt;

use crate::error::{MedchatError, Result};
use crate::types::InferenceType;

/// Environment variable holding the hosted service endpoint.
pub const ENDPOINT_ENV: &str = "ORAMA_API_URL";
/// Environment variable holding the hosted service API key.
pub const API_KEY_ENV: &str = "ORAMA_API_KEY";

/// User context every answer session is created with.
pub const DEFAULT_USER_CONTEXT: &str =
    "The user is a patient and wants to understand what disease they may have.";

/// Client configuration.
///
/// Endpoint and API key stay optional until [`MedchatConfig::validate`]
/// turns a missing value into a fatal configuration error.
#[derive(Clone)]
pub struct MedchatConfig {
    endpoint: Option<String>,
    api_key: Option<String>,
    user_context: String,
    inference_type: InferenceType,
}

impl fmt::Debug for MedchatConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MedchatConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &self.api_key.as_ref().map(|_| ".."))
            .field("user_context", &self.user_context)
            .field("inference_type", &self.inference_type)
            .finish()
    }
}

impl Default for MedchatConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Connection settings that passed validation.
#[derive(Clone)]
pub struct ServiceCredentials {
    pub endpoint: reqwest::Url,
    pub api_key: String,
}

impl fmt::Debug for ServiceCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceCredentials")
            .field("endpoint", &self.endpoint.as_str())
            .field("api_key", &"..")
            .finish()
    }
}

impl MedchatConfig {
    /// Empty config with the default user context and inference mode.
    pub fn new() -> Self {
        Self {
            endpoint: None,
            api_key: None,
            user_context: DEFAULT_USER_CONTEXT.to_string(),
            inference_type: InferenceType::Documentation,
        }
    }

    /// Load from environment variables (`ORAMA_API_URL`, `ORAMA_API_KEY`).
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // load .env if present, ignore error
        let mut config = Self::new();
        if let Some(url) = non_empty_env(ENDPOINT_ENV) {
            config.endpoint = Some(url);
        }
        if let Some(key) = non_empty_env(API_KEY_ENV) {
            config.api_key = Some(key);
        }
        config
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_user_context(mut self, user_context: impl Into<String>) -> Self {
        self.user_context = user_context.into();
        self
    }

    pub fn with_inference_type(mut self, inference_type: InferenceType) -> Self {
        self.inference_type = inference_type;
        self
    }

    pub fn endpoint(&self) -> Option<&str> {
        self.endpoint.as_deref()
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn user_context(&self) -> &str {
        &self.user_context
    }

    pub fn inference_type(&self) -> InferenceType {
        self.inference_type
    }

    /// Check that both endpoint and API key are present and usable.
    pub fn validate(&self) -> Result<ServiceCredentials> {
        let raw = self.endpoint.as_deref().map(str::trim).unwrap_or_default();
        if raw.is_empty() {
            return Err(MedchatError::Configuration(format!(
                "Missing {ENDPOINT_ENV}. Set it in the environment or a .env file"
            )));
        }
        let api_key = self.api_key.as_deref().map(str::trim).unwrap_or_default();
        if api_key.is_empty() {
            return Err(MedchatError::Configuration(format!(
                "Missing {API_KEY_ENV}. Set it in the environment or a .env file"
            )));
        }

        let endpoint = reqwest::Url::parse(raw.trim_end_matches('/')).map_err(|e| {
            MedchatError::Configuration(format!("Invalid {ENDPOINT_ENV} '{raw}': {e}"))
        })?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            return Err(MedchatError::Configuration(format!(
                "Invalid {ENDPOINT_ENV} '{raw}': expected an http(s) URL"
            )));
        }

        Ok(ServiceCredentials {
            endpoint,
            api_key: api_key.to_string(),
        })
    }
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
