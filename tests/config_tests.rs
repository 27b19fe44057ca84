//! Tests for configuration loading from the environment.

use std::sync::{Mutex, OnceLock};

use medchat::config::{MedchatConfig, API_KEY_ENV, DEFAULT_USER_CONTEXT, ENDPOINT_ENV};
use medchat::error::MedchatError;

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

const CONFIG_ENV_VARS: [&str; 2] = [ENDPOINT_ENV, API_KEY_ENV];

struct EnvGuard {
    saved: Vec<(String, Option<String>)>,
}

impl EnvGuard {
    fn capture(keys: &[&str]) -> Self {
        let saved = keys
            .iter()
            .map(|key| ((*key).to_string(), std::env::var(key).ok()))
            .collect();
        Self { saved }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.saved {
            match value {
                Some(v) => std::env::set_var(key, v),
                None => std::env::remove_var(key),
            }
        }
    }
}

fn env_lock_guard() -> std::sync::MutexGuard<'static, ()> {
    ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[test]
fn config_from_env_reads_endpoint_and_key() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    std::env::set_var(ENDPOINT_ENV, "https://cloud.example.test/v1/indexes/health");
    std::env::set_var(API_KEY_ENV, "test-key");

    let config = MedchatConfig::from_env();

    assert_eq!(
        config.endpoint(),
        Some("https://cloud.example.test/v1/indexes/health")
    );
    assert_eq!(config.api_key(), Some("test-key"));
    assert_eq!(config.user_context(), DEFAULT_USER_CONTEXT);
    assert!(config.validate().is_ok());
}

#[test]
fn config_from_env_ignores_blank_values() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    std::env::set_var(ENDPOINT_ENV, "   ");
    std::env::set_var(API_KEY_ENV, "");

    let config = MedchatConfig::from_env();

    assert_eq!(config.endpoint(), None);
    assert_eq!(config.api_key(), None);
}

#[test]
fn config_missing_env_fails_validation() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    std::env::remove_var(ENDPOINT_ENV);
    std::env::remove_var(API_KEY_ENV);

    let err = MedchatConfig::from_env().validate().unwrap_err();

    assert!(matches!(err, MedchatError::Configuration(_)));
    assert!(err.to_string().contains(ENDPOINT_ENV));
}

#[test]
fn config_explicit_setters_override_env() {
    let _lock = env_lock_guard();
    let _guard = EnvGuard::capture(&CONFIG_ENV_VARS);
    std::env::set_var(ENDPOINT_ENV, "https://env.example.test");
    std::env::set_var(API_KEY_ENV, "env-key");

    let config = MedchatConfig::from_env()
        .with_endpoint("http://localhost:8080")
        .with_api_key("flag-key");

    let credentials = config.validate().unwrap();
    assert_eq!(credentials.endpoint.as_str(), "http://localhost:8080/");
    assert_eq!(credentials.api_key, "flag-key");
}

#[test]
fn config_debug_hides_api_key() {
    let config = MedchatConfig::new()
        .with_endpoint("https://cloud.example.test")
        .with_api_key("super-secret");

    let rendered = format!("{config:?}");
    assert!(!rendered.contains("super-secret"));
    assert!(rendered.contains("cloud.example.test"));
}
