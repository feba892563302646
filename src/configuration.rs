use config::{Config, Environment, File, FileFormat};
use derive_getters::Getters;
use serde_aux::field_attributes::deserialize_number_from_string;
use std::time::Duration;
use url::Url;

/// Retrive the configuration for the application.
///
/// Values from `configuration.yaml` can be overridden with environment
/// variables prefixed with `APP_`, e.g. `APP_NEWSLETTER__API_ENDPOINT`.
pub fn get_configuration() -> Result<Settings, config::ConfigError> {
    Config::builder()
        .set_default("newsletter.subscriber_count", DEFAULT_SUBSCRIBER_COUNT)?
        .set_default(
            "application.session_idle_timeout_seconds",
            DEFAULT_SESSION_IDLE_TIMEOUT_SECONDS,
        )?
        .add_source(File::new("configuration.yaml", FileFormat::Yaml).required(false))
        .add_source(
            Environment::with_prefix("APP")
                .prefix_separator("_")
                .separator("__"),
        )
        .build()?
        .try_deserialize()
}

const DEFAULT_SUBSCRIBER_COUNT: i64 = 2847;
const DEFAULT_SESSION_IDLE_TIMEOUT_SECONDS: i64 = 30 * 60;

#[derive(Debug, Clone, serde::Deserialize, Getters)]
pub struct Settings {
    pub application: ApplicationSettings,
    pub newsletter: NewsletterSettings,
}

#[derive(Debug, Clone, serde::Deserialize, Getters)]
pub struct ApplicationSettings {
    pub host: String,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub port: u16,
    /// Forms of visitors idle for longer than this are dropped.
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub session_idle_timeout_seconds: u64,
}

impl ApplicationSettings {
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn session_idle_timeout(&self) -> Duration {
        Duration::from_secs(self.session_idle_timeout_seconds)
    }
}

#[derive(Debug, Clone, serde::Deserialize, Getters)]
pub struct NewsletterSettings {
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(deserialize_with = "deserialize_number_from_string")]
    pub subscriber_count: u64,
}

impl NewsletterSettings {
    /// The endpoint subscriptions are posted to. A missing or blank value
    /// means the endpoint is not configured.
    pub fn endpoint(&self) -> Result<Option<Url>, url::ParseError> {
        match self.api_endpoint.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) => Url::parse(raw).map(Some),
        }
    }
}
