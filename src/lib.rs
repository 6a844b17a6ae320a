//! Birthcare facility administration toolkit core library
//!
//! This module exports the data layer of the birthcare admin toolkit:
//! an API client for the remote facility service, canonical patient and
//! billing models, the admitted-patients resolver with its fallback
//! chain, and the billing aggregator.

pub mod api;
pub mod billing;
pub mod error;
pub mod models;
pub mod poll;
pub mod resolver;

pub use error::Error;

/// Application configuration
pub mod config {
    use serde::Deserialize;

    #[derive(Debug, Clone, Deserialize, Default)]
    pub struct Settings {
        #[serde(default)]
        pub api: ApiSettings,
        #[serde(default)]
        pub poll: PollSettings,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ApiSettings {
        #[serde(default = "default_base_url")]
        pub base_url: String,
        #[serde(default)]
        pub token: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct PollSettings {
        #[serde(default = "default_interval_secs")]
        pub interval_secs: u64,
    }

    impl Default for ApiSettings {
        fn default() -> Self {
            Self {
                base_url: default_base_url(),
                token: None,
            }
        }
    }

    impl Default for PollSettings {
        fn default() -> Self {
            Self {
                interval_secs: default_interval_secs(),
            }
        }
    }

    fn default_base_url() -> String {
        "http://localhost:8000".to_string()
    }

    fn default_interval_secs() -> u64 {
        30
    }

    /// Load configuration from `config/default.toml`, an optional
    /// environment-specific file, and `BIRTHCARE_*` environment variables.
    pub fn load_settings() -> Result<Settings, config::ConfigError> {
        let env = std::env::var("BIRTHCARE_ENV").unwrap_or_else(|_| "development".into());

        let settings = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false))
            .add_source(config::Environment::with_prefix("BIRTHCARE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }

}
