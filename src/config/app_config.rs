use std::time::Duration;

use serde::Deserialize;

use crate::domain::CacheError;
use crate::infrastructure::cache::{CacheConfig, MIN_RANDOM_BYTES};

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Cache settings as they appear in configuration files
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    pub store_type: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    pub max_capacity: Option<u64>,
    pub time_to_idle_secs: Option<u64>,
    pub namespace_ttl_secs: u64,
    pub token_random_bytes: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            store_type: "in_memory".to_string(),
            redis_url: None,
            key_prefix: None,
            max_capacity: Some(10_000),
            time_to_idle_secs: None,
            namespace_ttl_secs: 0,
            token_random_bytes: MIN_RANDOM_BYTES,
        }
    }
}

impl CacheSettings {
    /// Converts the file representation into a factory configuration
    pub fn to_cache_config(&self) -> Result<CacheConfig, CacheError> {
        Ok(CacheConfig {
            store_type: self.store_type.parse()?,
            redis_url: self.redis_url.clone(),
            key_prefix: self.key_prefix.clone(),
            max_capacity: self.max_capacity,
            time_to_idle: self.time_to_idle_secs.map(Duration::from_secs),
            namespace_ttl: Duration::from_secs(self.namespace_ttl_secs),
            token_random_bytes: self.token_random_bytes,
        })
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl AppConfig {
    /// Loads `config/default`, `config/local` and `APP__*` environment variables
    pub fn load() -> Result<Self, config::ConfigError> {
        dotenvy::dotenv().ok();
        Self::load_with(Self::environment())
    }

    /// Environment source: `APP__CACHE__STORE_TYPE` maps to `cache.store_type`
    pub fn environment() -> config::Environment {
        config::Environment::with_prefix("APP")
            .separator("__")
            .try_parsing(true)
    }

    /// Layers the config files under the given environment source
    pub fn load_with(environment: config::Environment) -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(environment)
            .build()?;

        config.try_deserialize()
    }
}
