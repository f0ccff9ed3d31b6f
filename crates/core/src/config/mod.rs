//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (WXGATE_*)
//! 2. TOML config file (if WXGATE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// How weather forecasts are fetched from upstream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceMode {
    /// Hub API only, single bounded call.
    #[default]
    Single,
    /// Hub and public API raced, with a public fallback.
    Race,
}

/// How address search results are de-duplicated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchDedup {
    /// First document per (x, y) pair, upstream order kept.
    #[default]
    Coordinates,
    /// First document per province/city/district string, sorted by it.
    Region,
}

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (WXGATE_*)
/// 2. TOML config file (if WXGATE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Bind address for the HTTP listener.
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (WXGATE_PORT).
    #[serde(default = "default_port")]
    pub port: u16,

    /// Weather fetch strategy: "single" (hub only) or "race".
    #[serde(default)]
    pub source_mode: SourceMode,

    /// Short-range forecast endpoint on the API hub.
    #[serde(default)]
    pub weather_hub_url: Option<String>,

    /// API hub `authKey`, shared by all hub forecast endpoints.
    #[serde(default)]
    pub weather_hub_key: Option<String>,

    /// Short-range forecast endpoint on the public data portal.
    #[serde(default)]
    pub weather_public_url: Option<String>,

    /// Public data portal `serviceKey` for the short-range endpoint.
    #[serde(default)]
    pub weather_public_key: Option<String>,

    #[serde(default)]
    pub mid_ta_hub_url: Option<String>,

    #[serde(default)]
    pub mid_land_hub_url: Option<String>,

    #[serde(default)]
    pub mid_ta_public_url: Option<String>,

    #[serde(default)]
    pub mid_land_public_url: Option<String>,

    /// Public data portal `serviceKey` for the mid-range endpoints.
    #[serde(default)]
    pub mid_public_key: Option<String>,

    /// Kakao keyword/address search endpoint.
    #[serde(default)]
    pub kakao_search_url: Option<String>,

    /// Kakao coord2address endpoint.
    #[serde(default)]
    pub kakao_address_url: Option<String>,

    /// Kakao REST API key (sent as `KakaoAK <key>`).
    #[serde(default)]
    pub kakao_api_key: Option<String>,

    /// Maximum age of a cached response, in seconds.
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Interval between background sweeps, in seconds.
    #[serde(default = "default_cache_sweep_interval_secs")]
    pub cache_sweep_interval_secs: u64,

    /// Optional cap applied after each sweep.
    #[serde(default)]
    pub cache_max_entries: Option<usize>,

    #[serde(default = "default_primary_timeout_ms")]
    pub primary_timeout_ms: u64,

    #[serde(default = "default_secondary_timeout_ms")]
    pub secondary_timeout_ms: u64,

    #[serde(default = "default_fallback_timeout_ms")]
    pub fallback_timeout_ms: u64,

    /// Deadline for the hub call in single-source mode.
    #[serde(default = "default_single_timeout_ms")]
    pub single_timeout_ms: u64,

    #[serde(default = "default_kakao_timeout_ms")]
    pub kakao_timeout_ms: u64,

    /// Minimum trimmed query length, in characters, for address search.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    #[serde(default)]
    pub search_dedup: SearchDedup,

    /// User-Agent string for upstream requests.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_host() -> String {
    "0.0.0.0".into()
}

fn default_port() -> u16 {
    4000
}

fn default_cache_ttl_secs() -> u64 {
    5 * 60
}

fn default_cache_sweep_interval_secs() -> u64 {
    10 * 60
}

fn default_primary_timeout_ms() -> u64 {
    3_000
}

fn default_secondary_timeout_ms() -> u64 {
    5_000
}

fn default_fallback_timeout_ms() -> u64 {
    10_000
}

fn default_single_timeout_ms() -> u64 {
    5_000
}

fn default_kakao_timeout_ms() -> u64 {
    5_000
}

fn default_min_query_chars() -> usize {
    2
}

fn default_user_agent() -> String {
    "wxgate/0.1".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            source_mode: SourceMode::default(),
            weather_hub_url: None,
            weather_hub_key: None,
            weather_public_url: None,
            weather_public_key: None,
            mid_ta_hub_url: None,
            mid_land_hub_url: None,
            mid_ta_public_url: None,
            mid_land_public_url: None,
            mid_public_key: None,
            kakao_search_url: None,
            kakao_address_url: None,
            kakao_api_key: None,
            cache_ttl_secs: default_cache_ttl_secs(),
            cache_sweep_interval_secs: default_cache_sweep_interval_secs(),
            cache_max_entries: None,
            primary_timeout_ms: default_primary_timeout_ms(),
            secondary_timeout_ms: default_secondary_timeout_ms(),
            fallback_timeout_ms: default_fallback_timeout_ms(),
            single_timeout_ms: default_single_timeout_ms(),
            kakao_timeout_ms: default_kakao_timeout_ms(),
            min_query_chars: default_min_query_chars(),
            search_dedup: SearchDedup::default(),
            user_agent: default_user_agent(),
        }
    }
}

impl AppConfig {
    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `WXGATE_`
    /// 2. TOML file from `WXGATE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("WXGATE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("WXGATE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn cache_sweep_interval(&self) -> Duration {
        Duration::from_secs(self.cache_sweep_interval_secs)
    }

    pub fn primary_timeout(&self) -> Duration {
        Duration::from_millis(self.primary_timeout_ms)
    }

    pub fn secondary_timeout(&self) -> Duration {
        Duration::from_millis(self.secondary_timeout_ms)
    }

    pub fn fallback_timeout(&self) -> Duration {
        Duration::from_millis(self.fallback_timeout_ms)
    }

    pub fn single_timeout(&self) -> Duration {
        Duration::from_millis(self.single_timeout_ms)
    }

    pub fn kakao_timeout(&self) -> Duration {
        Duration::from_millis(self.kakao_timeout_ms)
    }

    /// Check if the Kakao API key is available (for deferred validation).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Missing` if the key is not set.
    pub fn require_kakao_api_key(&self) -> Result<&str, ConfigError> {
        self.require(Setting::KakaoApiKey)
    }

    /// Return a required upstream URL or credential.
    ///
    /// Used by the clients so that every missing credential or upstream URL
    /// reports the same way regardless of which endpoint needed it.
    pub fn require(&self, setting: Setting) -> Result<&str, ConfigError> {
        let value = match setting {
            Setting::WeatherHubUrl => &self.weather_hub_url,
            Setting::WeatherHubKey => &self.weather_hub_key,
            Setting::WeatherPublicUrl => &self.weather_public_url,
            Setting::WeatherPublicKey => &self.weather_public_key,
            Setting::MidTaHubUrl => &self.mid_ta_hub_url,
            Setting::MidLandHubUrl => &self.mid_land_hub_url,
            Setting::MidTaPublicUrl => &self.mid_ta_public_url,
            Setting::MidLandPublicUrl => &self.mid_land_public_url,
            Setting::MidPublicKey => &self.mid_public_key,
            Setting::KakaoSearchUrl => &self.kakao_search_url,
            Setting::KakaoAddressUrl => &self.kakao_address_url,
            Setting::KakaoApiKey => &self.kakao_api_key,
        };

        match value.as_deref() {
            Some(v) if !v.trim().is_empty() => Ok(v),
            _ => Err(ConfigError::Missing {
                field: setting.name().into(),
                hint: format!("Set WXGATE_{} environment variable", setting.name().to_uppercase()),
            }),
        }
    }
}

/// Optional settings that individual endpoints need at request time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Setting {
    WeatherHubUrl,
    WeatherHubKey,
    WeatherPublicUrl,
    WeatherPublicKey,
    MidTaHubUrl,
    MidLandHubUrl,
    MidTaPublicUrl,
    MidLandPublicUrl,
    MidPublicKey,
    KakaoSearchUrl,
    KakaoAddressUrl,
    KakaoApiKey,
}

impl Setting {
    /// Field name in `AppConfig`, and the env var suffix.
    pub fn name(self) -> &'static str {
        match self {
            Setting::WeatherHubUrl => "weather_hub_url",
            Setting::WeatherHubKey => "weather_hub_key",
            Setting::WeatherPublicUrl => "weather_public_url",
            Setting::WeatherPublicKey => "weather_public_key",
            Setting::MidTaHubUrl => "mid_ta_hub_url",
            Setting::MidLandHubUrl => "mid_land_hub_url",
            Setting::MidTaPublicUrl => "mid_ta_public_url",
            Setting::MidLandPublicUrl => "mid_land_public_url",
            Setting::MidPublicKey => "mid_public_key",
            Setting::KakaoSearchUrl => "kakao_search_url",
            Setting::KakaoAddressUrl => "kakao_address_url",
            Setting::KakaoApiKey => "kakao_api_key",
        }
    }
}
