//! Shared state handed to every route handler.

use std::sync::Arc;

use wxgate_client::{FetchClient, FetchConfig, KakaoClient, RaceCoordinator, WeatherClient};
use wxgate_core::{AppConfig, Error, ResponseCache};

/// Cheaply clonable handle to the configuration, cache and upstream clients.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub cache: Arc<ResponseCache>,
    pub weather: WeatherClient,
    pub kakao: KakaoClient,
}

impl AppState {
    /// Build the state with a cache sized from `config`.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let cache = Arc::new(ResponseCache::from_config(&config));
        Self::with_cache(config, cache)
    }

    pub fn with_cache(config: AppConfig, cache: Arc<ResponseCache>) -> Result<Self, Error> {
        let config = Arc::new(config);
        let fetch = FetchClient::new(FetchConfig { user_agent: config.user_agent.clone(), ..Default::default() })?;

        Ok(Self {
            weather: WeatherClient::new(RaceCoordinator::new(fetch.clone()), config.clone()),
            kakao: KakaoClient::new(fetch, config.clone()),
            cache,
            config,
        })
    }
}
