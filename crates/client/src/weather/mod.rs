//! Weather forecast client for the KMA API hub and public data portal.
//!
//! ### Sources
//! - **Hub** (`authKey`): fast, privileged, less consistently available.
//! - **Public** (`serviceKey`): authoritative, sometimes slower.
//!
//! In `single` mode only the hub is called. In `race` mode both are raced
//! through [`RaceCoordinator`] with the public portal as the fallback.
//!
//! ### Validation
//! - Hub payloads pass when `response.header.resultCode == "00"` or a
//!   `response.body` is present.
//! - Public payloads must be served as JSON and carry `resultCode == "00"`.

pub mod request;

pub use request::{DEFAULT_NUM_OF_ROWS, ForecastKind, ForecastRequest};

use serde_json::Value;
use std::sync::Arc;
use url::Url;

use wxgate_core::{AppConfig, ConfigError, Error, Setting, SourceMode};

use crate::fetch::{FetchResponse, QueryBuilder, decode_credential};
use crate::race::{Branch, RaceCoordinator, RaceResult, Source, UpstreamRequestSpec, Validator};

/// Success sentinel in `response.header.resultCode`.
const RESULT_CODE_OK: &str = "00";

fn result_code_ok(payload: &Value) -> bool {
    payload.pointer("/response/header/resultCode").and_then(Value::as_str) == Some(RESULT_CODE_OK)
}

/// Acceptance check for API hub payloads.
pub fn hub_validator() -> Validator {
    Arc::new(|_: &FetchResponse, payload: &Value| {
        result_code_ok(payload) || payload.pointer("/response/body").is_some()
    })
}

/// Acceptance check for public portal payloads.
pub fn public_validator() -> Validator {
    Arc::new(|response: &FetchResponse, payload: &Value| response.is_json() && result_code_ok(payload))
}

/// Forecast client bound to the loaded configuration.
#[derive(Debug, Clone)]
pub struct WeatherClient {
    coordinator: RaceCoordinator,
    config: Arc<AppConfig>,
}

impl WeatherClient {
    pub fn new(coordinator: RaceCoordinator, config: Arc<AppConfig>) -> Self {
        Self { coordinator, config }
    }

    /// Fetch a forecast according to the configured source mode.
    pub async fn forecast(&self, req: &ForecastRequest) -> Result<RaceResult, Error> {
        match self.config.source_mode {
            SourceMode::Single => {
                let url = self.hub_url(req)?;
                let payload = self.coordinator.fetch_single(&url, self.config.single_timeout()).await?;
                Ok(RaceResult { source: Source::Primary, payload })
            }
            SourceMode::Race => {
                let spec = UpstreamRequestSpec {
                    primary: Branch::new(self.hub_url(req)?, self.config.primary_timeout(), hub_validator()),
                    secondary: Some(Branch::new(
                        self.public_url(req)?,
                        self.config.secondary_timeout(),
                        public_validator(),
                    )),
                    fallback_timeout: self.config.fallback_timeout(),
                };
                Ok(self.coordinator.resolve(spec).await?)
            }
        }
    }

    /// API hub URL for `req`.
    pub fn hub_url(&self, req: &ForecastRequest) -> Result<Url, Error> {
        let base_setting = match req.kind() {
            ForecastKind::Short => Setting::WeatherHubUrl,
            ForecastKind::MidTa => Setting::MidTaHubUrl,
            ForecastKind::MidLand => Setting::MidLandHubUrl,
        };
        let base = self.config.require(base_setting)?;
        let key = decode_credential(self.config.require(Setting::WeatherHubKey)?);

        let builder = builder(base_setting, base)?.param("authKey", key).param("dataType", "JSON");

        let builder = match req.kind() {
            ForecastKind::Short => with_grid_params(builder, req),
            ForecastKind::MidTa | ForecastKind::MidLand => {
                builder.param("regId", req.get("regId")).param("tmFc", req.get("tmFc"))
            }
        };

        Ok(builder.build())
    }

    /// Public data portal URL for `req`.
    pub fn public_url(&self, req: &ForecastRequest) -> Result<Url, Error> {
        let (base_setting, key_setting) = match req.kind() {
            ForecastKind::Short => (Setting::WeatherPublicUrl, Setting::WeatherPublicKey),
            ForecastKind::MidTa => (Setting::MidTaPublicUrl, Setting::MidPublicKey),
            ForecastKind::MidLand => (Setting::MidLandPublicUrl, Setting::MidPublicKey),
        };
        let base = self.config.require(base_setting)?;
        let key = decode_credential(self.config.require(key_setting)?);

        let builder = builder(base_setting, base)?.param("serviceKey", key);

        let builder = match req.kind() {
            ForecastKind::Short => with_grid_params(builder.param("dataType", "JSON"), req),
            ForecastKind::MidTa | ForecastKind::MidLand => builder
                .param("numOfRows", "10")
                .param("pageNo", "1")
                .param("regId", req.get("regId"))
                .param("tmFc", req.get("tmFc"))
                .param("dataType", "JSON"),
        };

        Ok(builder.build())
    }
}

fn builder(setting: Setting, base: &str) -> Result<QueryBuilder, Error> {
    QueryBuilder::new(base)
        .map_err(|e| Error::Configuration(ConfigError::Invalid { field: setting.name().into(), reason: e.to_string() }))
}

fn with_grid_params(builder: QueryBuilder, req: &ForecastRequest) -> QueryBuilder {
    builder
        .param("numOfRows", req.get("numOfRows"))
        .param("pageNo", "1")
        .param("base_date", req.get("baseDate"))
        .param("base_time", req.get("baseTime"))
        .param("nx", req.get("nx"))
        .param("ny", req.get("ny"))
}
