//! Upstream clients for wxgate.
//!
//! This crate provides the deadline-bounded fetch pipeline, the hub/public
//! source race, and the weather and Kakao Local clients used by the server.

pub mod fetch;
pub mod kakao;
pub mod race;
pub mod weather;

pub use fetch::{FetchClient, FetchConfig, FetchError, FetchResponse, QueryBuilder};
pub use kakao::{KakaoClient, KakaoError};
pub use race::{Branch, RaceCoordinator, RaceError, RaceResult, Source, UpstreamRequestSpec, Validator};
pub use weather::{ForecastKind, ForecastRequest, WeatherClient};
