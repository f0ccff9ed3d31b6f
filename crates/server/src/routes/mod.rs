//! HTTP routes exposed by the wxgate server.
//!
//! | Route | Handler |
//! |---|---|
//! | `GET /api/kakao/search` | [`kakao::search`] |
//! | `GET /api/kakao/coord2address` | [`kakao::coord2address`] |
//! | `GET /api/weather/short` | [`weather::short`] |
//! | `GET /api/weather/mid/ta` | [`weather::mid_ta`] |
//! | `GET /api/weather/mid/land` | [`weather::mid_land`] |
//! | `POST /api/weather/batch` | [`batch::batch`] |
//! | `GET /api/cache`, `DELETE /api/cache` | [`cache::stats`], [`cache::purge`] |
//! | `GET /health` | [`health::health`] |

pub mod batch;
pub mod cache;
pub mod health;
pub mod kakao;
pub mod weather;

use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/kakao/search", get(kakao::search))
        .route("/api/kakao/coord2address", get(kakao::coord2address))
        .route("/api/weather/short", get(weather::short))
        .route("/api/weather/mid/ta", get(weather::mid_ta))
        .route("/api/weather/mid/land", get(weather::mid_land))
        .route("/api/weather/batch", post(batch::batch))
        .route("/api/cache", get(cache::stats).delete(cache::purge))
        .route("/health", get(health::health))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use wiremock::MockServer;
    use wxgate_core::AppConfig;

    use crate::state::AppState;

    /// Config with every upstream pointed at `server`.
    pub fn config_for(server: &MockServer) -> AppConfig {
        let uri = server.uri();
        AppConfig {
            weather_hub_url: Some(format!("{uri}/hub/short")),
            weather_hub_key: Some("hub-key".into()),
            weather_public_url: Some(format!("{uri}/public/short")),
            weather_public_key: Some("public-key".into()),
            mid_ta_hub_url: Some(format!("{uri}/hub/ta")),
            mid_land_hub_url: Some(format!("{uri}/hub/land")),
            mid_ta_public_url: Some(format!("{uri}/public/ta")),
            mid_land_public_url: Some(format!("{uri}/public/land")),
            mid_public_key: Some("mid-key".into()),
            kakao_search_url: Some(format!("{uri}/kakao/search")),
            kakao_address_url: Some(format!("{uri}/kakao/coord2address")),
            kakao_api_key: Some("kakao-key".into()),
            primary_timeout_ms: 300,
            secondary_timeout_ms: 500,
            fallback_timeout_ms: 1000,
            single_timeout_ms: 500,
            kakao_timeout_ms: 500,
            ..Default::default()
        }
    }

    /// Send one request through a fresh router over `state`.
    pub async fn send(state: &AppState, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let request = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => request
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = super::router(state.clone()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };

        (status, json)
    }

    pub async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
        send(state, Method::GET, uri, None).await
    }
}
