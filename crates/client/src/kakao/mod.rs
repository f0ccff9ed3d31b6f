//! Kakao Local API client.
//!
//! ### Endpoints
//!
//! - **Address search**: `GET {kakao_search_url}?query=...`
//! - **Coordinate to address**: `GET {kakao_address_url}?x=...&y=...`
//! - **Authentication**: `Authorization: KakaoAK {key}` header.
//!
//! ### Search post-processing
//!
//! - Only documents whose `address_name` ends in 동, 읍 or 면 are kept.
//! - When nothing survives and the query does not already end in 동, the
//!   search is retried once with 동 appended. Retry failures are ignored.
//! - Survivors are deduplicated per [`SearchDedup`].

pub mod error;
pub mod response;

pub use error::KakaoError;
pub use response::{compose_region, dedup, filter_neighborhoods, first_region, is_neighborhood};

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde_json::Value;
use std::sync::Arc;

use wxgate_core::{AppConfig, ConfigError, Setting};

use crate::fetch::{FetchClient, QueryBuilder};

/// Suffix appended on the neighborhood retry.
const NEIGHBORHOOD_SUFFIX: char = '동';

/// Kakao Local API client bound to the loaded configuration.
#[derive(Debug, Clone)]
pub struct KakaoClient {
    fetch: FetchClient,
    config: Arc<AppConfig>,
}

impl KakaoClient {
    pub fn new(fetch: FetchClient, config: Arc<AppConfig>) -> Self {
        Self { fetch, config }
    }

    /// Search addresses for `query`.
    ///
    /// Returns `Ok(None)` when the upstream body has no `documents` array;
    /// such results must not be cached.
    pub async fn search(&self, query: &str) -> Result<Option<Vec<Value>>, KakaoError> {
        let payload = self.search_raw(query).await?;

        let Some(raw) = payload.get("documents").and_then(Value::as_array) else {
            tracing::warn!(query, "kakao search response has no documents");
            return Ok(None);
        };

        let mut documents = filter_neighborhoods(raw);

        if documents.is_empty() && !query.ends_with(NEIGHBORHOOD_SUFFIX) {
            let retry_query = format!("{query}{NEIGHBORHOOD_SUFFIX}");
            match self.search_raw(&retry_query).await {
                Ok(retry) => {
                    if let Some(raw) = retry.get("documents").and_then(Value::as_array)
                        && !raw.is_empty()
                    {
                        documents = filter_neighborhoods(raw);
                    }
                }
                Err(e) => {
                    tracing::debug!(query = %retry_query, error = %e, "neighborhood retry failed");
                }
            }
        }

        Ok(Some(dedup(documents, self.config.search_dedup)))
    }

    /// Resolve `(x, y)` to `"region_1 region_2 region_3"`.
    ///
    /// Returns `Ok(None)` when Kakao knows no address for the point.
    pub async fn coord2address(&self, x: &str, y: &str) -> Result<Option<String>, KakaoError> {
        let payload = self.get_json(Setting::KakaoAddressUrl, &[("x", x), ("y", y)]).await?;
        Ok(first_region(&payload))
    }

    async fn search_raw(&self, query: &str) -> Result<Value, KakaoError> {
        self.get_json(Setting::KakaoSearchUrl, &[("query", query)]).await
    }

    async fn get_json(&self, url_setting: Setting, params: &[(&str, &str)]) -> Result<Value, KakaoError> {
        let key = self.config.require_kakao_api_key()?;
        let base = self.config.require(url_setting)?;

        let url = QueryBuilder::new(base)
            .map_err(|e| ConfigError::Invalid { field: url_setting.name().into(), reason: e.to_string() })?
            .params(params.iter().copied())
            .build();

        let auth = HeaderValue::from_str(&format!("KakaoAK {key}"))
            .map_err(|e| ConfigError::Invalid { field: Setting::KakaoApiKey.name().into(), reason: e.to_string() })?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);

        let response = self
            .fetch
            .fetch_with_headers(&url, headers, self.config.kakao_timeout())
            .await?
            .error_for_status()?;

        if !response.is_json() {
            return Err(KakaoError::NotJson {
                content_type: response.content_type.unwrap_or_else(|| "unknown".to_string()),
            });
        }

        response.json().map_err(|e| KakaoError::Parse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};
    use wxgate_core::SearchDedup;

    fn config_for(server: &MockServer) -> AppConfig {
        AppConfig {
            kakao_search_url: Some(format!("{}/v2/local/search/address.json", server.uri())),
            kakao_address_url: Some(format!("{}/v2/local/geo/coord2address.json", server.uri())),
            kakao_api_key: Some("test-key".into()),
            kakao_timeout_ms: 500,
            ..Default::default()
        }
    }

    fn client(config: AppConfig) -> KakaoClient {
        KakaoClient::new(FetchClient::new(FetchConfig::default()).unwrap(), Arc::new(config))
    }

    fn doc(name: &str, x: &str, y: &str) -> Value {
        json!({ "address_name": name, "x": x, "y": y })
    }

    #[tokio::test]
    async fn test_search_filters_and_dedups() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/local/search/address.json"))
            .and(query_param("query", "역삼"))
            .and(header("authorization", "KakaoAK test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    doc("서울 강남구 역삼동", "127.03", "37.50"),
                    doc("서울 강남구 역삼동 123", "127.05", "37.51"),
                    doc("서울 강남구 역삼1동", "127.03", "37.50"),
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let documents = client(config_for(&server)).search("역삼").await.unwrap().unwrap();

        assert_eq!(documents, vec![doc("서울 강남구 역삼동", "127.03", "37.50")]);
    }

    #[tokio::test]
    async fn test_search_retries_with_dong_suffix() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/local/search/address.json"))
            .and(query_param("query", "청운"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v2/local/search/address.json"))
            .and(query_param("query", "청운동"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({ "documents": [doc("서울 종로구 청운동", "1", "2")] })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let documents = client(config_for(&server)).search("청운").await.unwrap().unwrap();
        assert_eq!(documents.len(), 1);
    }

    #[tokio::test]
    async fn test_search_no_retry_when_query_ends_in_dong() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/local/search/address.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
            .expect(1)
            .mount(&server)
            .await;

        let documents = client(config_for(&server)).search("없는동").await.unwrap().unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_search_retry_failure_is_ignored() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("query", "강남"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [doc("서울 강남구", "1", "1")] })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("query", "강남동"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let documents = client(config_for(&server)).search("강남").await.unwrap().unwrap();
        assert!(documents.is_empty());
    }

    #[tokio::test]
    async fn test_search_region_dedup() {
        let server = MockServer::start().await;
        let address = json!({ "region_1depth_name": "서울", "region_2depth_name": "강남구", "region_3depth_name": "역삼동" });
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [
                    { "address_name": "서울 강남구 역삼동", "x": "1", "y": "1", "address": address },
                    { "address_name": "서울 강남구 역삼동", "x": "2", "y": "2", "address": address },
                ]
            })))
            .mount(&server)
            .await;

        let mut config = config_for(&server);
        config.search_dedup = SearchDedup::Region;

        let documents = client(config).search("역삼동").await.unwrap().unwrap();
        assert_eq!(documents.len(), 1);
        assert_eq!(documents[0]["x"], "1");
    }

    #[tokio::test]
    async fn test_search_without_documents_is_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "meta": {} })))
            .mount(&server)
            .await;

        assert!(client(config_for(&server)).search("강남").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_http_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = client(config_for(&server)).search("강남").await.unwrap_err();
        assert!(matches!(err, KakaoError::HttpError { status: 500, .. }));
        assert_eq!(err.to_string(), "kakao upstream error (500)");
    }

    #[tokio::test]
    async fn test_search_rejects_non_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&server)
            .await;

        let err = client(config_for(&server)).search("강남").await.unwrap_err();
        assert!(matches!(err, KakaoError::NotJson { .. }));
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let server = MockServer::start().await;
        let mut config = config_for(&server);
        config.kakao_api_key = None;

        let err = client(config).search("강남").await.unwrap_err();
        assert!(matches!(err, KakaoError::Config(ConfigError::Missing { .. })));
    }

    #[tokio::test]
    async fn test_coord2address() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2/local/geo/coord2address.json"))
            .and(query_param("x", "126.97"))
            .and(query_param("y", "37.58"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "documents": [{ "address": {
                    "region_1depth_name": "서울", "region_2depth_name": "종로구", "region_3depth_name": "청운동"
                } }]
            })))
            .mount(&server)
            .await;

        let address = client(config_for(&server)).coord2address("126.97", "37.58").await.unwrap();
        assert_eq!(address.as_deref(), Some("서울 종로구 청운동"));
    }

    #[tokio::test]
    async fn test_coord2address_without_documents() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "documents": [] })))
            .mount(&server)
            .await;

        let address = client(config_for(&server)).coord2address("0", "0").await.unwrap();
        assert!(address.is_none());
    }
}
