//! HTTP client for the deduplication service API

use crate::source::DashboardSource;
use async_trait::async_trait;
use eventdedup_core::{
    DashboardConfig, Error, EventDetail, EventListPayload, PageQuery, Result, StatsPayload,
};
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, error};

/// Statistics endpoint
pub const STATS_PATH: &str = "/api/events/stats";

/// Event list endpoint
pub const EVENTS_PATH: &str = "/api/events/events";

/// API client for the deduplication service
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client without a request timeout
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: normalize_base_url(base_url.into()),
        }
    }

    /// Create a client from the dashboard configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn from_config(config: &DashboardConfig) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(|e| Error::Configuration {
            message: format!("Failed to build HTTP client: {e}"),
        })?;

        Ok(Self {
            client,
            base_url: normalize_base_url(config.api_base_url.clone()),
        })
    }

    /// Base URL every path is joined to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for an API path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// GET `path` and decode the JSON body
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] when no response arrives, [`Error::Status`] for a
    /// non-success status and [`Error::Decode`] when the body is not the expected JSON.
    pub async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = self.url(path);
        debug!(%url, "Fetching");

        let response = self.client.get(&url).send().await.map_err(|e| Error::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Status {
                url,
                status: status.as_u16(),
            });
        }

        let body = response.bytes().await.map_err(|e| Error::Http {
            url: url.clone(),
            message: e.to_string(),
        })?;

        serde_json::from_slice(&body).map_err(|e| Error::Decode {
            url,
            message: e.to_string(),
        })
    }

    /// GET `path`, logging any failure and collapsing it to `None`
    pub async fn fetch_data<T: DeserializeOwned>(&self, path: &str) -> Option<T> {
        match self.fetch_json(path).await {
            Ok(data) => Some(data),
            Err(e) => {
                error!(error = %e, path, "Failed to fetch data");
                None
            }
        }
    }

    /// Current service statistics
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_stats(&self) -> Result<StatsPayload> {
        self.fetch_json(STATS_PATH).await
    }

    /// One page of stored events
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_events(&self, query: PageQuery) -> Result<EventListPayload> {
        self.fetch_json(&events_path(query)).await
    }

    /// A single event by its deduplication hash
    ///
    /// # Errors
    ///
    /// Returns [`Error::Status`] with 404 when the hash is unknown, or any other
    /// fetch error.
    pub async fn get_event_detail(&self, event_hash: &str) -> Result<EventDetail> {
        let path = format!("{EVENTS_PATH}/{}", urlencoding::encode(event_hash));
        self.fetch_json(&path).await
    }
}

#[async_trait]
impl DashboardSource for ApiClient {
    async fn stats(&self) -> Option<StatsPayload> {
        self.fetch_data(STATS_PATH).await
    }

    async fn events(&self, query: PageQuery) -> Option<EventListPayload> {
        self.fetch_data(&events_path(query)).await
    }
}

/// Event list path with its query string
#[must_use]
pub fn events_path(query: PageQuery) -> String {
    format!("{EVENTS_PATH}?{}", query.to_query_string())
}

fn normalize_base_url(mut base_url: String) -> String {
    while base_url.ends_with('/') {
        base_url.pop();
    }
    base_url
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::num::NonZeroU32;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn stats_body() -> serde_json::Value {
        json!({
            "service": "kion-deduplicator",
            "redis": {"dedup_keys_count": 3, "shard_count": 1},
            "postgres": {"total_events": 9, "shard_count": 2, "shards": {"shard_0": 4, "shard_1": 5}},
            "timestamp": "2024-05-01T10:00:00"
        })
    }

    #[test]
    fn test_url_joining() {
        let client = ApiClient::new("http://backend:8000///");
        assert_eq!(client.base_url(), "http://backend:8000");
        assert_eq!(client.url(STATS_PATH), "http://backend:8000/api/events/stats");

        let query = PageQuery::new(NonZeroU32::new(20).unwrap(), 40);
        assert_eq!(events_path(query), "/api/events/events?limit=20&offset=40");
    }

    #[tokio::test]
    async fn test_get_stats_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(STATS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(stats_body()))
            .mount(&server)
            .await;

        let stats = ApiClient::new(server.uri()).get_stats().await.unwrap();

        assert_eq!(stats.postgres.total_events, 9);
        assert_eq!(stats.redis.dedup_keys_count, 3);
    }

    #[tokio::test]
    async fn test_non_success_status_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(STATS_PATH))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let err = client.get_stats().await.unwrap_err();

        assert!(matches!(err, Error::Status { status: 500, .. }));
        assert!(client.stats().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(STATS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let err = ApiClient::new(server.uri()).get_stats().await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
    }

    #[tokio::test]
    async fn test_unreachable_backend_is_http_error() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        // Listener is dropped here, so nothing accepts on `port`.
        let err = ApiClient::new(format!("http://127.0.0.1:{port}"))
            .get_stats()
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http { .. }));
        assert!(err.is_fetch_failure());
    }

    #[tokio::test]
    async fn test_events_query_parameters() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(EVENTS_PATH))
            .and(query_param("limit", "20"))
            .and(query_param("offset", "40"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "total": 95, "limit": 20, "offset": 40, "data": []
            })))
            .expect(1)
            .mount(&server)
            .await;

        let query = PageQuery::new(NonZeroU32::new(20).unwrap(), 40);
        let events = ApiClient::new(server.uri()).events(query).await.unwrap();

        assert_eq!(events.total, 95);
        assert!(events.data.is_empty());
    }

    #[tokio::test]
    async fn test_event_detail_encodes_hash_and_maps_404() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/events/events/abc123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 1, "event_hash": "abc123", "full_event": {"sid": "s"}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/events/events/missing"))
            .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "not found"})))
            .mount(&server)
            .await;

        let client = ApiClient::new(server.uri());
        let detail = client.get_event_detail("abc123").await.unwrap();
        assert_eq!(detail.full_event(), json!({"sid": "s"}));

        let err = client.get_event_detail("missing").await.unwrap_err();
        assert!(matches!(err, Error::Status { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_from_config_applies_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(STATS_PATH))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(stats_body())
                    .set_delay(std::time::Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = DashboardConfig {
            api_base_url: server.uri(),
            request_timeout_ms: Some(50),
            ..DashboardConfig::default()
        };
        let err = ApiClient::from_config(&config)
            .unwrap()
            .get_stats()
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Http { .. }));
    }
}
