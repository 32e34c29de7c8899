//! HTTP client for the award search endpoint.

use crate::error::FetchError;
use crate::query::request::SearchRequest;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Connection and retry settings.
#[derive(Debug, Clone)]
pub struct QueryClientConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    /// Total attempts, including the first one.
    pub max_attempts: u32,
    /// Delay before the second attempt; doubled for each further attempt.
    pub backoff_ms: u64,
}

impl Default for QueryClientConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.usaspending.gov/api/v2/search/spending_by_award/".to_string(),
            timeout_seconds: 30,
            max_attempts: 3,
            backoff_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Vec<Value>,
}

/// Issues a single-page award search.
pub struct QueryClient {
    config: QueryClientConfig,
    http_client: reqwest::Client,
}

impl QueryClient {
    pub fn new(config: QueryClientConfig) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| FetchError::Transport(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            http_client,
        })
    }

    /// Fetch the raw result objects for `request`.
    ///
    /// Transport failures and 5xx answers are retried with exponential
    /// backoff; anything else fails on the first attempt. A search that
    /// matches nothing is reported as [`FetchError::EmptyResult`].
    pub async fn fetch_awards(&self, request: &SearchRequest) -> Result<Vec<Value>, FetchError> {
        let attempts = self.config.max_attempts.max(1);
        let mut backoff_ms = self.config.backoff_ms;

        for attempt in 1..=attempts {
            match self.fetch_once(request).await {
                Ok(results) if results.is_empty() => {
                    return Err(FetchError::EmptyResult {
                        agency: request.agency_name().to_string(),
                    });
                }
                Ok(results) => {
                    info!("Fetched {} award records", results.len());
                    return Ok(results);
                }
                Err(e) if e.is_retriable() && attempt < attempts => {
                    warn!(
                        "Attempt {}/{} failed: {}; retrying in {}ms",
                        attempt, attempts, e, backoff_ms
                    );
                    if backoff_ms > 0 {
                        tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                    }
                    backoff_ms = backoff_ms.saturating_mul(2);
                }
                Err(e) => return Err(e),
            }
        }

        Err(FetchError::Transport("retry loop exhausted".to_string()))
    }

    async fn fetch_once(&self, request: &SearchRequest) -> Result<Vec<Value>, FetchError> {
        debug!("POST {}", self.config.endpoint);

        let response = self
            .http_client
            .post(&self.config.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    FetchError::Transport(format!(
                        "request timed out after {}s",
                        self.config.timeout_seconds
                    ))
                } else if e.is_connect() {
                    FetchError::Transport(format!("cannot connect to {}", self.config.endpoint))
                } else {
                    FetchError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| FetchError::Transport(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(FetchError::Remote {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: SearchResponse = serde_json::from_str(&body)
            .map_err(|e| FetchError::MalformedResponse(e.to_string()))?;
        Ok(parsed.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReportMode;
    use crate::query::filters::FilterInput;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn request() -> SearchRequest {
        let filters = FilterInput {
            agency: Some("NASA".to_string()),
            ..FilterInput::default()
        }
        .build(ReportMode::Search)
        .unwrap();
        SearchRequest::new(filters, ReportMode::Search)
    }

    fn client(endpoint: String) -> QueryClient {
        QueryClient::new(QueryClientConfig {
            endpoint,
            timeout_seconds: 5,
            max_attempts: 3,
            backoff_ms: 1,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_fetch_returns_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/search"))
            .and(body_partial_json(json!({
                "page": 1,
                "sort": "Award Amount"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"Award ID": "A1", "Award Amount": 10.0}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client(format!("{}/search", server.uri()))
            .fetch_awards(&request())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0]["Award ID"], "A1");
    }

    #[tokio::test]
    async fn test_empty_results_are_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
            .mount(&server)
            .await;

        let err = client(server.uri())
            .fetch_awards(&request())
            .await
            .unwrap_err();
        match err {
            FetchError::EmptyResult { agency } => assert_eq!(agency, "NASA"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_server_errors_are_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .up_to_n_times(2)
            .expect(2)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"Award ID": "A1"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client(server.uri()).fetch_awards(&request()).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_retries_are_bounded() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(3)
            .mount(&server)
            .await;

        let err = client(server.uri())
            .fetch_awards(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Remote { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_client_errors_fail_fast() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(422).set_body_string("invalid filter"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(server.uri())
            .fetch_awards(&request())
            .await
            .unwrap_err();
        match err {
            FetchError::Remote { status, body } => {
                assert_eq!(status, 422);
                assert_eq!(body, "invalid filter");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .expect(1)
            .mount(&server)
            .await;

        let err = client(server.uri())
            .fetch_awards(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_transport_error() {
        let err = client("http://127.0.0.1:9/search".to_string())
            .fetch_awards(&request())
            .await
            .unwrap_err();
        assert!(matches!(err, FetchError::Transport(_)));
    }
}
