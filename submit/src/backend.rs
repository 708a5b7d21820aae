//! HTTP transport to the attendance backend.

use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::error::TransportError;

/// Default timeout for backend requests.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// One JSON POST to the backend.
#[derive(Clone, Debug, PartialEq)]
pub struct BackendRequest {
    /// Path relative to the base URL, e.g. `/attendance/mark`.
    pub path: &'static str,
    pub headers: Vec<(&'static str, &'static str)>,
    pub body: Value,
}

impl BackendRequest {
    pub fn new(path: &'static str, body: Value) -> Self {
        Self {
            path,
            headers: Vec::new(),
            body,
        }
    }

    pub fn with_header(mut self, name: &'static str, value: &'static str) -> Self {
        self.headers.push((name, value));
        self
    }
}

/// Anything that can carry a [`BackendRequest`] and hand back the parsed
/// JSON body.
///
/// Implementations return the body whatever the HTTP status: the backend
/// reports refusals in the body, and classification is the pipeline's job.
#[async_trait]
pub trait Backend: Send + Sync {
    async fn post_json(&self, request: BackendRequest) -> Result<Value, TransportError>;
}

/// [`Backend`] over `reqwest`.
pub struct HttpBackend {
    base_url: String,
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_timeouts(base_url, DEFAULT_TIMEOUT, DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_timeouts(
        base_url: impl Into<String>,
        timeout: Duration,
        connect_timeout: Duration,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(connect_timeout)
            .build()
            .unwrap_or_default();
        Self {
            base_url: base_url.into(),
            http_client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }
}

#[async_trait]
impl Backend for HttpBackend {
    async fn post_json(&self, request: BackendRequest) -> Result<Value, TransportError> {
        let url = self.url(request.path);
        let mut builder = self.http_client.post(&url).json(&request.body);
        for (name, value) in &request.headers {
            builder = builder.header(*name, *value);
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Unreachable(format!("request timed out: {e}"))
            } else if e.is_connect() {
                TransportError::Unreachable(format!("connection failed: {e}"))
            } else {
                TransportError::RequestFailed(e.to_string())
            }
        })?;

        let status = response.status();
        debug!(%url, %status, "backend responded");

        response.json::<Value>().await.map_err(|e| {
            TransportError::InvalidResponse(format!("HTTP status {status}, body not JSON: {e}"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let backend = HttpBackend::new("http://localhost:5000/");
        assert_eq!(backend.url("/users/login"), "http://localhost:5000/users/login");
        let backend = HttpBackend::new("http://localhost:5000");
        assert_eq!(backend.url("/attendance/mark"), "http://localhost:5000/attendance/mark");
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_transport_error() {
        // Port 9 (discard) on loopback is closed in test environments.
        let backend = HttpBackend::with_timeouts(
            "http://127.0.0.1:9",
            Duration::from_secs(2),
            Duration::from_secs(1),
        );
        let err = backend
            .post_json(BackendRequest::new("/users/login", serde_json::json!({})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            TransportError::Unreachable(_) | TransportError::RequestFailed(_)
        ));
    }
}
