//! Membrane API client: one authenticated JSON round trip per call.

use crate::config::MembraneConfig;
use crate::error::{FieldError, ToolError};
use crate::membrane::request::{ApiRequest, RequestOptions};
use reqwest::header::CONTENT_TYPE;
use reqwest::Url;
use serde_json::Value;
use std::fmt;
use std::future::Future;
use tracing::{debug, warn};

/// Membrane API client.
///
/// Holds only the base URL and credential; every call is independent, so a
/// single instance can be shared across concurrent tool invocations.
#[derive(Clone)]
pub struct MembraneClient {
    base_url: Url,
    api_key: String,
    http: reqwest::Client,
}

impl MembraneClient {
    /// Create a client for the given configuration.
    pub fn new(config: &MembraneConfig) -> Result<Self, ToolError> {
        Self::with_http(config, reqwest::Client::new())
    }

    /// Create a client that reuses an existing `reqwest::Client` (proxies, TLS, pools).
    pub fn with_http(config: &MembraneConfig, http: reqwest::Client) -> Result<Self, ToolError> {
        let raw = config.resolved_api_url();
        let base_url = Url::parse(raw).map_err(|err| ToolError::InvalidBaseUrl {
            url: raw.to_string(),
            reason: err.to_string(),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(ToolError::InvalidBaseUrl {
                url: raw.to_string(),
                reason: "URL cannot carry a path".into(),
            });
        }

        Ok(Self {
            base_url,
            api_key: config.api_key.clone(),
            http,
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Full URL for a request: escaped path segments plus form-encoded query.
    ///
    /// Empty, `.` and `..` segments are rejected: URL normalization would drop
    /// them and silently address a different endpoint.
    pub fn url_for(&self, request: &ApiRequest) -> Result<Url, ToolError> {
        let unroutable: Vec<FieldError> = request
            .segments()
            .iter()
            .filter(|segment| matches!(segment.as_str(), "" | "." | ".."))
            .map(|segment| {
                FieldError::new(
                    "",
                    format!("'{}' cannot be used as a path segment", segment),
                )
            })
            .collect();
        if !unroutable.is_empty() {
            warn!("Refusing to build URL for {} {}", request.method(), request.path());
            return Err(ToolError::invalid_input(request.path(), unroutable));
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| ToolError::InvalidBaseUrl {
                url: self.base_url().to_string(),
                reason: "URL cannot carry a path".into(),
            })?;
            segments.pop_if_empty();
            segments.extend(request.segments());
        }
        if !request.query_pairs().is_empty() {
            url.query_pairs_mut().extend_pairs(request.query_pairs());
        }
        Ok(url)
    }

    /// Issue `request`, honoring the deadline and cancellation token in `options`.
    ///
    /// Non-success statuses become [`ToolError::RemoteApi`] with the raw body;
    /// success bodies are returned as parsed JSON without reshaping.
    pub async fn request(
        &self,
        request: ApiRequest,
        options: &RequestOptions,
    ) -> Result<Value, ToolError> {
        with_options(self.round_trip(request), options).await
    }

    async fn round_trip(&self, request: ApiRequest) -> Result<Value, ToolError> {
        let url = self.url_for(&request)?;
        debug!("Membrane {} {}", request.method(), request.path());

        let mut builder = self
            .http
            .request(request.method().clone(), url)
            .bearer_auth(&self.api_key)
            .header(CONTENT_TYPE, "application/json");
        if let Some(body) = request.body() {
            builder = builder.json(body);
        }

        let resp = builder.send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            warn!(
                "Membrane {} {} failed ({}): {}",
                request.method(),
                request.path(),
                status,
                body
            );
            return Err(ToolError::RemoteApi {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        if text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(ToolError::InvalidResponse)
    }
}

impl fmt::Debug for MembraneClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MembraneClient")
            .field("base_url", &self.base_url())
            .finish()
    }
}

/// Race `fut` against the optional deadline and cancellation token.
pub(crate) async fn with_options<F, T>(fut: F, options: &RequestOptions) -> Result<T, ToolError>
where
    F: Future<Output = Result<T, ToolError>>,
{
    let bounded = async {
        match options.timeout {
            Some(limit) => match tokio::time::timeout(limit, fut).await {
                Ok(result) => result,
                Err(_) => Err(ToolError::DeadlineExceeded(limit)),
            },
            None => fut.await,
        }
    };

    match &options.cancel {
        Some(token) => {
            tokio::select! {
                _ = token.cancelled() => Err(ToolError::Cancelled),
                result = bounded => result,
            }
        }
        None => bounded.await,
    }
}
