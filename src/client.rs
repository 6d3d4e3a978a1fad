//! HTTP client facade composing the TTL cache and the request queue
//!
//! This is the single entry point data services call. Cached GETs check the
//! cache first: a valid hit is served immediately and never touches the queue
//! or the network, so cached reads are never rate-limited. Everything else is
//! funneled through the shared [`RequestQueue`] so the rate budget holds
//! across all traffic the client originates.
//!
//! Mutating verbs (`post`, `put`, `delete`) never read or write the cache:
//! they must not be served stale, and their responses are not assumed
//! cacheable.

use std::sync::Arc;

use log::debug;
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use thiserror::Error;

use crate::cache::TtlCache;
use crate::config::{ClientConfig, TtlTier};
use crate::queue::{QueueError, RequestQueue};

/// Errors surfaced to callers of [`ApiClient`]
///
/// None of these are recovered locally; they are propagated for the caller
/// (who owns retry policy and user-visible states) to handle. A failed fetch
/// never overwrites or invalidates a previously cached good value.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The underlying transport failed (DNS, connection refused, offline, timeout)
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A response arrived with a non-2xx status
    #[error("HTTP status {status}: {message}")]
    Status {
        /// The HTTP status code
        status: u16,
        /// The status text accompanying the code
        message: String,
    },

    /// The response body could not be decoded as JSON
    #[error("failed to parse response body: {0}")]
    Parse(#[from] serde_json::Error),

    /// The shared request queue's drain task is gone
    #[error("request queue is closed")]
    QueueClosed,
}

impl From<QueueError> for ApiError {
    fn from(_: QueueError) -> Self {
        ApiError::QueueClosed
    }
}

/// Rate-limited, cache-aware HTTP client for the platform API
///
/// Construct one per logical backend with [`ApiClient::new`], or hand several
/// clients the same queue via [`ApiClient::with_queue`] when they should share
/// one rate budget.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    cache: Arc<TtlCache<Value>>,
    queue: Arc<RequestQueue>,
    config: ClientConfig,
}

impl ApiClient {
    /// Creates a client with its own private request queue
    pub fn new(config: ClientConfig) -> Self {
        let queue = Arc::new(RequestQueue::new(config.rate));
        Self::with_queue(config, queue)
    }

    /// Creates a client sharing an existing queue (and therefore its budget)
    pub fn with_queue(config: ClientConfig, queue: Arc<RequestQueue>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();
        Self {
            http,
            cache: Arc::new(TtlCache::new(config.ttl.medium)),
            queue,
            config,
        }
    }

    /// The client's response cache, for explicit invalidation
    ///
    /// `cache().clear()` is the logout / cache-busting hook; `cache().remove`
    /// drops a single key after a caller knows it is stale.
    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }

    /// Issues an uncached GET through the request queue
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.enqueue(Method::GET, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issues a GET served from the cache when a fresh entry exists
    ///
    /// On a valid hit the queue and the network are bypassed entirely. On a
    /// miss the request runs through the queue, and the decoded body is stored
    /// under `cache_key` with the given tier's TTL before being returned.
    pub async fn get_cached<T: DeserializeOwned>(
        &self,
        path: &str,
        cache_key: &str,
        tier: TtlTier,
    ) -> Result<T, ApiError> {
        if let Some(value) = self.cache.get(cache_key) {
            debug!("cache hit: {cache_key}");
            return Ok(serde_json::from_value(value)?);
        }
        debug!("cache miss: {cache_key}");

        let value = self.enqueue(Method::GET, path, None).await?;
        self.cache.insert_with_ttl(
            cache_key,
            value.clone(),
            tier.duration(&self.config.ttl),
        );
        Ok(serde_json::from_value(value)?)
    }

    /// Issues a POST with a JSON body; never touches the cache
    pub async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let value = self.enqueue(Method::POST, path, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issues a PUT with a JSON body; never touches the cache
    pub async fn put<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let body = serde_json::to_value(body)?;
        let value = self.enqueue(Method::PUT, path, Some(body)).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Issues a DELETE; never touches the cache
    ///
    /// An empty 2xx body (a 204, typically) decodes as JSON `null`, so `T`
    /// may be `Option<...>` or `serde_json::Value` for endpoints that return
    /// nothing.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let value = self.enqueue(Method::DELETE, path, None).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Runs one HTTP call through the rate-limited queue
    async fn enqueue(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let http = self.http.clone();
        let url = self.build_url(path);
        self.queue
            .add(async move { execute(http, method, url, body).await })
            .await?
    }

    /// Joins a path onto the base URL and appends the API key when configured
    fn build_url(&self, path: &str) -> String {
        let base = self.config.base_url.trim_end_matches('/');
        let mut url = format!("{base}{path}");
        if let Some(api_key) = &self.config.api_key {
            let separator = if url.contains('?') { '&' } else { '?' };
            url.push(separator);
            url.push_str("key=");
            url.push_str(api_key);
        }
        url
    }
}

/// Performs the actual network call and normalizes failures into [`ApiError`]
async fn execute(
    http: reqwest::Client,
    method: Method,
    url: String,
    body: Option<Value>,
) -> Result<Value, ApiError> {
    let mut request = http.request(method, &url);
    if let Some(body) = body {
        request = request.json(&body);
    }

    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            status: status.as_u16(),
            message: status.canonical_reason().unwrap_or("unknown").to_string(),
        });
    }

    let text = response.text().await?;
    if text.is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&text)?)
}
