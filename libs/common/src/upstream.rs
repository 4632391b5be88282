//! Resource API collaborator
//!
//! [`ResourceApi`] is the only way the relay talks to the video provider.
//! Handlers and algorithms depend on the trait; [`HttpResourceApi`] is the
//! production implementation built on reqwest.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::error::{UpstreamError, UpstreamResult};

/// Supplies the bearer credential attached to every Resource API call
#[async_trait]
pub trait CredentialSource: Send + Sync {
    async fn bearer_token(&self) -> UpstreamResult<String>;
}

/// JSON-over-HTTP access to the upstream provider
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// `GET {base}/{path}?{query}`
    async fn get(&self, path: &str, query: &[(String, String)]) -> UpstreamResult<Value>;

    /// `POST {base}/{path}` with a JSON body
    async fn post(&self, path: &str, body: &Value) -> UpstreamResult<Value>;
}

/// reqwest-backed Resource API
#[derive(Clone)]
pub struct HttpResourceApi {
    client: reqwest::Client,
    base_url: String,
    credentials: Arc<dyn CredentialSource>,
}

impl HttpResourceApi {
    /// Create a client for `base_url` with a fresh connection pool
    pub fn new(base_url: impl Into<String>, credentials: Arc<dyn CredentialSource>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url, credentials)
    }

    /// Create a client sharing an existing reqwest connection pool
    pub fn with_client(
        client: reqwest::Client,
        base_url: impl Into<String>,
        credentials: Arc<dyn CredentialSource>,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            credentials,
        }
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl ResourceApi for HttpResourceApi {
    async fn get(&self, path: &str, query: &[(String, String)]) -> UpstreamResult<Value> {
        let url = self.url(path);
        let token = self.credentials.bearer_token().await?;
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(&url)
            .query(query)
            .bearer_auth(token)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        read_json(response).await
    }

    async fn post(&self, path: &str, body: &Value) -> UpstreamResult<Value> {
        let url = self.url(path);
        let token = self.credentials.bearer_token().await?;
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await
            .map_err(UpstreamError::Transport)?;

        read_json(response).await
    }
}

/// Decode an upstream response, turning non-2xx statuses into [`UpstreamError::Status`]
///
/// Error bodies are kept as JSON when possible, otherwise as a JSON string of
/// the raw text. An empty success body decodes to `null`.
pub async fn read_json(response: reqwest::Response) -> UpstreamResult<Value> {
    let status = response.status();
    let text = response.text().await.map_err(UpstreamError::Transport)?;

    if !status.is_success() {
        let body = if text.trim().is_empty() {
            None
        } else {
            Some(serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text.clone())))
        };
        return Err(UpstreamError::Status {
            status: status.as_u16(),
            body,
        });
    }

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    Ok(serde_json::from_str(&text)?)
}
