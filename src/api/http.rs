//! HTTP utilities for the words/books REST API
//!
//! Each call performs exactly one exchange and returns the raw response.
//! Status codes are not interpreted here: what counts as success differs per
//! verb, so that decision belongs to the reconciler.

use crate::error::{ReconcileError, Result};
use anyhow::Context;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Method, Response};
use serde::Serialize;
use std::fmt::Display;
use std::time::Duration;
use url::Url;

/// Media type sent with every request
pub const JSON_MEDIA_TYPE: &str = "application/json";

/// Diagnostic text used when a response body cannot be read
pub const BODY_UNAVAILABLE: &str = "<response body unavailable>";

/// Maximum length of response body to log (to avoid logging sensitive data)
const MAX_LOG_BODY_LENGTH: usize = 200;

/// Sanitize response body for logging
/// Truncates long responses and strips control characters
pub fn sanitize_for_log(body: &str) -> String {
    let char_count = body.chars().count();
    let truncated = if char_count > MAX_LOG_BODY_LENGTH {
        let head: String = body.chars().take(MAX_LOG_BODY_LENGTH).collect();
        format!("{}... [truncated, {} bytes total]", head, body.len())
    } else {
        body.to_string()
    };

    truncated.replace(|c: char| c.is_control() && c != ' ', "")
}

/// Connection settings for one remote service
///
/// Built once and handed to the client; nothing about the remote endpoint
/// lives in process-wide state, so tests can point separate clients at
/// separate mock servers.
#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: Url,
    pub content_type: String,
    pub user_agent: String,
    /// Per-request deadline. `None` lets a request block until the peer answers.
    pub timeout: Option<Duration>,
}

impl ApiSettings {
    pub fn new(base_url: &str) -> std::result::Result<Self, url::ParseError> {
        Ok(Self {
            base_url: Url::parse(base_url)?,
            content_type: JSON_MEDIA_TYPE.to_string(),
            user_agent: format!("wordbook/{}", env!("CARGO_PKG_VERSION")),
            timeout: None,
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// HTTP client wrapper for the service's collection/item endpoints
#[derive(Clone)]
pub struct ApiHttpClient {
    client: Client,
    content_type: String,
}

impl ApiHttpClient {
    /// Create a new HTTP client
    pub fn new(settings: &ApiSettings) -> anyhow::Result<Self> {
        let mut builder = Client::builder().user_agent(settings.user_agent.as_str());
        if let Some(timeout) = settings.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            content_type: settings.content_type.clone(),
        })
    }

    /// POST a JSON payload to a collection URL
    pub async fn create_item<T: Serialize + ?Sized>(
        &self,
        collection_url: &str,
        payload: &T,
    ) -> Result<Response> {
        self.send(Method::POST, collection_url, Some(payload)).await
    }

    /// GET an item URL
    pub async fn read_item(&self, item_url: &str) -> Result<Response> {
        self.send::<()>(Method::GET, item_url, None).await
    }

    /// PUT a JSON payload to an item URL
    pub async fn update_item<T: Serialize + ?Sized>(
        &self,
        item_url: &str,
        payload: &T,
    ) -> Result<Response> {
        self.send(Method::PUT, item_url, Some(payload)).await
    }

    /// DELETE an item URL
    pub async fn delete_item(&self, item_url: &str) -> Result<Response> {
        self.send::<()>(Method::DELETE, item_url, None).await
    }

    async fn send<T: Serialize + ?Sized>(
        &self,
        method: Method,
        url: &str,
        payload: Option<&T>,
    ) -> Result<Response> {
        tracing::debug!("{} {}", method, url);

        let mut request = self
            .client
            .request(method.clone(), url)
            .header(CONTENT_TYPE, self.content_type.as_str());

        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request.send().await.map_err(|source| {
            tracing::error!("{} {} could not be completed: {}", method, url, source);
            ReconcileError::Transport {
                method: method.clone(),
                url: url.to_string(),
                source,
            }
        })?;

        tracing::debug!("{} {} -> {}", method, url, response.status());
        Ok(response)
    }
}

/// Read a response body as text for error reporting
///
/// Consumes the response. A failure to read the body is logged and replaced
/// with [`BODY_UNAVAILABLE`]; it never replaces the failure being reported.
pub async fn response_body_as_text(response: Response) -> String {
    body_or_placeholder(response.text().await)
}

pub(crate) fn body_or_placeholder<E: Display>(result: std::result::Result<String, E>) -> String {
    match result {
        Ok(body) => body,
        Err(e) => {
            tracing::warn!("Failed to read response body: {}", e);
            BODY_UNAVAILABLE.to_string()
        }
    }
}
