//! Service Client
//!
//! Combines the HTTP transport with the service's URL layout. Collections
//! live at `<base>/<collection>` and items at `<base>/<collection>/<id>`.

use super::http::{ApiHttpClient, ApiSettings};
use anyhow::Result;

/// Client for one running words/books service
#[derive(Clone)]
pub struct ServiceClient {
    pub http: ApiHttpClient,
    base_url: String,
}

impl ServiceClient {
    /// Create a new service client
    pub fn new(settings: ApiSettings) -> Result<Self> {
        let http = ApiHttpClient::new(&settings)?;
        let base_url = settings.base_url.as_str().trim_end_matches('/').to_string();

        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Build a collection URL, e.g. `http://localhost:8010/books`
    pub fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    /// Build an item URL; the identifier is percent-encoded as one path segment
    pub fn item_url(&self, collection: &str, id: &str) -> String {
        format!(
            "{}/{}",
            self.collection_url(collection),
            urlencoding::encode(id)
        )
    }

    /// Build a filtered collection URL, e.g. `.../books?title=Dune`
    pub fn query_url(&self, collection: &str, param: &str, value: &str) -> String {
        format!(
            "{}?{}={}",
            self.collection_url(collection),
            param,
            urlencoding::encode(value)
        )
    }
}
