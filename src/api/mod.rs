//! REST service interaction module
//!
//! This module provides the transport used by the reconcilers: a thin HTTP
//! adapter that issues one request per call and hands back the raw response,
//! plus the client that knows how collections and items are addressed.
//!
//! # Module Structure
//!
//! - [`http`] - HTTP verbs against collection/item URLs, body extraction for diagnostics
//! - [`client`] - Service client combining the transport with URL addressing
//!
//! # Example
//!
//! ```ignore
//! use wordbook::api::{ApiSettings, ServiceClient};
//!
//! async fn example() -> anyhow::Result<()> {
//!     let client = ServiceClient::new(ApiSettings::new("http://localhost:8010")?)?;
//!     let response = client.http.read_item(&client.item_url("words", "42")).await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod http;

pub use client::ServiceClient;
pub use http::{
    response_body_as_text, ApiHttpClient, ApiSettings, BODY_UNAVAILABLE, JSON_MEDIA_TYPE,
};
