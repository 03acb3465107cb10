//! Reconciler
//!
//! Drives the create/read/update/delete lifecycle of one resource kind.
//! Every entry point is a single request/response round trip. Tracked state
//! is only replaced once a success response has been fully decoded, so a
//! failed call leaves it exactly as it was.

use super::schema::ResourceDef;
use crate::api::http::{response_body_as_text, sanitize_for_log};
use crate::api::ServiceClient;
use crate::error::{ReconcileError, Result};
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// Capabilities a resource kind supplies to the generic reconciler
pub trait ResourceKind {
    /// Typed field set, used for both desired and tracked state
    type Record: Clone + Debug + PartialEq;
    /// Wire shape sent on create and update
    type Request: Serialize;
    /// Wire shape returned by create, read and update
    type Response: DeserializeOwned;

    fn definition(&self) -> &ResourceDef;

    /// Build the request payload from desired state.
    ///
    /// Values generated locally are written back into `desired` before the
    /// payload is returned.
    fn encode(&self, desired: &mut Self::Record) -> Result<Self::Request>;

    /// Split a response into the server identifier and the confirmed fields
    fn decode(&self, response: Self::Response) -> (String, Self::Record);

    /// Externally visible key of a tracked instance
    fn identity_key(&self, id: &str, _record: &Self::Record) -> String {
        id.to_string()
    }
}

/// Last confirmed mirror of one remote record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tracked<R> {
    /// Server-issued identifier; used for all addressing
    pub id: String,
    /// Key the host uses to refer to this instance
    pub key: String,
    #[serde(flatten)]
    pub record: R,
}

/// Generic CRUD driver, instantiated once per resource kind
#[derive(Clone)]
pub struct Reconciler<K> {
    kind: K,
    client: ServiceClient,
}

impl<K: ResourceKind> Reconciler<K> {
    pub fn new(kind: K, client: ServiceClient) -> Self {
        Self { kind, client }
    }

    pub fn kind(&self) -> &K {
        &self.kind
    }

    pub(crate) fn client(&self) -> &ServiceClient {
        &self.client
    }

    fn name(&self) -> &'static str {
        self.kind.definition().name
    }

    fn collection_url(&self) -> String {
        self.client.collection_url(self.kind.definition().collection)
    }

    /// Item URL shared by read, update and delete
    pub fn item_url(&self, id: &str) -> String {
        self.client.item_url(self.kind.definition().collection, id)
    }

    /// Create the remote record and return its tracked state
    pub async fn create(&self, desired: &mut K::Record) -> Result<Tracked<K::Record>> {
        tracing::info!("Creating {}", self.name());
        let request = self.kind.encode(desired)?;

        let url = self.collection_url();
        let response = self.client.http.create_item(&url, &request).await?;
        let response = self.accept(response, StatusCode::CREATED).await?;
        let tracked = self.track(Method::POST, response).await?;

        tracing::info!(id = %tracked.id, "{} created", self.name());
        Ok(tracked)
    }

    /// Refresh tracked state from the server, which is authoritative
    pub async fn read(&self, tracked: &mut Tracked<K::Record>) -> Result<()> {
        tracing::info!(id = %tracked.id, "Reading {}", self.name());

        let url = self.item_url(&tracked.id);
        let response = self.client.http.read_item(&url).await?;
        let response = self.accept(response, StatusCode::OK).await?;
        let (_, record) = self.decode(Method::GET, response).await?;

        tracked.key = self.kind.identity_key(&tracked.id, &record);
        tracked.record = record;
        Ok(())
    }

    /// Push desired state to the existing remote record
    pub async fn update(
        &self,
        tracked: &mut Tracked<K::Record>,
        desired: &mut K::Record,
    ) -> Result<()> {
        tracing::info!(id = %tracked.id, "Updating {}", self.name());
        let request = self.kind.encode(desired)?;

        let url = self.item_url(&tracked.id);
        let response = self.client.http.update_item(&url, &request).await?;
        let response = self.accept(response, StatusCode::OK).await?;
        *tracked = self.track(Method::PUT, response).await?;
        Ok(())
    }

    /// Delete the remote record. The caller discards tracked state on success.
    pub async fn delete(&self, tracked: &Tracked<K::Record>) -> Result<()> {
        tracing::info!(id = %tracked.id, "Deleting {}", self.name());

        let url = self.item_url(&tracked.id);
        let response = self.client.http.delete_item(&url).await?;
        self.accept(response, StatusCode::NO_CONTENT).await?;
        Ok(())
    }

    /// Pass the response through if it carries the expected status
    pub(crate) async fn accept(
        &self,
        response: Response,
        expected: StatusCode,
    ) -> Result<Response> {
        let status = response.status();
        if status == expected {
            return Ok(response);
        }

        let body = response_body_as_text(response).await;
        tracing::error!(
            "{} request rejected: {} - {}",
            self.name(),
            status,
            sanitize_for_log(&body)
        );
        Err(ReconcileError::RemoteRejected {
            status,
            expected,
            body,
        })
    }

    pub(crate) async fn track(
        &self,
        method: Method,
        response: Response,
    ) -> Result<Tracked<K::Record>> {
        let (id, record) = self.decode(method, response).await?;
        let key = self.kind.identity_key(&id, &record);
        Ok(Tracked { id, key, record })
    }

    async fn decode(&self, method: Method, response: Response) -> Result<(String, K::Record)> {
        let url = response.url().to_string();
        let body = response
            .bytes()
            .await
            .map_err(|source| ReconcileError::Transport {
                method,
                url,
                source,
            })?;

        let decoded: K::Response = serde_json::from_slice(&body).map_err(|source| {
            tracing::error!(
                "Failed to parse {} response: {} - {}",
                self.name(),
                source,
                sanitize_for_log(&String::from_utf8_lossy(&body))
            );
            ReconcileError::Decode {
                kind: self.name(),
                source,
            }
        })?;

        Ok(self.kind.decode(decoded))
    }
}
