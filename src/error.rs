//! Reconciliation errors
//!
//! Every failure of a create/read/update/delete exchange is surfaced as one
//! of these variants. Nothing here is retried or recovered locally.

use reqwest::{Method, StatusCode};
use thiserror::Error;

/// Result alias for reconciler and transport operations
pub type Result<T> = std::result::Result<T, ReconcileError>;

/// Failure of a single reconciliation round trip
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// The HTTP exchange could not be completed (connect, DNS, TLS, body read)
    #[error("{method} {url} failed: {source}")]
    Transport {
        method: Method,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with a status outside the verb's success set
    #[error("remote rejected request with {status} (expected {expected}): {body}")]
    RemoteRejected {
        status: StatusCode,
        expected: StatusCode,
        body: String,
    },

    /// A success response whose body is not the expected shape
    #[error("could not decode {kind} response: {source}")]
    Decode {
        kind: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Desired state refused locally before any request was issued
    #[error("invalid value for '{field}': {reason}")]
    InvalidDesired { field: &'static str, reason: String },
}

impl ReconcileError {
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::RemoteRejected { .. })
    }

    /// The remote record is gone (404 on read/update/delete)
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::RemoteRejected { status, .. } if *status == StatusCode::NOT_FOUND
        )
    }

    /// Status code returned by the service, if the exchange completed
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::RemoteRejected { status, .. } => Some(*status),
            _ => None,
        }
    }
}
