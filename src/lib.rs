//! Reconcile declared words and books against a REST service.
//!
//! The [`resource`] module holds the per-kind schemas and the generic
//! reconciler; [`api`] is the HTTP transport it drives.

pub mod api;
pub mod config;
pub mod error;
pub mod resource;
pub mod state;

pub use error::{ReconcileError, Result};
