//! Resource abstraction layer
//!
//! Each resource kind describes its fields once and plugs a small set of
//! capabilities into a single generic [`Reconciler`].
//!
//! # Architecture
//!
//! - [`schema`] - Field definitions and their mutability rules
//! - [`registry`] - Lookup of every kind's definition for the host
//! - [`reconciler`] - Generic create/read/update/delete driver
//! - [`word`] / [`book`] - The two concrete kinds
//! - [`title`] - Local generation of book titles
//!
//! # Example
//!
//! ```ignore
//! use wordbook::resource::{Word, WordReconciler};
//!
//! async fn declare(client: ServiceClient) -> wordbook::error::Result<()> {
//!     let words = WordReconciler::words(client);
//!     let mut desired = Word::new("hello");
//!     let mut tracked = words.create(&mut desired).await?;
//!     words.read(&mut tracked).await?;
//!     words.delete(&tracked).await
//! }
//! ```

pub mod book;
pub mod reconciler;
mod registry;
pub mod schema;
pub mod title;
pub mod word;

pub use book::{Book, BookIdentity, BookKind, BookReconciler, BookSchema, TitlePolicy};
pub use reconciler::{Reconciler, ResourceKind, Tracked};
pub use registry::*;
pub use word::{Word, WordKind, WordReconciler};
