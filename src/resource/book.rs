//! Book resource
//!
//! `title` and `author`, stored remotely under `/books`. Depending on the
//! [`BookSchema`] a blank title is either refused or replaced with a
//! generated one, and the instance is keyed either by the server id or by
//! its title.

use super::reconciler::{Reconciler, ResourceKind, Tracked};
use super::schema::{FieldDef, ResourceDef};
use super::title::generate_title;
use crate::api::ServiceClient;
use crate::error::{ReconcileError, Result};
use reqwest::{Method, StatusCode};
use serde::{Deserialize, Serialize};

pub const BOOK_COLLECTION: &str = "books";

/// Desired or confirmed state of a book
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Book {
    pub title: String,
    #[serde(default)]
    pub author: String,
}

impl Book {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BookRequest {
    pub title: String,
    pub author: String,
}

#[derive(Debug, Deserialize)]
pub struct BookResponse {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub author: Option<String>,
}

/// What happens when desired state has an empty title
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TitlePolicy {
    /// Refuse locally
    Required,
    /// Substitute `generated.title.<16 chars>`
    #[default]
    Generated,
}

/// How a tracked book is keyed by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookIdentity {
    /// Key is the server-issued id
    #[default]
    ServerId,
    /// Key follows the (mutable) title; the server id is mirrored as `book_id`.
    /// Addressing still uses the server id.
    Title,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookSchema {
    pub title: TitlePolicy,
    pub identity: BookIdentity,
}

impl BookSchema {
    pub fn definition(&self) -> ResourceDef {
        let title = match self.title {
            TitlePolicy::Required => FieldDef::required("title"),
            TitlePolicy::Generated => FieldDef::optional("title").computed().force_new(),
        };

        let mut fields = vec![FieldDef::identifier("id"), title, FieldDef::optional("author")];
        if self.identity == BookIdentity::Title {
            fields.push(FieldDef::mirrored("book_id"));
        }

        ResourceDef {
            name: "book",
            collection: BOOK_COLLECTION,
            fields,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BookKind {
    schema: BookSchema,
    definition: ResourceDef,
}

impl BookKind {
    pub fn new(schema: BookSchema) -> Self {
        Self {
            schema,
            definition: schema.definition(),
        }
    }

    pub fn schema(&self) -> BookSchema {
        self.schema
    }
}

impl Default for BookKind {
    fn default() -> Self {
        Self::new(BookSchema::default())
    }
}

impl ResourceKind for BookKind {
    type Record = Book;
    type Request = BookRequest;
    type Response = BookResponse;

    fn definition(&self) -> &ResourceDef {
        &self.definition
    }

    fn encode(&self, desired: &mut Book) -> Result<BookRequest> {
        if desired.title.is_empty() {
            match self.schema.title {
                TitlePolicy::Required => {
                    return Err(ReconcileError::InvalidDesired {
                        field: "title",
                        reason: "title is required".to_string(),
                    });
                }
                TitlePolicy::Generated => {
                    desired.title = generate_title();
                    tracing::info!(title = %desired.title, "Generated book title");
                }
            }
        }

        Ok(BookRequest {
            title: desired.title.clone(),
            author: desired.author.clone(),
        })
    }

    fn decode(&self, response: BookResponse) -> (String, Book) {
        let book = Book::new(response.title, response.author.unwrap_or_default());
        (response.id, book)
    }

    fn identity_key(&self, id: &str, record: &Book) -> String {
        match self.schema.identity {
            BookIdentity::ServerId => id.to_string(),
            BookIdentity::Title => record.title.clone(),
        }
    }
}

pub type BookReconciler = Reconciler<BookKind>;

impl BookReconciler {
    pub fn books(schema: BookSchema, client: ServiceClient) -> Self {
        Reconciler::new(BookKind::new(schema), client)
    }

    /// Adopt an existing remote book, looked up by title, into tracked state
    pub async fn import_by_title(&self, title: &str) -> Result<Tracked<Book>> {
        tracing::info!(title, "Importing book");

        let url = self.client().query_url(BOOK_COLLECTION, "title", title);
        let response = self.client().http.read_item(&url).await?;
        let response = self.accept(response, StatusCode::OK).await?;
        self.track(Method::GET, response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::title::is_generated_title;

    #[test]
    fn test_default_schema_definition() {
        let def = BookSchema::default().definition();
        assert!(def.validate().is_ok());
        let title = def.field("title").unwrap();
        assert!(title.optional && title.computed && title.force_new);
        assert!(!def.field("author").unwrap().required);
        assert!(def.field("book_id").is_none());
    }

    #[test]
    fn test_required_title_title_keyed_definition() {
        let def = BookSchema {
            title: TitlePolicy::Required,
            identity: BookIdentity::Title,
        }
        .definition();
        assert!(def.validate().is_ok());
        assert!(def.field("title").unwrap().required);
        let book_id = def.field("book_id").unwrap();
        assert!(book_id.computed && !book_id.caller_settable());
    }

    #[test]
    fn test_encode_generates_title_and_writes_back() {
        let kind = BookKind::default();
        let mut desired = Book::new("", "Ursula");
        let request = kind.encode(&mut desired).unwrap();
        assert!(is_generated_title(&request.title));
        assert_eq!(desired.title, request.title);
        assert_eq!(request.author, "Ursula");
    }

    #[test]
    fn test_encode_keeps_given_title() {
        let kind = BookKind::default();
        let mut desired = Book::new("Dune", "");
        let request = kind.encode(&mut desired).unwrap();
        assert_eq!(request.title, "Dune");
        assert_eq!(request.author, "");
        assert_eq!(desired, Book::new("Dune", ""));
    }

    #[test]
    fn test_required_title_rejects_blank() {
        let kind = BookKind::new(BookSchema {
            title: TitlePolicy::Required,
            identity: BookIdentity::ServerId,
        });
        let mut desired = Book::new("", "A");
        let err = kind.encode(&mut desired).unwrap_err();
        assert!(matches!(
            err,
            ReconcileError::InvalidDesired { field: "title", .. }
        ));
        assert_eq!(desired.title, "");
    }

    #[test]
    fn test_decode_tolerates_null_author() {
        let kind = BookKind::default();
        let response: BookResponse =
            serde_json::from_str(r#"{"id": "1", "title": "T", "author": null}"#).unwrap();
        assert_eq!(kind.decode(response), ("1".to_string(), Book::new("T", "")));
    }

    #[test]
    fn test_identity_key_by_schema() {
        let book = Book::new("Dune", "Herbert");
        assert_eq!(BookKind::default().identity_key("42", &book), "42");

        let keyed = BookKind::new(BookSchema {
            title: TitlePolicy::Generated,
            identity: BookIdentity::Title,
        });
        assert_eq!(keyed.identity_key("42", &book), "Dune");
    }

    #[test]
    fn test_policies_deserialize_from_config_names() {
        let policy: TitlePolicy = serde_json::from_str(r#""required""#).unwrap();
        assert_eq!(policy, TitlePolicy::Required);
        let identity: BookIdentity = serde_json::from_str(r#""server_id""#).unwrap();
        assert_eq!(identity, BookIdentity::ServerId);
    }
}
