//! Word resource
//!
//! A single required `value`, stored remotely under `/words`. The identifier
//! is opaque and issued by the service.

use super::reconciler::{Reconciler, ResourceKind};
use super::schema::{FieldDef, ResourceDef};
use crate::api::ServiceClient;
use crate::error::{ReconcileError, Result};
use serde::{Deserialize, Serialize};

pub const WORD_COLLECTION: &str = "words";

/// Desired or confirmed state of a word
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Word {
    pub value: String,
}

impl Word {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WordRequest {
    pub word: String,
}

#[derive(Debug, Deserialize)]
pub struct WordResponse {
    pub id: String,
    pub word: String,
}

pub fn word_definition() -> ResourceDef {
    ResourceDef {
        name: "word",
        collection: WORD_COLLECTION,
        fields: vec![FieldDef::identifier("id"), FieldDef::required("value")],
    }
}

#[derive(Debug, Clone)]
pub struct WordKind {
    definition: ResourceDef,
}

impl WordKind {
    pub fn new() -> Self {
        Self {
            definition: word_definition(),
        }
    }
}

impl Default for WordKind {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceKind for WordKind {
    type Record = Word;
    type Request = WordRequest;
    type Response = WordResponse;

    fn definition(&self) -> &ResourceDef {
        &self.definition
    }

    fn encode(&self, desired: &mut Word) -> Result<WordRequest> {
        if desired.value.is_empty() {
            return Err(ReconcileError::InvalidDesired {
                field: "value",
                reason: "word is required".to_string(),
            });
        }
        Ok(WordRequest {
            word: desired.value.clone(),
        })
    }

    fn decode(&self, response: WordResponse) -> (String, Word) {
        (response.id, Word::new(response.word))
    }
}

pub type WordReconciler = Reconciler<WordKind>;

impl WordReconciler {
    pub fn words(client: ServiceClient) -> Self {
        Reconciler::new(WordKind::new(), client)
    }
}
