//! Document store abstraction.
//!
//! The trait is the seam between the batch uploader and the concrete
//! Firestore client: implementors connect to a backing document database,
//! test code uses the generated mock.
//!
//! The trait is `Send + Sync` and intended for async/await usage.

use async_trait::async_trait;
use serde_json::{Map, Value};
use thiserror::Error;

#[cfg(any(test, feature = "test-export-mocks"))]
use mockall::automock;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid service account credentials: {0}")]
    InvalidCredentials(String),
    #[error("transport error talking to the document store: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("document store rejected the write ({status}): {body}")]
    Api {
        status: reqwest::StatusCode,
        body: String,
    },
}

/// Trait for writing documents into a named collection.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Write the full field set of the document `document_id` in
    /// `collection`, replacing any prior content stored under that id
    /// (last write wins).
    async fn put_document(
        &self,
        collection: &str,
        document_id: &str,
        fields: &Map<String, Value>,
    ) -> Result<(), StoreError>;
}
