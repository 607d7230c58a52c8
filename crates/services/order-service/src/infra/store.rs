//! The document store seam.
//!
//! Repositories talk to the database only through this trait. Errors come
//! back exactly as the backend produced them.

use async_trait::async_trait;
use mongodb::bson::{Bson, Document};

use common::AppResult;

use crate::query::{Filter, IndexSpec, Pipeline};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Collection-addressed document operations.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Store one document, returning its `_id` (generated when absent).
    async fn insert_one(&self, collection: &str, document: Document) -> AppResult<Bson>;

    /// First document matching the filter, if any
    async fn find_one(&self, collection: &str, filter: &Filter) -> AppResult<Option<Document>>;

    /// All documents matching the filter
    async fn find(&self, collection: &str, filter: &Filter) -> AppResult<Vec<Document>>;

    /// Run a pipeline and materialize every result document.
    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> AppResult<Vec<Document>>;

    /// Ensure an index exists, returning its name. Existing identical indexes are left alone.
    async fn create_index(&self, collection: &str, index: &IndexSpec) -> AppResult<String>;
}
