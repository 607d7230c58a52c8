//! MongoDB-backed document store.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{Bson, Document};
use mongodb::options::AggregateOptions;
use mongodb::{Collection, IndexModel};

use common::AppResult;

use super::store::DocumentStore;
use crate::query::{Filter, IndexSpec, Pipeline};

/// Document store over a driver database handle.
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: mongodb::Database,
}

impl MongoStore {
    pub fn new(database: mongodb::Database) -> Self {
        Self { database }
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn insert_one(&self, collection: &str, document: Document) -> AppResult<Bson> {
        tracing::debug!(collection, "insert_one");
        let result = self.collection(collection).insert_one(document).await?;
        Ok(result.inserted_id)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> AppResult<Option<Document>> {
        tracing::debug!(collection, %filter, "find_one");
        let document = self
            .collection(collection)
            .find_one(filter.to_document())
            .await?;
        Ok(document)
    }

    async fn find(&self, collection: &str, filter: &Filter) -> AppResult<Vec<Document>> {
        tracing::debug!(collection, %filter, "find");
        let cursor = self.collection(collection).find(filter.to_document()).await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> AppResult<Vec<Document>> {
        tracing::debug!(collection, %pipeline, allow_disk_use = pipeline.allows_disk_use(), "aggregate");
        let options = AggregateOptions::builder()
            .allow_disk_use(pipeline.allows_disk_use())
            .build();
        let cursor = self
            .collection(collection)
            .aggregate(pipeline.to_documents())
            .with_options(options)
            .await?;
        let documents: Vec<Document> = cursor.try_collect().await?;
        Ok(documents)
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> AppResult<String> {
        let model = IndexModel::builder().keys(index.keys()).build();
        let result = self.collection(collection).create_index(model).await?;
        tracing::info!(collection, index = %result.index_name, "Index ensured");
        Ok(result.index_name)
    }
}
