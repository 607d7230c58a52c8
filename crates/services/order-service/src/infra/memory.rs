//! Process-local document store.
//!
//! Evaluates filters and pipelines in memory with the same observable
//! semantics as the MongoDB backend for the operators the query model
//! supports. Used for `--memory` runs and tests.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use tokio::sync::RwLock;

use common::{AppError, AppResult};
use domain::FIELD_ID;

use super::store::DocumentStore;
use crate::query::{
    lookup, sort_cmp, values_equal, Accumulator, Filter, IndexSpec, Pipeline, SortDirection, Stage,
};

#[derive(Default)]
struct MemoryCollection {
    documents: Vec<Document>,
    indexes: Vec<IndexSpec>,
}

/// In-memory document store. Clones share the same data.
#[derive(Clone, Default)]
pub struct MemoryStore {
    collections: Arc<RwLock<HashMap<String, MemoryCollection>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Names of the indexes created on a collection
    pub async fn index_names(&self, collection: &str) -> Vec<String> {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.indexes.iter().map(IndexSpec::name).collect())
            .unwrap_or_default()
    }

    /// Number of documents in a collection
    pub async fn count(&self, collection: &str) -> usize {
        let collections = self.collections.read().await;
        collections
            .get(collection)
            .map(|c| c.documents.len())
            .unwrap_or(0)
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_one(&self, collection: &str, document: Document) -> AppResult<Bson> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();

        let (id, document) = match document.get(FIELD_ID) {
            Some(id) => {
                let id = id.clone();
                let duplicate = target
                    .documents
                    .iter()
                    .filter_map(|existing| existing.get(FIELD_ID))
                    .any(|existing| values_equal(existing, &id));
                if duplicate {
                    return Err(AppError::conflict(format!("{} document {}", collection, id)));
                }
                (id, document)
            }
            None => {
                let id = Bson::ObjectId(ObjectId::new());
                let mut stored = Document::new();
                stored.insert(FIELD_ID, id.clone());
                for (field, value) in document {
                    stored.insert(field, value);
                }
                (id, stored)
            }
        };

        target.documents.push(document);
        tracing::debug!(collection, %id, "insert_one (memory)");
        Ok(id)
    }

    async fn find_one(&self, collection: &str, filter: &Filter) -> AppResult<Option<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .and_then(|c| c.documents.iter().find(|doc| filter.matches(doc)))
            .cloned())
    }

    async fn find(&self, collection: &str, filter: &Filter) -> AppResult<Vec<Document>> {
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| {
                c.documents
                    .iter()
                    .filter(|doc| filter.matches(doc))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }

    async fn aggregate(&self, collection: &str, pipeline: &Pipeline) -> AppResult<Vec<Document>> {
        tracing::debug!(collection, %pipeline, "aggregate (memory)");
        let documents = {
            let collections = self.collections.read().await;
            collections
                .get(collection)
                .map(|c| c.documents.clone())
                .unwrap_or_default()
        };
        run_pipeline(documents, pipeline)
    }

    async fn create_index(&self, collection: &str, index: &IndexSpec) -> AppResult<String> {
        let mut collections = self.collections.write().await;
        let target = collections.entry(collection.to_string()).or_default();
        if !target.indexes.contains(index) {
            target.indexes.push(index.clone());
            tracing::info!(collection, index = %index.name(), "Index ensured (memory)");
        }
        Ok(index.name())
    }
}

/// Apply every stage in order.
fn run_pipeline(mut documents: Vec<Document>, pipeline: &Pipeline) -> AppResult<Vec<Document>> {
    for stage in pipeline.stages() {
        documents = match stage {
            Stage::Match(filter) => documents
                .into_iter()
                .filter(|doc| filter.matches(doc))
                .collect(),
            Stage::Group { key, accumulators } => group(documents, key, accumulators),
            Stage::Sort(keys) => {
                documents.sort_by(|a, b| {
                    keys.iter()
                        .map(|(field, direction)| {
                            let ordering = sort_cmp(lookup(a, field), lookup(b, field));
                            match direction {
                                SortDirection::Ascending => ordering,
                                SortDirection::Descending => ordering.reverse(),
                            }
                        })
                        .find(|ordering| *ordering != Ordering::Equal)
                        .unwrap_or(Ordering::Equal)
                });
                documents
            }
            Stage::Skip(n) => documents
                .into_iter()
                .skip(usize::try_from(*n).unwrap_or(usize::MAX))
                .collect(),
            Stage::Limit(0) => {
                return Err(AppError::validation("the limit must be positive"));
            }
            Stage::Limit(n) => {
                documents.truncate(usize::try_from(*n).unwrap_or(usize::MAX));
                documents
            }
        };
    }
    Ok(documents)
}

/// Groups are emitted in the order their key was first seen.
fn group(documents: Vec<Document>, key: &str, accumulators: &[(String, Accumulator)]) -> Vec<Document> {
    let mut groups: Vec<(Bson, Vec<Sum>)> = Vec::new();

    for doc in &documents {
        let group_key = lookup(doc, key).cloned().unwrap_or(Bson::Null);
        let position = match groups.iter().position(|(k, _)| values_equal(k, &group_key)) {
            Some(position) => position,
            None => {
                groups.push((group_key, vec![Sum::default(); accumulators.len()]));
                groups.len() - 1
            }
        };

        let sums = &mut groups[position].1;
        for (sum, (_, accumulator)) in sums.iter_mut().zip(accumulators) {
            match accumulator {
                Accumulator::Sum(field) => {
                    if let Some(value) = lookup(doc, field) {
                        sum.add(value);
                    }
                }
            }
        }
    }

    groups
        .into_iter()
        .map(|(group_key, sums)| {
            let mut out = Document::new();
            out.insert(FIELD_ID, group_key);
            for ((output, _), sum) in accumulators.iter().zip(sums) {
                out.insert(output.clone(), sum.finish());
            }
            out
        })
        .collect()
}

/// Running `$sum`: stays a 32-bit integer while every input is one and the
/// total fits, widens to 64 bits, then to double.
#[derive(Debug, Clone, Default)]
struct Sum {
    integer: i64,
    fraction: f64,
    wide: bool,
    double: bool,
}

impl Sum {
    fn add(&mut self, value: &Bson) {
        match value {
            Bson::Int32(v) => self.add_integer(i64::from(*v)),
            Bson::Int64(v) => {
                self.wide = true;
                self.add_integer(*v);
            }
            Bson::Double(v) => {
                self.double = true;
                self.fraction += v;
            }
            _ => {}
        }
    }

    fn add_integer(&mut self, v: i64) {
        match self.integer.checked_add(v) {
            Some(total) => self.integer = total,
            None => {
                self.double = true;
                self.fraction += v as f64;
            }
        }
    }

    fn finish(self) -> Bson {
        if self.double {
            // Once a double is involved the total is a double, as on the server.
            return Bson::Double(self.integer as f64 + self.fraction);
        }
        match i32::try_from(self.integer) {
            Ok(total) if !self.wide => Bson::Int32(total),
            _ => Bson::Int64(self.integer),
        }
    }
}
