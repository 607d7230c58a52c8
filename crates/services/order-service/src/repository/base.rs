//! Base repository traits and the generic repository.
//!
//! Read and write operations live in separate traits with default
//! implementations, so any type that can name its store and collection gets
//! them for free.

use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use mongodb::bson::{self, Bson};

use common::{AppError, AppResult, CollectionMap};
use domain::{Entity, EntityId};

use crate::infra::DocumentStore;
use crate::query::Filter;

/// Access to the backing store and collection.
pub trait CollectionAccess: Send + Sync {
    /// Get the document store
    fn store(&self) -> &dyn DocumentStore;

    /// Name of the backing collection
    fn collection(&self) -> &str;
}

/// Read operations (Query)
#[async_trait]
pub trait ReadRepository<E: Entity>: CollectionAccess {
    /// Find entity by identifier. Absence is `Ok(None)`, not an error.
    async fn get(&self, id: EntityId) -> AppResult<Option<E>> {
        let filter = Filter::id(id);
        let document = self.store().find_one(self.collection(), &filter).await?;
        let entity = document.map(bson::from_document::<E>).transpose()?;
        Ok(entity)
    }

    /// Find all entities matching a filter
    async fn find(&self, filter: &Filter) -> AppResult<Vec<E>> {
        let documents = self.store().find(self.collection(), filter).await?;
        documents
            .into_iter()
            .map(|doc| bson::from_document::<E>(doc).map_err(AppError::from))
            .collect()
    }
}

/// Write operations (Command)
#[async_trait]
pub trait WriteRepository<E: Entity>: CollectionAccess {
    /// Insert an entity and record its identifier on it.
    ///
    /// There is no uniqueness pre-check; the store decides on collisions.
    async fn insert(&self, entity: &mut E) -> AppResult<EntityId> {
        let document = bson::to_document(&*entity)?;
        tracing::debug!(
            collection = self.collection(),
            caller_assigned_id = entity.id().is_some(),
            "Inserting entity"
        );

        let id = match self.store().insert_one(self.collection(), document).await? {
            Bson::ObjectId(id) => id,
            other => {
                return Err(AppError::internal(format!(
                    "store returned a non-ObjectId identifier: {}",
                    other
                )))
            }
        };

        entity.set_id(id);
        Ok(id)
    }
}

/// Generic repository over one collection.
pub struct Repository<E: Entity> {
    store: Arc<dyn DocumentStore>,
    collection: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Repository<E> {
    /// Create a repository over an explicitly named collection.
    pub fn new(store: Arc<dyn DocumentStore>, collection: impl Into<String>) -> Self {
        Self {
            store,
            collection: collection.into(),
            _entity: PhantomData,
        }
    }

    /// Create a repository over the collection configured for `E::KIND`.
    pub fn for_entity(store: Arc<dyn DocumentStore>, collections: &CollectionMap) -> Self {
        Self::new(store, collections.resolve(E::KIND))
    }
}

impl<E: Entity> CollectionAccess for Repository<E> {
    fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    fn collection(&self) -> &str {
        &self.collection
    }
}

impl<E: Entity> ReadRepository<E> for Repository<E> {}

impl<E: Entity> WriteRepository<E> for Repository<E> {}
