//! The identifiable-record contract.
//!
//! Any type stored through a repository implements [`Entity`]. The identifier
//! is persisted as `_id` and left out of the document while unset, so the
//! store assigns one on insert.

use bson::oid::ObjectId;
use serde::{de::DeserializeOwned, Serialize};

use crate::error::{DomainError, DomainResult};

/// Globally unique record identifier.
pub type EntityId = ObjectId;

/// A storable record with a unique identifier.
pub trait Entity: Serialize + DeserializeOwned + Send + Sync + Unpin + 'static {
    /// Logical kind of the entity, mapped to a collection by configuration.
    const KIND: &'static str;

    /// Identifier, `None` until assigned by the caller or the store.
    fn id(&self) -> Option<EntityId>;

    /// Record the identifier. Only called once, right after insert.
    fn set_id(&mut self, id: EntityId);
}

/// Parse a 24 character hex identifier.
pub fn parse_entity_id(raw: &str) -> DomainResult<EntityId> {
    ObjectId::parse_str(raw.trim()).map_err(|e| DomainError::InvalidId {
        raw: raw.to_string(),
        reason: e.to_string(),
    })
}
