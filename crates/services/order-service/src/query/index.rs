//! Structured index descriptors.

use mongodb::bson::Document;

use super::SortDirection;

/// One indexed field and its direction.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexKey {
    pub field: String,
    pub direction: SortDirection,
}

/// An index definition: a non-empty, ordered list of keys.
///
/// Built from typed parts only, so there is no index syntax to get wrong.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IndexSpec {
    keys: Vec<IndexKey>,
}

impl IndexSpec {
    pub fn new(field: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            keys: vec![IndexKey {
                field: field.into(),
                direction,
            }],
        }
    }

    pub fn ascending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Ascending)
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self::new(field, SortDirection::Descending)
    }

    /// Append another key to build a compound index.
    pub fn then(mut self, field: impl Into<String>, direction: SortDirection) -> Self {
        self.keys.push(IndexKey {
            field: field.into(),
            direction,
        });
        self
    }

    pub fn key_fields(&self) -> &[IndexKey] {
        &self.keys
    }

    /// Key document, e.g. `{ "Status": 1 }`.
    pub fn keys(&self) -> Document {
        let mut doc = Document::new();
        for key in &self.keys {
            doc.insert(key.field.clone(), key.direction);
        }
        doc
    }

    /// Default index name the server assigns, e.g. `Status_1`.
    pub fn name(&self) -> String {
        self.keys
            .iter()
            .map(|key| format!("{}_{}", key.field, key.direction))
            .collect::<Vec<_>>()
            .join("_")
    }
}
