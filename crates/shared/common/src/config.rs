//! Shared configuration structures.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Document database connection settings.
#[derive(Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Connection string, e.g. `mongodb://localhost:27017`
    pub uri: String,
    /// Logical database name
    pub database: String,
    /// Application name reported to the server
    pub app_name: Option<String>,
    /// Server selection timeout in milliseconds
    pub connect_timeout_ms: u64,
}

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("uri", &"[REDACTED]")
            .field("database", &self.database)
            .field("app_name", &self.app_name)
            .field("connect_timeout_ms", &self.connect_timeout_ms)
            .finish()
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            uri: "mongodb://localhost:27017".to_string(),
            database: "testdb".to_string(),
            app_name: None,
            connect_timeout_ms: 5000,
        }
    }
}

/// Mapping from entity kind to the collection that stores it.
///
/// Kinds without an entry are stored in a collection named after the kind.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct CollectionMap {
    overrides: HashMap<String, String>,
}

impl CollectionMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `Kind=collection` pairs separated by commas.
    ///
    /// Blank input yields an empty map.
    pub fn parse(raw: &str) -> AppResult<Self> {
        let mut map = Self::new();
        for pair in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
            let (kind, collection) = pair.split_once('=').ok_or_else(|| {
                AppError::validation(format!("collection mapping '{}' must be Kind=collection", pair))
            })?;
            let (kind, collection) = (kind.trim(), collection.trim());
            if kind.is_empty() || collection.is_empty() {
                return Err(AppError::validation(format!(
                    "collection mapping '{}' has an empty side",
                    pair
                )));
            }
            map.overrides.insert(kind.to_string(), collection.to_string());
        }
        Ok(map)
    }

    /// Builder-style override for a single kind.
    pub fn with(mut self, kind: impl Into<String>, collection: impl Into<String>) -> Self {
        self.overrides.insert(kind.into(), collection.into());
        self
    }

    /// Collection name for an entity kind.
    pub fn resolve(&self, kind: &str) -> String {
        self.overrides
            .get(kind)
            .cloned()
            .unwrap_or_else(|| kind.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_falls_back_to_kind() {
        let map = CollectionMap::new();
        assert_eq!(map.resolve("Order"), "Order");
    }

    #[test]
    fn test_parse_overrides() {
        let map = CollectionMap::parse(" Order=orders , MyClass=messages,").unwrap();
        assert_eq!(map.resolve("Order"), "orders");
        assert_eq!(map.resolve("MyClass"), "messages");
        assert_eq!(map.resolve("Other"), "Other");
    }

    #[test]
    fn test_parse_rejects_malformed_pairs() {
        assert!(CollectionMap::parse("Order").is_err());
        assert!(CollectionMap::parse("Order=").is_err());
        assert!(CollectionMap::parse("=orders").is_err());
    }

    #[test]
    fn test_database_config_debug_redacts_uri() {
        let config = DatabaseConfig {
            uri: "mongodb://user:secret@db:27017".to_string(),
            ..DatabaseConfig::default()
        };
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("testdb"));
    }
}
