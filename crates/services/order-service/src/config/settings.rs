//! Service settings loaded from environment variables.

use std::env;

use common::{AppResult, CollectionMap, DatabaseConfig};

use super::constants::{
    DEFAULT_APP_NAME, DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_DATABASE_NAME, DEFAULT_MONGODB_URI,
};

/// Order service configuration.
#[derive(Debug, Clone)]
pub struct OrderServiceConfig {
    /// Connection settings
    pub database: DatabaseConfig,
    /// Entity kind to collection mapping
    pub collections: CollectionMap,
}

impl OrderServiceConfig {
    /// Load configuration from environment variables (and `.env`).
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let collections = match lookup("COLLECTIONS") {
            Some(raw) => CollectionMap::parse(&raw)?,
            None => CollectionMap::new(),
        };

        Ok(Self {
            database: DatabaseConfig {
                uri: lookup("MONGODB_URI").unwrap_or_else(|| DEFAULT_MONGODB_URI.to_string()),
                database: lookup("MONGODB_DATABASE")
                    .unwrap_or_else(|| DEFAULT_DATABASE_NAME.to_string()),
                app_name: Some(
                    lookup("MONGODB_APP_NAME").unwrap_or_else(|| DEFAULT_APP_NAME.to_string()),
                ),
                connect_timeout_ms: lookup("MONGODB_CONNECT_TIMEOUT_MS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_CONNECT_TIMEOUT_MS),
            },
            collections,
        })
    }
}

impl Default for OrderServiceConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig {
                uri: DEFAULT_MONGODB_URI.to_string(),
                database: DEFAULT_DATABASE_NAME.to_string(),
                app_name: Some(DEFAULT_APP_NAME.to_string()),
                connect_timeout_ms: DEFAULT_CONNECT_TIMEOUT_MS,
            },
            collections: CollectionMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| vars.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = OrderServiceConfig::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(config.database.uri, DEFAULT_MONGODB_URI);
        assert_eq!(config.database.database, "testdb");
        assert_eq!(config.database.connect_timeout_ms, DEFAULT_CONNECT_TIMEOUT_MS);
        assert_eq!(config.collections.resolve("Order"), "Order");
    }

    #[test]
    fn test_reads_overrides() {
        let config = OrderServiceConfig::from_lookup(lookup_from(&[
            ("MONGODB_URI", "mongodb://db:27017"),
            ("MONGODB_DATABASE", "shop"),
            ("MONGODB_CONNECT_TIMEOUT_MS", "250"),
            ("COLLECTIONS", "Order=orders"),
        ]))
        .unwrap();

        assert_eq!(config.database.uri, "mongodb://db:27017");
        assert_eq!(config.database.database, "shop");
        assert_eq!(config.database.connect_timeout_ms, 250);
        assert_eq!(config.collections.resolve("Order"), "orders");
    }

    #[test]
    fn test_bad_collection_mapping_is_an_error() {
        let result = OrderServiceConfig::from_lookup(lookup_from(&[("COLLECTIONS", "Order")]));
        assert!(result.is_err());
    }
}
