//! Database connection and initialization.

use std::time::Duration;

use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;

use common::{AppResult, DatabaseConfig};

use super::mongo::MongoStore;

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    client: Client,
    database: mongodb::Database,
}

impl Database {
    /// Build a client for the configured URI and resolve the logical database.
    ///
    /// The driver connects lazily, so an unreachable server surfaces on the
    /// first operation rather than here.
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let mut options = ClientOptions::parse(&config.uri).await?;
        if let Some(app_name) = &config.app_name {
            options.app_name = Some(app_name.clone());
        }
        options.server_selection_timeout = Some(Duration::from_millis(config.connect_timeout_ms));

        let client = Client::with_options(options)?;
        let database = client.database(&config.database);
        tracing::info!(database = %config.database, "Database client initialized");

        Ok(Self { client, database })
    }

    /// Get a reference to the database handle.
    pub fn handle(&self) -> &mongodb::Database {
        &self.database
    }

    /// Document store over this database.
    pub fn store(&self) -> MongoStore {
        MongoStore::new(self.database.clone())
    }

    /// Check database connectivity with a `ping` command.
    pub async fn ping(&self) -> AppResult<()> {
        self.database.run_command(doc! { "ping": 1 }).await?;
        Ok(())
    }

    /// Close pooled connections.
    pub async fn shutdown(self) {
        self.client.shutdown().await;
    }
}
