//! Command implementations shared by the binary and tests.
//!
//! Each command takes an explicit store handle; nothing here holds global state.

use std::sync::Arc;

use serde::Serialize;

use common::{AppResult, CollectionMap, OptionExt};
use domain::{EntityId, Message, Order, OrderGrouping, ORDER_STATUS_A, ORDER_STATUS_B};

use crate::config::{OrderServiceConfig, DEMO_MESSAGE};
use crate::infra::{Database, DocumentStore, MemoryStore};
use crate::repository::{
    CollectionAccess, OrderRepository, ReadRepository, Repository, WriteRepository,
};

/// An opened store plus the connection that owns it, if any.
pub struct Session {
    pub store: Arc<dyn DocumentStore>,
    pub collections: CollectionMap,
    database: Option<Database>,
}

impl Session {
    /// Connect to the configured database.
    pub async fn connect(config: &OrderServiceConfig) -> AppResult<Self> {
        let database = Database::connect(&config.database).await?;
        Ok(Self {
            store: Arc::new(database.store()),
            collections: config.collections.clone(),
            database: Some(database),
        })
    }

    /// Run against a fresh process-local store.
    pub fn in_memory(collections: CollectionMap) -> Self {
        Self {
            store: Arc::new(MemoryStore::new()),
            collections,
            database: None,
        }
    }

    /// Round-trip to the server. Always succeeds in memory.
    pub async fn ping(&self) -> AppResult<()> {
        match &self.database {
            Some(database) => database.ping().await,
            None => Ok(()),
        }
    }

    pub async fn close(self) {
        if let Some(database) = self.database {
            database.shutdown().await;
        }
    }
}

/// Outcome of [`run_demo`].
#[derive(Debug, Clone, Serialize)]
pub struct DemoReport {
    pub message: Message,
    pub totals: Vec<OrderGrouping>,
}

/// Insert a message, read it back, then aggregate order totals.
pub async fn run_demo(session: &Session) -> AppResult<DemoReport> {
    let messages: Repository<Message> =
        Repository::for_entity(session.store.clone(), &session.collections);

    let mut message = Message::new(DEMO_MESSAGE);
    let id = messages.insert(&mut message).await?;
    tracing::info!(%id, collection = messages.collection(), "Message inserted");

    let message = messages.get(id).await?.ok_or_not_found()?;

    let orders = OrderRepository::for_entity(session.store.clone(), &session.collections).await?;
    let totals = orders.aggregate().await?;

    Ok(DemoReport { message, totals })
}

/// Per-customer totals of status "A" orders.
pub async fn customer_totals(session: &Session) -> AppResult<Vec<OrderGrouping>> {
    let orders = OrderRepository::for_entity(session.store.clone(), &session.collections).await?;
    orders.aggregate().await
}

/// Orders matching the flagged-order filter.
pub async fn flagged_orders(session: &Session) -> AppResult<Vec<Order>> {
    let orders = OrderRepository::for_entity(session.store.clone(), &session.collections).await?;
    orders.find_flagged().await
}

/// Fetch a message by identifier. `None` when it does not exist.
pub async fn get_message(session: &Session, id: EntityId) -> AppResult<Option<Message>> {
    let messages: Repository<Message> =
        Repository::for_entity(session.store.clone(), &session.collections);
    messages.get(id).await
}

/// Sample orders used by `seed`.
pub fn sample_orders() -> Vec<Order> {
    vec![
        Order::new(1, 50, ORDER_STATUS_A),
        Order::new(1, 30, ORDER_STATUS_A),
        Order::new(2, 1000, ORDER_STATUS_A),
        Order::new(3, 5, ORDER_STATUS_B),
    ]
}

/// Insert the sample orders, returning their identifiers.
pub async fn seed_orders(session: &Session) -> AppResult<Vec<EntityId>> {
    let orders = OrderRepository::for_entity(session.store.clone(), &session.collections).await?;
    let mut ids = Vec::new();
    for mut order in sample_orders() {
        ids.push(orders.insert(&mut order).await?);
    }
    tracing::info!(count = ids.len(), collection = orders.collection(), "Orders seeded");
    Ok(ids)
}
