//! Order Service Library
//!
//! Typed repositories over a document database: a generic insert/get
//! repository for any [`domain::Entity`] and an order repository that
//! aggregates per-customer totals.
//!
//! # Layers
//!
//! - **query**: filter, pipeline and index descriptors
//! - **infra**: document store backends (MongoDB, in-memory) and connection handling
//! - **repository**: generic and order repositories
//! - **commands**: operations run by the CLI
//! - **config**: environment configuration and constants

pub mod commands;
pub mod config;
pub mod infra;
pub mod query;
pub mod repository;

pub use commands::Session;
pub use config::OrderServiceConfig;
pub use infra::{Database, DocumentStore, MemoryStore, MongoStore};
pub use repository::{OrderRepository, Repository};
