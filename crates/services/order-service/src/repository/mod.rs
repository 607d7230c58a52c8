//! Repository layer - Data access abstraction
//!
//! Repositories give each entity type a typed façade over one collection.

mod base;
mod order_repository;

pub use base::{CollectionAccess, ReadRepository, Repository, WriteRepository};
pub use order_repository::OrderRepository;
