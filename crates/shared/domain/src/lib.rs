//! Domain layer - Core entities and value objects.
//!
//! This crate contains pure domain logic with no infrastructure dependencies.
//! Entities here are shared by every repository through the [`Entity`] contract.

pub mod constants;
pub mod entity;
pub mod error;
pub mod message;
pub mod order;

pub use constants::*;
pub use entity::{parse_entity_id, Entity, EntityId};
pub use error::{DomainError, DomainResult};
pub use message::Message;
pub use order::{Order, OrderGrouping};
