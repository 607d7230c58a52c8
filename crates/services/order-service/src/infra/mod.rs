//! Infrastructure layer - document store backends and connection handling.

mod db;
mod memory;
mod mongo;
mod store;

pub use db::Database;
pub use memory::MemoryStore;
pub use mongo::MongoStore;
pub use store::DocumentStore;

#[cfg(any(test, feature = "test-utils"))]
pub use store::MockDocumentStore;
