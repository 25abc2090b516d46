//! In-memory store for `passage`.
//!
//! Backs the [`passage_core::store`] traits with `RwLock`-guarded tables,
//! enforcing the same uniqueness constraints a relational schema would.
//! Intended for tests and local development.

mod store;

pub use store::{MemorySessionStore, MemoryStore};
