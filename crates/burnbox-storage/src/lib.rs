//! Key-value store backends for Burnbox.
//!
//! [`RedisStore`] is the durable production backend. [`InMemoryStore`] keeps
//! everything in process memory and is meant for local development and tests.

pub mod memory;
pub mod redis;

pub use burnbox_core::{KeyValueStore, StorageError};
pub use memory::InMemoryStore;
pub use self::redis::RedisStore;
