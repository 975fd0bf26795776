//! Disposable infrastructure for integration tests.

pub mod redis;

pub use self::redis::{RedisServer, RedisServerError};
