use crate::error::StorageError;
use async_trait::async_trait;
use std::time::Duration;

pub type Result<T> = std::result::Result<T, StorageError>;

/// A string key-value store with optional per-key expiry.
///
/// Expiry is a cleanup hint only: callers must not rely on a key vanishing at
/// an exact instant. Durations are rounded up to whole seconds by backends
/// that only support second granularity.
#[async_trait]
pub trait KeyValueStore: Send + Sync + 'static {
    /// Returns the value for `key`, or `None` if it is absent or expired.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: &str, expiry: Option<Duration>) -> Result<()>;

    /// Stores `value` only if `key` is absent. Returns `true` if written.
    async fn set_if_absent(&self, key: &str, value: &str, expiry: Option<Duration>)
        -> Result<bool>;

    /// Atomically replaces the value of `key` with `value` if its current
    /// value is exactly `expected`. Returns `true` if the swap happened.
    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        expiry: Option<Duration>,
    ) -> Result<bool>;

    /// Removes `key`. Returns `true` if it existed.
    ///
    /// It is not an error if the key does not exist.
    async fn del(&self, key: &str) -> Result<bool>;
}

/// Whole seconds to hand to a second-granularity backend, rounded up and
/// never below one.
pub fn expiry_seconds(expiry: Duration) -> u64 {
    let secs = expiry.as_secs() + u64::from(expiry.subsec_nanos() > 0);
    secs.max(1)
}
