use async_trait::async_trait;
use burnbox_core::store::{expiry_seconds, KeyValueStore, Result};
use burnbox_core::StorageError;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, trace, warn};

/// Default namespace for every key this store touches.
pub const DEFAULT_KEY_PREFIX: &str = "burnbox:";

/// Swaps the value only if it still equals the one the caller read.
/// ARGV: expected, new value, expiry seconds (`0` for none).
const COMPARE_AND_SET_SCRIPT: &str = r#"
if redis.call('GET', KEYS[1]) ~= ARGV[1] then
  return 0
end
if ARGV[3] == '0' then
  redis.call('SET', KEYS[1], ARGV[2])
else
  redis.call('SET', KEYS[1], ARGV[2], 'EX', ARGV[3])
end
return 1
"#;

/// A Redis-backed [`KeyValueStore`].
///
/// All keys are namespaced with a configurable prefix. Expiry is delegated to
/// Redis `EX`, and compare-and-set runs as a server-side script so the
/// read-compare-write happens atomically.
#[derive(Clone)]
pub struct RedisStore {
    conn: redis::aio::MultiplexedConnection,
    key_prefix: String,
}

fn map_redis_error(operation: &str, err: redis::RedisError) -> StorageError {
    let message = format!("{operation}: {err}");
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("timed out") {
        StorageError::Timeout(message)
    } else if lowered.contains("connection refused") || lowered.contains("broken pipe") {
        StorageError::Unavailable(message)
    } else {
        StorageError::Operation(message)
    }
}

impl RedisStore {
    /// Creates a new Redis store with a custom key prefix.
    ///
    /// # Arguments
    ///
    /// * `conn` - A multiplexed Redis connection
    /// * `key_prefix` - Custom prefix for keys (e.g., "myapp:")
    pub fn with_prefix(
        conn: redis::aio::MultiplexedConnection,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            conn,
            key_prefix: key_prefix.into(),
        }
    }

    /// Opens a client for `url` and establishes a multiplexed connection.
    pub async fn connect(url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| StorageError::Unavailable(format!("invalid redis url: {e}")))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StorageError::Unavailable(format!("failed to connect to redis: {e}")))?;
        debug!("connected to redis");
        Ok(Self::with_prefix(conn, key_prefix))
    }

    fn namespaced(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("key_prefix", &self.key_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let key = self.namespaced(key);
        trace!(key = %key, "GET");

        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(&key).await.map_err(|e| {
            warn!(key = %key, error = %e, "Redis error on get");
            map_redis_error("failed to fetch value from Redis", e)
        })
    }

    async fn set(&self, key: &str, value: &str, expiry: Option<Duration>) -> Result<()> {
        let key = self.namespaced(key);
        trace!(key = %key, ?expiry, "SET");

        let mut conn = self.conn.clone();
        let result = match expiry {
            Some(ttl) => {
                conn.set_ex::<_, _, ()>(&key, value, expiry_seconds(ttl))
                    .await
            }
            None => conn.set::<_, _, ()>(&key, value).await,
        };

        result.map_err(|e| {
            warn!(key = %key, error = %e, "Redis error on set");
            map_redis_error("failed to write value to Redis", e)
        })
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        expiry: Option<Duration>,
    ) -> Result<bool> {
        let key = self.namespaced(key);
        trace!(key = %key, ?expiry, "SET NX");

        let mut cmd = redis::cmd("SET");
        cmd.arg(&key).arg(value).arg("NX");
        if let Some(ttl) = expiry {
            cmd.arg("EX").arg(expiry_seconds(ttl));
        }

        let mut conn = self.conn.clone();
        let reply: Option<String> = cmd.query_async(&mut conn).await.map_err(|e| {
            warn!(key = %key, error = %e, "Redis error on conditional set");
            map_redis_error("failed to conditionally write value to Redis", e)
        })?;

        Ok(reply.is_some())
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        expiry: Option<Duration>,
    ) -> Result<bool> {
        let key = self.namespaced(key);
        trace!(key = %key, ?expiry, "compare-and-set");

        let expiry_arg = expiry.map_or(0, expiry_seconds);
        let mut conn = self.conn.clone();
        let swapped: i64 = redis::cmd("EVAL")
            .arg(COMPARE_AND_SET_SCRIPT)
            .arg(1)
            .arg(&key)
            .arg(expected)
            .arg(value)
            .arg(expiry_arg)
            .query_async(&mut conn)
            .await
            .map_err(|e| {
                warn!(key = %key, error = %e, "Redis error on compare-and-set");
                map_redis_error("failed to compare-and-set value in Redis", e)
            })?;

        Ok(swapped == 1)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        let key = self.namespaced(key);
        trace!(key = %key, "DEL");

        let mut conn = self.conn.clone();
        let removed = conn.del::<_, i64>(&key).await.map_err(|e| {
            warn!(key = %key, error = %e, "Redis error on delete");
            map_redis_error("failed to delete value from Redis", e)
        })?;

        Ok(removed > 0)
    }
}
