use async_trait::async_trait;
use burnbox_core::store::{KeyValueStore, Result};
use dashmap::mapref::entry::Entry as MapEntry;
use dashmap::DashMap;
use jiff::{SignedDuration, Timestamp};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Clone)]
struct Entry {
    value: String,
    expire_at: Option<Timestamp>,
}

impl Entry {
    fn new(value: &str, expiry: Option<Duration>) -> Self {
        let expire_at = expiry.map(|ttl| {
            let ttl = SignedDuration::try_from(ttl).unwrap_or(SignedDuration::MAX);
            Timestamp::now().checked_add(ttl).unwrap_or(Timestamp::MAX)
        });
        Self {
            value: value.to_owned(),
            expire_at,
        }
    }

    fn is_expired(&self, now: Timestamp) -> bool {
        self.expire_at.is_some_and(|expire_at| now >= expire_at)
    }
}

/// In-memory implementation of [`KeyValueStore`] using DashMap.
///
/// Expired entries are evicted lazily on access and in bulk by
/// [`purge_expired`](Self::purge_expired). Conditional writes hold the shard
/// lock for their key, so they are atomic with respect to each other.
/// Nothing survives a restart.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    storage: DashMap<String, Entry>,
}

impl InMemoryStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self {
            storage: DashMap::new(),
        }
    }

    /// Number of entries currently held, including not-yet-evicted expired ones.
    pub fn len(&self) -> usize {
        self.storage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.storage.is_empty()
    }

    /// Drops every expired entry and returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = Timestamp::now();
        let before = self.storage.len();
        self.storage.retain(|_, entry| !entry.is_expired(now));
        let purged = before.saturating_sub(self.storage.len());
        if purged > 0 {
            debug!(purged, "purged expired entries from in-memory store");
        }
        purged
    }
}

#[async_trait]
impl KeyValueStore for InMemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let Some(entry) = self.storage.get(key) else {
            return Ok(None);
        };

        if entry.is_expired(Timestamp::now()) {
            drop(entry);
            self.storage
                .remove_if(key, |_, entry| entry.is_expired(Timestamp::now()));
            return Ok(None);
        }

        Ok(Some(entry.value.clone()))
    }

    async fn set(&self, key: &str, value: &str, expiry: Option<Duration>) -> Result<()> {
        self.storage.insert(key.to_owned(), Entry::new(value, expiry));
        Ok(())
    }

    async fn set_if_absent(
        &self,
        key: &str,
        value: &str,
        expiry: Option<Duration>,
    ) -> Result<bool> {
        match self.storage.entry(key.to_owned()) {
            MapEntry::Occupied(mut occupied) => {
                // An expired entry counts as absent.
                if occupied.get().is_expired(Timestamp::now()) {
                    occupied.insert(Entry::new(value, expiry));
                    Ok(true)
                } else {
                    Ok(false)
                }
            }
            MapEntry::Vacant(vacant) => {
                vacant.insert(Entry::new(value, expiry));
                Ok(true)
            }
        }
    }

    async fn compare_and_set(
        &self,
        key: &str,
        expected: &str,
        value: &str,
        expiry: Option<Duration>,
    ) -> Result<bool> {
        let Some(mut entry) = self.storage.get_mut(key) else {
            return Ok(false);
        };

        if entry.is_expired(Timestamp::now()) || entry.value != expected {
            return Ok(false);
        }

        *entry = Entry::new(value, expiry);
        Ok(true)
    }

    async fn del(&self, key: &str) -> Result<bool> {
        Ok(self.storage.remove(key).is_some())
    }
}
