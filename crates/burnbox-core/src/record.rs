use crate::error::StorageError;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A paste as persisted in the key-value store.
///
/// Field names are part of the storage format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PasteRecord {
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub created_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ttl_seconds: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_views: Option<u64>,
    #[serde(default)]
    pub view_count: u64,
}

/// What a read at a given instant is allowed to do with a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadDecision {
    /// The time-to-live has elapsed; the record must be deleted.
    Expired,
    /// The view limit has been reached; the record must be deleted.
    Exhausted,
    /// The read may proceed and consume one view.
    Readable,
}

impl PasteRecord {
    pub fn new(
        content: impl Into<String>,
        created_at: Timestamp,
        ttl_seconds: Option<u64>,
        max_views: Option<u64>,
    ) -> Self {
        Self {
            content: content.into(),
            created_at: created_at.as_millisecond(),
            ttl_seconds,
            max_views,
            view_count: 0,
        }
    }

    pub fn decode(raw: &str) -> Result<Self, StorageError> {
        serde_json::from_str(raw)
            .map_err(|e| StorageError::InvalidData(format!("invalid paste record: {e}")))
    }

    pub fn encode(&self) -> Result<String, StorageError> {
        serde_json::to_string(self)
            .map_err(|e| StorageError::Serialization(format!("failed to encode paste record: {e}")))
    }

    /// Logical expiry in epoch milliseconds.
    ///
    /// Saturates instead of overflowing, so an absurd ttl simply never expires.
    pub fn expires_at_ms(&self) -> Option<i64> {
        self.ttl_seconds.map(|ttl| {
            let ttl_ms = i64::try_from(ttl).unwrap_or(i64::MAX).saturating_mul(1_000);
            self.created_at.saturating_add(ttl_ms)
        })
    }

    /// Logical expiry as a timestamp, if it is representable.
    pub fn expires_at(&self) -> Option<Timestamp> {
        self.expires_at_ms()
            .and_then(|ms| Timestamp::from_millisecond(ms).ok())
    }

    /// Decides the outcome of a read at `now`. TTL is checked before views.
    pub fn decide(&self, now: Timestamp) -> ReadDecision {
        let now_ms = now.as_millisecond();
        if self.expires_at_ms().is_some_and(|expiry| now_ms >= expiry) {
            return ReadDecision::Expired;
        }
        if self.max_views.is_some_and(|max| self.view_count >= max) {
            return ReadDecision::Exhausted;
        }
        ReadDecision::Readable
    }

    /// The record after one more successful view.
    pub fn consumed(&self) -> Self {
        Self {
            view_count: self.view_count.saturating_add(1),
            ..self.clone()
        }
    }

    /// Views left after the current count, never negative.
    pub fn remaining_views(&self) -> Option<u64> {
        self.max_views
            .map(|max| max.saturating_sub(self.view_count))
    }

    /// Store-native expiry to use when rewriting the record at `now`:
    /// the remaining logical lifetime rounded up to whole seconds, at least one.
    pub fn remaining_ttl(&self, now: Timestamp) -> Option<Duration> {
        self.expires_at_ms().map(|expiry| {
            let remaining_ms = expiry.saturating_sub(now.as_millisecond());
            let secs = remaining_ms.saturating_add(999).div_euclid(1_000).max(1);
            Duration::from_secs(secs.unsigned_abs())
        })
    }
}
