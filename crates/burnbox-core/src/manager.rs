use crate::error::PasteError;
use crate::paste_id::PasteId;
use async_trait::async_trait;
use jiff::{SignedDuration, Timestamp};

type Result<T> = std::result::Result<T, PasteError>;

/// Parameters for creating a paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub content: String,
    pub ttl_seconds: Option<u64>,
    pub max_views: Option<u64>,
}

impl NewPaste {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            ttl_seconds: None,
            max_views: None,
        }
    }

    pub fn with_ttl_seconds(mut self, ttl_seconds: u64) -> Self {
        self.ttl_seconds = Some(ttl_seconds);
        self
    }

    pub fn with_max_views(mut self, max_views: u64) -> Self {
        self.max_views = Some(max_views);
        self
    }

    /// Checks the create preconditions for a paste created at `now`.
    pub fn validate(&self, max_content_bytes: usize, now: Timestamp) -> Result<()> {
        if self.content.trim().is_empty() {
            return Err(PasteError::validation(
                "content",
                "content is required and must be a non-empty string",
            ));
        }

        if self.content.len() > max_content_bytes {
            return Err(PasteError::validation(
                "content",
                format!("content exceeds the maximum size of {max_content_bytes} bytes"),
            ));
        }

        if let Some(ttl) = self.ttl_seconds {
            if ttl < 1 {
                return Err(PasteError::validation(
                    "ttl_seconds",
                    "ttl_seconds must be an integer >= 1",
                ));
            }
            let representable = i64::try_from(ttl)
                .ok()
                .and_then(|secs| now.checked_add(SignedDuration::from_secs(secs)).ok())
                .is_some();
            if !representable {
                return Err(PasteError::validation(
                    "ttl_seconds",
                    "ttl_seconds is too large",
                ));
            }
        }

        if self.max_views.is_some_and(|views| views < 1) {
            return Err(PasteError::validation(
                "max_views",
                "max_views must be an integer >= 1",
            ));
        }

        Ok(())
    }
}

/// The result of a successful read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumedPaste {
    pub content: String,
    /// Views left after this one, if the paste has a view limit.
    pub remaining_views: Option<u64>,
    /// When the paste stops being readable, if it has a time-to-live.
    pub expires_at: Option<Timestamp>,
}

/// The paste lifecycle: create, then read until expired or used up.
#[async_trait]
pub trait PasteManager: Send + Sync + 'static {
    /// Validates and stores a new paste, returning its fresh id.
    async fn create(&self, paste: NewPaste) -> Result<PasteId>;

    /// Reads a paste at the manager's current time, consuming one view.
    ///
    /// Returns `Err(NotFound)` when the paste is absent, expired, exhausted,
    /// or the store failed.
    async fn fetch_and_consume(&self, id: &PasteId) -> Result<ConsumedPaste>;

    /// Same as [`fetch_and_consume`](Self::fetch_and_consume), evaluated at
    /// an explicit logical time.
    async fn fetch_and_consume_at(&self, id: &PasteId, now: Timestamp) -> Result<ConsumedPaste>;

    /// Round-trips a value through the backing store.
    async fn health(&self) -> bool;
}
