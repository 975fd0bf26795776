use std::sync::Arc;

use axum::http::header::HOST;
use axum::http::HeaderMap;
use burnbox_core::{ConsumedPaste, PasteError, PasteId, PasteManager};
use jiff::Timestamp;

/// Host assumed when a request carries no usable `Host` header.
pub const DEFAULT_HOST: &str = "localhost:3000";

/// Default request body cap: 1 MiB of content plus JSON escaping headroom.
pub const DEFAULT_BODY_LIMIT: usize = 4 * 1024 * 1024 + 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    manager: Arc<dyn PasteManager>,
    base_url: Option<String>,
    test_mode: bool,
    test_now: Option<Timestamp>,
    body_limit: usize,
}

impl AppState {
    pub fn new(manager: Arc<dyn PasteManager>) -> Self {
        Self {
            manager,
            base_url: None,
            test_mode: false,
            test_now: None,
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }

    /// Fixes the base of generated paste urls instead of deriving it from `Host`.
    pub fn with_public_base_url(mut self, public_base_url: impl Into<String>) -> Self {
        self.base_url = Some(public_base_url.into());
        self
    }

    /// Lets read requests override "now" through the `x-test-now-ms` header.
    pub fn with_test_mode(mut self, test_mode: bool) -> Self {
        self.test_mode = test_mode;
        self
    }

    /// In test mode, the time reads use when the request carries no header.
    pub fn with_test_now(mut self, test_now: Option<Timestamp>) -> Self {
        self.test_now = test_now;
        self
    }

    pub fn with_body_limit(mut self, body_limit: usize) -> Self {
        self.body_limit = body_limit;
        self
    }

    pub fn manager(&self) -> &dyn PasteManager {
        self.manager.as_ref()
    }

    pub fn test_mode(&self) -> bool {
        self.test_mode
    }

    pub fn test_now(&self) -> Option<Timestamp> {
        self.test_now
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }

    /// Consumes one view, at `now` when given, else at the manager's clock.
    pub async fn consume(
        &self,
        id: &PasteId,
        now: Option<Timestamp>,
    ) -> Result<ConsumedPaste, PasteError> {
        match now {
            Some(now) => self.manager.fetch_and_consume_at(id, now).await,
            None => self.manager.fetch_and_consume(id).await,
        }
    }

    /// Base url for links handed back to clients.
    pub fn public_base_url(&self, headers: &HeaderMap) -> String {
        if let Some(base_url) = &self.base_url {
            return base_url.clone();
        }

        let host = headers
            .get(HOST)
            .and_then(|value| value.to_str().ok())
            .filter(|host| !host.is_empty())
            .unwrap_or(DEFAULT_HOST);
        let scheme = if host.contains("localhost") || host.starts_with("127.") {
            "http"
        } else {
            "https"
        };
        format!("{scheme}://{host}")
    }
}
