mod health;
mod paste;

pub use health::HealthResponse;
pub use paste::{format_timestamp, CreatePasteRequest, CreatePasteResponse, PasteResponse};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
