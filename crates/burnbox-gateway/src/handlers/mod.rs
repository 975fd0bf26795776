mod health;
mod paste;
mod view;

pub use health::health_handler;
pub use paste::{create_paste_handler, get_paste_handler};
pub use view::view_paste_handler;

use crate::error::AppError;

/// Answers any route the router does not know.
pub async fn fallback_handler() -> AppError {
    AppError::Rejected(axum::http::StatusCode::NOT_FOUND, "not found".to_owned())
}
