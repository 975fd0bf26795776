//! HTTP surface of the Burnbox paste service.
//!
//! The JSON API lives under `/pastes`, the human-facing page under `/p/{id}`
//! and the store health check at `/healthz`.

pub mod app;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod model;
pub mod page;
pub mod state;
pub mod sweeper;

pub use app::App;
pub use error::AppError;
pub use state::AppState;
