use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::handlers::{
    create_paste_handler, fallback_handler, get_paste_handler, health_handler,
    view_paste_handler,
};
use crate::state::AppState;

pub struct App {}

impl App {
    pub fn router(state: AppState) -> Router {
        Router::new()
            .route("/healthz", get(health_handler))
            .route("/pastes", post(create_paste_handler))
            .route("/pastes/{id}", get(get_paste_handler))
            .route("/p/{id}", get(view_paste_handler))
            .fallback(fallback_handler)
            .layer(DefaultBodyLimit::max(state.body_limit()))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }
}
