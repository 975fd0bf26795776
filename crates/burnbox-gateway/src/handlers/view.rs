use axum::extract::rejection::PathRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use burnbox_core::PasteId;

use crate::extract::RequestNow;
use crate::page;
use crate::state::AppState;

/// Renders a paste as HTML. Every failure, storage included, is a 404 page.
pub async fn view_paste_handler(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    RequestNow(now): RequestNow,
) -> Response {
    let Ok(Path(raw)) = path else {
        return not_found();
    };
    let Ok(id) = PasteId::parse(&raw) else {
        return not_found();
    };

    match state.consume(&id, now).await {
        Ok(paste) => Html(page::render_paste(&paste)).into_response(),
        Err(err) => {
            tracing::debug!(id = %id, error = %err, "paste page unavailable");
            not_found()
        }
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(page::render_not_found())).into_response()
}
