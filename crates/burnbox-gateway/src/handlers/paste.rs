use axum::body::Bytes;
use axum::extract::rejection::{BytesRejection, PathRejection};
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use burnbox_core::{NewPaste, PasteId};

use crate::error::{AppError, Result};
use crate::extract::RequestNow;
use crate::model::{CreatePasteRequest, CreatePasteResponse, PasteResponse};
use crate::state::AppState;

pub async fn create_paste_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: std::result::Result<Bytes, BytesRejection>,
) -> Result<Response> {
    let body =
        body.map_err(|rejection| AppError::Rejected(rejection.status(), rejection.body_text()))?;
    let request: CreatePasteRequest = serde_json::from_slice(&body)
        .map_err(|err| AppError::BadRequest(format!("Invalid JSON body: {err}")))?;
    let paste = NewPaste::try_from(request)?;

    let id = state.manager().create(paste).await?;

    let url = id.to_view_url(&state.public_base_url(&headers));
    let response = CreatePasteResponse {
        id: id.to_string(),
        url,
    };
    Ok((StatusCode::CREATED, Json(response)).into_response())
}

pub async fn get_paste_handler(
    path: std::result::Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    RequestNow(now): RequestNow,
) -> Result<Json<PasteResponse>> {
    let Ok(Path(id)) = path else {
        return Err(AppError::NotFound);
    };
    let id = PasteId::parse(&id).map_err(|_| AppError::NotFound)?;
    let paste = state.consume(&id, now).await?;
    Ok(Json(paste.into()))
}
