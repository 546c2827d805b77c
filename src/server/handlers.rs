use super::{safe_call::ApiError, status::HTTP_OKAY, types::PredictRequest};
use crate::{Error, config::Config, model::ModelBackend};
use axum::{
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{Html, Json},
};
use serde_json::Value;
use std::{path::Path, sync::Arc};
use tracing::info;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub backend: Arc<dyn ModelBackend>,
}

/// Serves the UI shell.
pub async fn index(State(state): State<AppState>) -> Result<Html<String>, ApiError> {
    let page_path = Path::new(&state.config.server.ui_dir).join("index.html");
    let page = tokio::fs::read_to_string(&page_path).await?;
    Ok(Html(page))
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    let Json(request) = body.map_err(|e| Error::bad_request(e.body_text()))?;

    info!(
        "Received prediction request for model {} ({} chars)",
        state.config.model_name,
        request.input_text.len()
    );

    let result = state.backend.predict(&request.input_text).await?;
    Ok((HTTP_OKAY, Json(result)))
}
