//! Dropbox routes.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Serialize;
use stellar_client::{Provider, TokenResponse};

use super::{CodeParams, SaveParams, save_photo};
use crate::error::ApiError;
use crate::handler::AppState;

#[derive(Debug, Serialize)]
pub struct KeyOutput {
    pub dropbox_key: String,
}

pub async fn key(State(state): State<AppState>) -> Result<Json<KeyOutput>, ApiError> {
    let key = state.config.require_dropbox_key()?;
    Ok(Json(KeyOutput { dropbox_key: key.to_string() }))
}

pub async fn authorize(
    State(state): State<AppState>, Query(params): Query<CodeParams>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(state.oauth(Provider::Dropbox)?.authorize(&params.code).await?))
}

pub async fn save(State(state): State<AppState>, Query(params): Query<SaveParams>) -> Result<StatusCode, ApiError> {
    save_photo(&state, params, Provider::Dropbox).await
}
