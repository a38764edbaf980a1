//! Google Drive routes.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use serde::Serialize;
use stellar_client::{Provider, TokenResponse};

use super::{CodeParams, RefreshParams, SaveParams, save_photo};
use crate::error::ApiError;
use crate::handler::AppState;

/// Public client id, kept out of the extension bundle.
#[derive(Debug, Serialize)]
pub struct KeyOutput {
    pub googledrive_key: String,
}

pub async fn key(State(state): State<AppState>) -> Result<Json<KeyOutput>, ApiError> {
    let credentials = state.config.require_google_drive()?;
    Ok(Json(KeyOutput { googledrive_key: credentials.client_id.to_string() }))
}

pub async fn authorize(
    State(state): State<AppState>, Query(params): Query<CodeParams>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(state.oauth(Provider::GoogleDrive)?.authorize(&params.code).await?))
}

pub async fn refresh(
    State(state): State<AppState>, Query(params): Query<RefreshParams>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(state.oauth(Provider::GoogleDrive)?.refresh(&params.refresh_token).await?))
}

pub async fn save(State(state): State<AppState>, Query(params): Query<SaveParams>) -> Result<StatusCode, ApiError> {
    save_photo(&state, params, Provider::GoogleDrive).await
}
