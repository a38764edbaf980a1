//! Unsplash routes: cached image encoding, random photo, search and
//! download tracking.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};
use stellar_client::{Photo, Resolution, SearchResults, fetch::check_image_url, unsplash::DownloadLink};

use super::resolve_image;
use crate::error::ApiError;
use crate::handler::AppState;

/// Parameters of `/unsplash/image`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct ImageParams {
    /// Image URL to encode.
    pub url: String,
    /// Cache key, normally the Unsplash photo id.
    pub id: String,
    /// Cache entry filename.
    pub filename: String,
}

/// A data URI for the extension.
#[derive(Debug, Serialize, Deserialize)]
pub struct ImageOutput {
    pub base64: String,
}

/// Return the base64 data URI of an image, from the cache when possible.
pub async fn image_base64(
    State(state): State<AppState>, Query(params): Query<ImageParams>,
) -> Result<Json<ImageOutput>, ApiError> {
    let endpoint = check_image_url(&params.url, &state.config.image_hosts)?;
    let base64 = resolve_image(&state, endpoint.as_str(), &params.id, &params.filename).await?;
    Ok(Json(ImageOutput { base64 }))
}

/// Parameters of `/unsplash/random`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RandomParams {
    /// Comma-separated collection ids.
    pub collections: Option<String>,
    pub resolution: Resolution,
}

/// A random photo with its image already encoded.
#[derive(Debug, Serialize)]
pub struct RandomPhotoOutput {
    #[serde(flatten)]
    pub photo: Photo,
    pub base64: String,
}

/// Pick a random photo and attach the cached encoding of its image.
pub async fn random_photo(
    State(state): State<AppState>, Query(params): Query<RandomParams>,
) -> Result<Json<RandomPhotoOutput>, ApiError> {
    let photo = state.unsplash()?.random_photo(params.collections.as_deref()).await?;

    let endpoint = params.resolution.image_url(&photo)?;
    let base64 = resolve_image(&state, &endpoint, &photo.id, params.resolution.cache_filename()).await?;

    Ok(Json(RandomPhotoOutput { photo, base64 }))
}

/// Parameters of `/unsplash/search`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub key: String,
    pub page: Option<u32>,
    pub collections: Option<String>,
}

pub async fn search(
    State(state): State<AppState>, Query(params): Query<SearchParams>,
) -> Result<Json<SearchResults>, ApiError> {
    let results = state
        .unsplash()?
        .search(&params.key, params.page.unwrap_or(1), params.collections.as_deref())
        .await?;
    Ok(Json(results))
}

/// Parameters of `/unsplash/download`.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct DownloadParams {
    pub id: String,
}

pub async fn track_download(
    State(state): State<AppState>, Query(params): Query<DownloadParams>,
) -> Result<Json<DownloadLink>, ApiError> {
    Ok(Json(state.unsplash()?.track_download(&params.id).await?))
}
