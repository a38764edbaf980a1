//! Route handlers.
//!
//! One module per upstream. Query parameters default to empty so a missing
//! value is reported by the handler as `{"detail": ...}` instead of an axum
//! rejection.

pub mod dropbox;
pub mod googledrive;
pub mod health;
pub mod onedrive;
pub mod unsplash;

use axum::http::StatusCode;
use serde::Deserialize;
use stellar_client::{Provider, fetch::check_image_url};
use stellar_core::Error;

use crate::error::ApiError;
use crate::handler::AppState;

/// `?code=` of an OAuth redirect.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CodeParams {
    pub code: String,
}

/// `?refresh_token=` of a token refresh.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RefreshParams {
    pub refresh_token: String,
}

/// Parameters of a save-to-storage request.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SaveParams {
    /// Unsplash photo id.
    pub id: String,
    /// Image URL to save.
    pub url: String,
    /// Provider access token.
    pub token: String,
}

/// Resolve a data URI through the cache, storing it after a miss.
pub(crate) async fn resolve_image(
    state: &AppState, endpoint: &str, cache_key: &str, filename: &str,
) -> Result<String, ApiError> {
    let cached = state.cache.contains(cache_key, filename).await;
    let data_uri = state.cache.resolve(&state.fetch, endpoint, cache_key, filename).await?;

    if !cached && let Err(e) = state.cache.store(cache_key, filename, &data_uri).await {
        tracing::warn!(image_id = cache_key, file_name = filename, error = %e, "failed to cache image");
    }

    Ok(data_uri)
}

/// Track the Unsplash download, then hand the photo to `provider`.
pub(crate) async fn save_photo(state: &AppState, params: SaveParams, provider: Provider) -> Result<StatusCode, ApiError> {
    if params.token.is_empty() {
        return Err(Error::InvalidInput("access token not specified".into()).into());
    }

    let image_url = check_image_url(&params.url, &state.config.image_hosts)?;
    let unsplash = state.unsplash()?;
    unsplash.track_download(&params.id).await?;

    let storage = state.storage();
    match provider {
        Provider::GoogleDrive => storage.save_to_google_drive(&params.token, &params.id, image_url.as_str()).await?,
        Provider::Dropbox => storage.save_to_dropbox(&params.token, &params.id, image_url.as_str()).await?,
        Provider::OneDrive => storage.save_to_onedrive(&params.token, &params.id, image_url.as_str()).await?,
    }

    Ok(StatusCode::OK)
}

#[cfg(test)]
pub(crate) mod testing {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use stellar_core::AppConfig;
    use tower::ServiceExt;

    use crate::handler::{AppState, Upstreams, router};

    /// Config with every credential set and `hosts` as the image allow-list.
    pub fn config(cache_dir: &std::path::Path, hosts: &[&str]) -> AppConfig {
        let mut config = AppConfig {
            cache_dir: cache_dir.to_path_buf(),
            redirect_url: Some("https://ext.example/callback".into()),
            image_hosts: hosts.iter().map(|h| h.to_string()).collect(),
            timeout_ms: 2_000,
            upload_timeout_ms: 2_000,
            ..Default::default()
        };
        config.unsplash.access_key = Some("unsplash-key".into());
        config.google_drive.key = Some("gd-key".into());
        config.google_drive.secret = Some("gd-secret".into());
        config.dropbox.key = Some("dbx-key".into());
        config.dropbox.secret = Some("dbx-secret".into());
        config.onedrive.app_id = Some("od-app".into());
        config.onedrive.secret = Some("od-secret".into());
        config
    }

    pub fn state(config: AppConfig, upstreams: Upstreams) -> AppState {
        AppState::new(config).unwrap().with_upstreams(upstreams)
    }

    /// Send a GET through the router and decode the JSON body (`Null` when empty).
    pub async fn get(state: AppState, uri: &str) -> (StatusCode, serde_json::Value) {
        let response = router(state)
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { serde_json::Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
        (status, json)
    }
}
