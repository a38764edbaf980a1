//! HTTP service state and router.
//!
//! This module wires the shared clients into an [`AppState`] and maps every
//! extension-facing route to its handler in [`crate::routes`].

use std::sync::Arc;

use axum::{Router, routing::get};
use stellar_client::{
    FetchClient, FetchConfig, OAuthClient, Provider, StorageClient, StorageEndpoints, UnsplashClient, UnsplashConfig,
};
use stellar_core::{AppConfig, Error, ImageCache};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::error::ApiError;
use crate::routes::{dropbox, googledrive, health, onedrive, unsplash};

/// Upstream base URLs. Production values by default; tests point them at stubs.
#[derive(Debug, Clone, Default)]
pub struct Upstreams {
    /// Unsplash API base URL override.
    pub unsplash: Option<String>,
    /// Token endpoint overrides, keyed by provider.
    pub token_urls: Vec<(Provider, String)>,
    pub storage: StorageEndpoints,
}

/// State shared by every request.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub fetch: FetchClient,
    pub cache: ImageCache,
    upstreams: Arc<Upstreams>,
}

impl AppState {
    /// Build the state from a loaded configuration.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        let fetch = FetchClient::new(FetchConfig::from(&config))?;
        let cache = ImageCache::new(config.cache_dir.clone());

        Ok(Self { config: Arc::new(config), fetch, cache, upstreams: Arc::new(Upstreams::default()) })
    }

    pub fn with_upstreams(mut self, upstreams: Upstreams) -> Self {
        self.upstreams = Arc::new(upstreams);
        self
    }

    /// Unsplash client, if an access key is configured.
    pub fn unsplash(&self) -> Result<UnsplashClient, ApiError> {
        let mut config = UnsplashConfig::new(self.config.require_unsplash_key()?);
        if let Some(base_url) = &self.upstreams.unsplash {
            config.base_url = base_url.clone();
        }
        Ok(UnsplashClient::new(self.fetch.clone(), config)?)
    }

    /// Token exchange client for `provider`, if its credentials are configured.
    pub fn oauth(&self, provider: Provider) -> Result<OAuthClient, ApiError> {
        let credentials = match provider {
            Provider::GoogleDrive => self.config.require_google_drive()?,
            Provider::Dropbox => self.config.require_dropbox()?,
            Provider::OneDrive => self.config.require_onedrive()?,
        };
        let redirect_uri = self.config.require_redirect_url()?;

        let client = OAuthClient::new(self.fetch.clone(), provider, credentials, redirect_uri);

        Ok(match self.upstreams.token_urls.iter().find(|(p, _)| *p == provider) {
            Some((_, url)) => client.with_token_url(url.clone()),
            None => client,
        })
    }

    pub fn storage(&self) -> StorageClient {
        StorageClient::new(self.fetch.clone(), self.upstreams.storage.clone())
    }
}

/// Build the router with every route, CORS for the extension and request tracing.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/unsplash/image", get(unsplash::image_base64))
        .route("/unsplash/random", get(unsplash::random_photo))
        .route("/unsplash/search", get(unsplash::search))
        .route("/unsplash/download", get(unsplash::track_download))
        .route("/googledrive/key", get(googledrive::key))
        .route("/googledrive/auth", get(googledrive::authorize))
        .route("/googledrive/refresh", get(googledrive::refresh))
        .route("/googledrive/save", get(googledrive::save))
        .route("/dropbox/key", get(dropbox::key))
        .route("/dropbox/auth", get(dropbox::authorize))
        .route("/dropbox/save", get(dropbox::save))
        .route("/onedrive/id", get(onedrive::id))
        .route("/onedrive/auth", get(onedrive::authorize))
        .route("/onedrive/refresh", get(onedrive::refresh))
        .route("/onedrive/save", get(onedrive::save))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
