//! Shared outbound HTTP client.
//!
//! ### Status handling
//! - The whole body is read before the status is looked at.
//! - Exactly `200` is success unless a call site accepts more (OneDrive
//!   uploads answer `201`). Anything else becomes `Error::Upstream` carrying
//!   the status and the body text.
//!
//! ### Timeouts
//! - Image fetches and API calls: 60s by default.
//! - Downloads feeding a storage upload: 180s by default.
//! - A timeout is reported as `Error::Timeout` (HTTP 408); every other
//!   transport failure is `Error::Network`.
//!
//! ### Remote Fetch & Encode
//! [`FetchClient::fetch_image`] downloads an image, sniffs its type from the
//! bytes and returns a base64 data URI. It implements
//! [`stellar_core::ImageSource`] for the cache resolver.

pub mod mime;
pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};

pub use mime::{EncodedImage, ImageMime};
pub use url::{UrlError, canonicalize, check_image_url};

use stellar_core::{Error, ImageSource};

/// Detail reported when an image fetch exceeds its timeout.
pub const IMAGE_TIMEOUT_DETAIL: &str = "Timeout exceeded while fetching image from network for base64 encoding";

/// Detail reported when an API call exceeds its timeout.
pub const API_TIMEOUT_DETAIL: &str = "Request to external API timed out";

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string.
    pub user_agent: String,

    /// Timeout for image fetches and API calls (default: 60s).
    pub timeout: Duration,

    /// Timeout for image downloads relayed to storage providers (default: 180s).
    pub upload_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: concat!("stellar-photos/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout: Duration::from_secs(60),
            upload_timeout: Duration::from_secs(180),
        }
    }
}

impl From<&stellar_core::AppConfig> for FetchConfig {
    fn from(config: &stellar_core::AppConfig) -> Self {
        Self { user_agent: config.user_agent.clone(), timeout: config.timeout(), upload_timeout: config.upload_timeout() }
    }
}

/// HTTP client shared by every outbound call.
///
/// Cloning is cheap; clones share one connection pool.
#[derive(Debug, Clone)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Underlying reqwest client, for building requests.
    pub fn http(&self) -> &Client {
        &self.http
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Send `request` and return the body of a `200` response.
    pub async fn execute(&self, request: RequestBuilder) -> Result<Bytes, Error> {
        self.execute_accepting(request, &[StatusCode::OK]).await
    }

    /// Send `request` and return the body if the status is in `accepted`.
    pub async fn execute_accepting(&self, request: RequestBuilder, accepted: &[StatusCode]) -> Result<Bytes, Error> {
        let response = request.send().await.map_err(|e| transport_error(e, API_TIMEOUT_DETAIL))?;
        read_checked(response, accepted, API_TIMEOUT_DETAIL).await
    }

    /// Send `request` and decode a `200` JSON body into `T`.
    pub async fn execute_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, Error> {
        let body = self.execute(request).await?;
        serde_json::from_slice(&body).map_err(|e| Error::Decode(format!("unexpected response from external API: {e}")))
    }

    /// POST `form` as `application/x-www-form-urlencoded` and decode the JSON body into `T`.
    pub async fn post_form<T: DeserializeOwned>(&self, endpoint: &str, form: &[(&str, &str)]) -> Result<T, Error> {
        self.execute_json(self.http.post(endpoint).form(form)).await
    }

    /// Download raw bytes with the upload timeout, for relaying to storage.
    pub async fn download(&self, endpoint: &str) -> Result<Bytes, Error> {
        let request = self.http.get(endpoint).timeout(self.config.upload_timeout);
        let response = request.send().await.map_err(|e| transport_error(e, API_TIMEOUT_DETAIL))?;
        read_checked(response, &[StatusCode::OK], API_TIMEOUT_DETAIL).await
    }

    /// Fetch an image and encode it as a base64 data URI.
    ///
    /// The request is bounded by the configured timeout; dropping the returned
    /// future aborts it.
    pub async fn fetch_image(&self, endpoint: &str) -> Result<EncodedImage, Error> {
        let start = Instant::now();

        let response = self
            .http
            .get(endpoint)
            .send()
            .await
            .map_err(|e| transport_error(e, IMAGE_TIMEOUT_DETAIL))?;

        let bytes = read_checked(response, &[StatusCode::OK], IMAGE_TIMEOUT_DETAIL).await?;
        let encoded = EncodedImage::encode(&bytes)?;

        tracing::debug!(
            "fetched {} in {}ms ({} bytes, {})",
            endpoint,
            start.elapsed().as_millis(),
            bytes.len(),
            encoded.mime.as_str()
        );

        Ok(encoded)
    }
}

#[async_trait]
impl ImageSource for FetchClient {
    async fn fetch_and_encode(&self, endpoint: &str) -> Result<String, Error> {
        self.fetch_image(endpoint).await.map(|encoded| encoded.data_uri)
    }
}

fn transport_error(err: reqwest::Error, timeout_detail: &str) -> Error {
    if err.is_timeout() {
        Error::Timeout(timeout_detail.to_string())
    } else if err.is_builder() {
        Error::InvalidInput(format!("invalid request: {err}"))
    } else {
        Error::Network(format!("network error: {err}"))
    }
}

async fn read_checked(response: Response, accepted: &[StatusCode], timeout_detail: &str) -> Result<Bytes, Error> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(|e| transport_error(e, timeout_detail))?;

    if accepted.contains(&status) {
        return Ok(bytes);
    }

    tracing::debug!("external API responded with status {}", status.as_u16());

    Err(Error::Upstream { status: status.as_u16(), body: String::from_utf8_lossy(&bytes).into_owned() })
}
