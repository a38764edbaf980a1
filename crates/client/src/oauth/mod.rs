//! OAuth token exchange with the storage providers.
//!
//! The relay only forwards: the extension obtains an authorization code, the
//! relay adds the client secret and redirect URI, posts the form to the
//! provider's token endpoint and returns the decoded token response.

use serde::{Deserialize, Serialize};
use stellar_core::{Error, config::ClientCredentials};

use crate::fetch::FetchClient;

/// Storage providers the relay can authorize against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    GoogleDrive,
    Dropbox,
    OneDrive,
}

impl Provider {
    /// Production token endpoint.
    pub fn token_url(self) -> &'static str {
        match self {
            Provider::GoogleDrive => "https://oauth2.googleapis.com/token",
            Provider::Dropbox => "https://api.dropboxapi.com/oauth2/token",
            Provider::OneDrive => "https://login.microsoftonline.com/common/oauth2/v2.0/token",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Provider::GoogleDrive => "googledrive",
            Provider::Dropbox => "dropbox",
            Provider::OneDrive => "onedrive",
        }
    }
}

/// Token endpoint response, shared by every provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub token_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Token exchange client for one provider.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    fetch: FetchClient,
    provider: Provider,
    token_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl OAuthClient {
    pub fn new(fetch: FetchClient, provider: Provider, credentials: ClientCredentials<'_>, redirect_uri: &str) -> Self {
        Self {
            fetch,
            provider,
            token_url: provider.token_url().to_string(),
            client_id: credentials.client_id.to_string(),
            client_secret: credentials.client_secret.to_string(),
            redirect_uri: redirect_uri.to_string(),
        }
    }

    /// Point the client at a different token endpoint.
    pub fn with_token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    /// Redeem an authorization code for an access token.
    pub async fn authorize(&self, code: &str) -> Result<TokenResponse, Error> {
        if code.is_empty() {
            return Err(Error::InvalidInput("authorization code not specified".into()));
        }

        let form = [
            ("grant_type", "authorization_code"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        tracing::debug!(provider = self.provider.name(), "exchanging authorization code");

        self.fetch.post_form(&self.token_url, &form).await
    }

    /// Obtain a new access token after the previous one expired.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, Error> {
        if refresh_token.is_empty() {
            return Err(Error::InvalidInput("refresh token not specified".into()));
        }

        let form = [
            ("grant_type", "refresh_token"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("refresh_token", refresh_token),
            ("redirect_uri", self.redirect_uri.as_str()),
        ];

        tracing::debug!(provider = self.provider.name(), "refreshing access token");

        self.fetch.post_form(&self.token_url, &form).await
    }
}
