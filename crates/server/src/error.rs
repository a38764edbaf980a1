//! Error responses for the HTTP service.
//!
//! Every failure leaves the service as `{"detail": "..."}` with the status
//! code chosen by [`HttpError`] classification.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use stellar_client::fetch::UrlError;
use stellar_core::{ConfigError, Error, HttpError};

/// Error returned by route handlers.
#[derive(Debug, thiserror::Error)]
#[error(transparent)]
pub struct ApiError(#[from] pub HttpError);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        ApiError(err.into())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        Error::Config(err).into()
    }
}

impl From<UrlError> for ApiError {
    fn from(err: UrlError) -> Self {
        Error::InvalidInput(err.to_string()).into()
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), error = %self.0, "request failed");
        } else {
            tracing::debug!(status = status.as_u16(), error = %self.0, "request rejected");
        }

        (status, Json(self.0)).into_response()
    }
}
