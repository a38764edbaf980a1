//! OneDrive routes.

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

#[derive(Debug, Serialize)]
pub struct IdOutput {
    pub id: String,
}

pub async fn id(State(state): State<AppState>) -> Result<Json<IdOutput>, ApiError> {
    let credentials = state.config.require_onedrive()?;
    Ok(Json(IdOutput { id: credentials.client_id.to_string() }))
}

pub async fn authorize(
    State(state): State<AppState>, Query(params): Query<CodeParams>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(state.oauth(Provider::OneDrive)?.authorize(&params.code).await?))
}

pub async fn refresh(
    State(state): State<AppState>, Query(params): Query<RefreshParams>,
) -> Result<Json<TokenResponse>, ApiError> {
    Ok(Json(state.oauth(Provider::OneDrive)?.refresh(&params.refresh_token).await?))
}

pub async fn save(State(state): State<AppState>, Query(params): Query<SaveParams>) -> Result<StatusCode, ApiError> {
    save_photo(&state, params, Provider::OneDrive).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::Upstreams;
    use crate::routes::testing::{config, get, state};
    use stellar_client::StorageEndpoints;
    use wiremock::matchers::{body_string_contains, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_id() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get(state(config(dir.path(), &[]), Upstreams::default()), "/onedrive/id").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "od-app");
    }

    #[tokio::test]
    async fn test_refresh_relays_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/common/oauth2/v2.0/token"))
            .and(body_string_contains("grant_type=refresh_token"))
            .and(body_string_contains("client_id=od-app"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "access_token": "EwB", "token_type": "Bearer", "expires_in": 3600, "scope": "Files.ReadWrite.AppFolder"
            })))
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let upstreams = Upstreams {
            token_urls: vec![(Provider::OneDrive, format!("{}/common/oauth2/v2.0/token", server.uri()))],
            ..Default::default()
        };

        let (status, body) = get(state(config(dir.path(), &[]), upstreams), "/onedrive/refresh?refresh_token=M.R3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["access_token"], "EwB");
        assert_eq!(body["scope"], "Files.ReadWrite.AppFolder");
    }

    #[tokio::test]
    async fn test_authorize_without_redirect_url() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config(dir.path(), &[]);
        config.redirect_url = None;

        let (status, body) = get(state(config, Upstreams::default()), "/onedrive/auth?code=c").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["detail"].as_str().unwrap().contains("redirect_url"));
    }

    #[tokio::test]
    async fn test_save_puts_bytes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/photos/p5/download"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "url": "https://dl" })))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/img/p5"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF, 0xE0, 0x00]))
            .mount(&server)
            .await;
        Mock::given(method("PUT"))
            .and(path("/me/drive/special/approot:/photo-p5.jpeg:/content"))
            .and(header("authorization", "Bearer tok"))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        let dir = tempfile::tempdir().unwrap();
        let upstreams = Upstreams {
            unsplash: Some(server.uri()),
            storage: StorageEndpoints { onedrive: server.uri(), ..Default::default() },
            ..Default::default()
        };
        let image_url = format!("{}/img/p5", server.uri());
        let uri = format!(
            "/onedrive/save?id=p5&token=tok&url={}",
            url::form_urlencoded::byte_serialize(image_url.as_bytes()).collect::<String>()
        );

        let (status, _) = get(state(config(dir.path(), &["127.0.0.1"]), upstreams), &uri).await;
        assert_eq!(status, StatusCode::OK);
    }
}
