//! Save Unsplash photos to the user's cloud storage.
//!
//! Google Drive and OneDrive receive the image bytes from the relay; Dropbox
//! is handed the image URL and downloads it itself. Callers track the
//! Unsplash download before calling any of these.

pub mod multipart;

use reqwest::{StatusCode, header};
use serde::Serialize;
use stellar_core::Error;

use crate::fetch::{FetchClient, ImageMime};
use crate::unsplash::check_photo_id;
use multipart::RelatedBody;

/// Base URLs of the storage APIs.
#[derive(Debug, Clone)]
pub struct StorageEndpoints {
    pub google_drive: String,
    pub onedrive: String,
    pub dropbox: String,
}

impl Default for StorageEndpoints {
    fn default() -> Self {
        Self {
            google_drive: "https://www.googleapis.com".to_string(),
            onedrive: "https://graph.microsoft.com/v1.0".to_string(),
            dropbox: "https://api.dropboxapi.com".to_string(),
        }
    }
}

#[derive(Serialize)]
struct DriveMetadata<'a> {
    name: &'a str,
}

#[derive(Serialize)]
struct DropboxSaveUrl<'a> {
    path: &'a str,
    url: &'a str,
}

/// Client for the storage provider upload APIs.
#[derive(Debug, Clone)]
pub struct StorageClient {
    fetch: FetchClient,
    endpoints: StorageEndpoints,
}

impl StorageClient {
    pub fn new(fetch: FetchClient, endpoints: StorageEndpoints) -> Self {
        Self { fetch, endpoints }
    }

    /// Download `image_url` and upload it to Google Drive as `photo-<id>`.
    pub async fn save_to_google_drive(&self, token: &str, id: &str, image_url: &str) -> Result<(), Error> {
        check_save_params(token, id, image_url)?;

        let bytes = self.fetch.download(image_url).await?;
        let mime = ImageMime::sniff(&bytes).unwrap_or(ImageMime::Jpeg);
        let name = format!("photo-{id}.{}", mime.extension());

        let metadata = serde_json::to_vec(&DriveMetadata { name: &name })
            .map_err(|e| Error::Decode(format!("failed to encode metadata: {e}")))?;

        let body = RelatedBody::new(id)
            .part("application/json; charset=UTF-8", metadata)
            .part(mime.as_str(), bytes.to_vec());
        let content_type = body.content_type();

        let request = self
            .fetch
            .http()
            .post(format!("{}/upload/drive/v3/files?uploadType=multipart", self.endpoints.google_drive))
            .timeout(self.fetch.config().upload_timeout)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, content_type)
            .body(body.into_bytes());

        self.fetch.execute(request).await?;

        tracing::info!(photo_id = id, file_name = %name, "saved photo to Google Drive");

        Ok(())
    }

    /// Download `image_url` and upload it to the app folder of the user's OneDrive.
    pub async fn save_to_onedrive(&self, token: &str, id: &str, image_url: &str) -> Result<(), Error> {
        check_save_params(token, id, image_url)?;

        let bytes = self.fetch.download(image_url).await?;
        let mime = ImageMime::sniff(&bytes).unwrap_or(ImageMime::Jpeg);
        let name = format!("photo-{id}.{}", mime.extension());

        let request = self
            .fetch
            .http()
            .put(format!("{}/me/drive/special/approot:/{name}:/content", self.endpoints.onedrive))
            .timeout(self.fetch.config().upload_timeout)
            .bearer_auth(token)
            .header(header::CONTENT_TYPE, mime.as_str())
            .body(bytes);

        self.fetch
            .execute_accepting(request, &[StatusCode::OK, StatusCode::CREATED])
            .await?;

        tracing::info!(photo_id = id, file_name = %name, "saved photo to OneDrive");

        Ok(())
    }

    /// Ask Dropbox to fetch `image_url` into the user's app folder.
    pub async fn save_to_dropbox(&self, token: &str, id: &str, image_url: &str) -> Result<(), Error> {
        check_save_params(token, id, image_url)?;

        let path = format!("/photo-{id}.jpeg");
        let request = self
            .fetch
            .http()
            .post(format!("{}/2/files/save_url", self.endpoints.dropbox))
            .bearer_auth(token)
            .json(&DropboxSaveUrl { path: &path, url: image_url });

        self.fetch.execute(request).await?;

        tracing::info!(photo_id = id, file_name = %path, "saved photo to Dropbox");

        Ok(())
    }
}

fn check_save_params(token: &str, id: &str, image_url: &str) -> Result<(), Error> {
    if token.is_empty() {
        return Err(Error::InvalidInput("access token not specified".into()));
    }
    check_photo_id(id)?;
    if image_url.is_empty() {
        return Err(Error::InvalidInput("image url not specified".into()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::FetchConfig;
    use crate::fetch::mime::tests::{JPEG_BYTES, PNG_BYTES};
    use wiremock::matchers::{body_json, header, header_regex, method, path, query_param};
    use wiremock::{Match, Mock, MockServer, Request, ResponseTemplate};

    /// Matches requests whose raw body contains the given bytes.
    struct BodyContains(Vec<u8>);

    impl Match for BodyContains {
        fn matches(&self, request: &Request) -> bool {
            request.body.windows(self.0.len()).any(|window| window == self.0.as_slice())
        }
    }

    fn client(server: &MockServer) -> StorageClient {
        let fetch = FetchClient::new(FetchConfig::default()).unwrap();
        let base = server.uri();
        StorageClient::new(
            fetch,
            StorageEndpoints { google_drive: base.clone(), onedrive: base.clone(), dropbox: base },
        )
    }

    async fn serve_image(server: &MockServer, bytes: &[u8]) -> String {
        Mock::given(method("GET"))
            .and(path("/image"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes.to_vec()))
            .mount(server)
            .await;
        format!("{}/image", server.uri())
    }

    #[tokio::test]
    async fn test_save_to_google_drive_multipart() {
        let server = MockServer::start().await;
        let image_url = serve_image(&server, JPEG_BYTES).await;

        Mock::given(method("POST"))
            .and(path("/upload/drive/v3/files"))
            .and(query_param("uploadType", "multipart"))
            .and(header("authorization", "Bearer tok"))
            .and(header_regex("content-type", "^multipart/related; boundary=[0-9a-f]{32}$"))
            .and(BodyContains(
                b"Content-Type: application/json; charset=UTF-8\r\n\r\n{\"name\":\"photo-p1.jpeg\"}\r\n".to_vec(),
            ))
            .and(BodyContains([b"Content-Type: image/jpeg\r\n\r\n".as_slice(), JPEG_BYTES].concat()))
            .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).save_to_google_drive("tok", "p1", &image_url).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_to_google_drive_image_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/image"))
            .respond_with(ResponseTemplate::new(403).set_body_string("forbidden"))
            .mount(&server)
            .await;

        let result = client(&server)
            .save_to_google_drive("tok", "p1", &format!("{}/image", server.uri()))
            .await;
        assert!(matches!(result, Err(Error::Upstream { status: 403, .. })));
    }

    #[tokio::test]
    async fn test_save_to_onedrive_accepts_created() {
        let server = MockServer::start().await;
        let image_url = serve_image(&server, PNG_BYTES).await;

        Mock::given(method("PUT"))
            .and(path("/me/drive/special/approot:/photo-p2.png:/content"))
            .and(header("authorization", "Bearer tok"))
            .and(header("content-type", "image/png"))
            .respond_with(ResponseTemplate::new(201).set_body_string("{}"))
            .expect(1)
            .mount(&server)
            .await;

        client(&server).save_to_onedrive("tok", "p2", &image_url).await.unwrap();
    }

    #[tokio::test]
    async fn test_save_to_dropbox_sends_url() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/2/files/save_url"))
            .and(header("authorization", "Bearer tok"))
            .and(body_json(serde_json::json!({ "path": "/photo-p3.jpeg", "url": "https://images.unsplash.com/p3" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ ".tag": "async_job_id" })))
            .expect(1)
            .mount(&server)
            .await;

        client(&server)
            .save_to_dropbox("tok", "p3", "https://images.unsplash.com/p3")
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_save_requires_token() {
        let server = MockServer::start().await;
        let result = client(&server).save_to_dropbox("", "p3", "https://x").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }

    #[tokio::test]
    async fn test_save_rejects_id_outside_file_name() {
        let server = MockServer::start().await;
        let image_url = serve_image(&server, JPEG_BYTES).await;

        let result = client(&server).save_to_onedrive("tok", "x:/../../root", &image_url).await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));

        let result = client(&server).save_to_dropbox("tok", "../p3", "https://images.unsplash.com/p3").await;
        assert!(matches!(result, Err(Error::InvalidInput(_))));
    }
}
