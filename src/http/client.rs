use bytes::Bytes;
use http_body_util::{BodyExt, Full};
use hyper::{header, Method, Request, StatusCode};
use hyper_rustls::{HttpsConnector, HttpsConnectorBuilder};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use hyper_util::rt::TokioExecutor;
use serde::Deserialize;
use std::error::Error;

use super::multipart::MultipartForm;
use crate::scene::api::{ApiError, GalleryApi};
use crate::state::{ImageRecord, UploadReceipt};
use crate::storage::ImageUpload;

pub type HttpsClient = Client<HttpsConnector<HttpConnector>, Full<Bytes>>;

pub type TransportError = Box<dyn Error + Send + Sync>;

/// Client used for every outgoing request. Speaks plain http and https.
pub fn https_client() -> HttpsClient {
    let https = HttpsConnectorBuilder::new()
        .with_webpki_roots()
        .https_or_http()
        .enable_http1()
        .build();

    Client::builder(TokioExecutor::new()).build(https)
}

/// Send a request and collect the whole response body
pub async fn send(
    client: &HttpsClient,
    req: Request<Full<Bytes>>,
) -> Result<(StatusCode, Bytes), TransportError> {
    let res = client.request(req).await?;
    let status = res.status();
    let body = res.into_body().collect().await?.to_bytes();
    Ok((status, body))
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Pull the `{ "error": ... }` message out of a failed response, or fall back to the raw text
pub fn error_message(body: &[u8]) -> String {
    serde_json::from_slice::<ErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| String::from_utf8_lossy(body).into_owned())
}

/// The gallery endpoints, reached over HTTP
#[derive(Clone)]
pub struct HttpGalleryApi {
    base: String,
    client: HttpsClient,
}

impl HttpGalleryApi {
    /// `base` is the server origin, e.g. "http://localhost:3001"
    pub fn new(base: &str) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            client: https_client(),
        }
    }

    async fn call(&self, req: Request<Full<Bytes>>) -> Result<Bytes, ApiError> {
        let (status, body) = send(&self.client, req)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(body)
    }
}

impl GalleryApi for HttpGalleryApi {
    async fn list_images(&self) -> Result<Vec<ImageRecord>, ApiError> {
        let req = Request::builder()
            .method(Method::GET)
            .uri(format!("{}/api/images", self.base))
            .body(Full::new(Bytes::new()))
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let body = self.call(req).await?;
        Ok(serde_json::from_slice(&body)?)
    }

    async fn upload_image(&self, upload: ImageUpload) -> Result<UploadReceipt, ApiError> {
        let (content_type, body) = MultipartForm::new()
            .file(
                "image",
                &upload.original_name,
                &upload.content_type,
                &upload.bytes,
            )
            .finish();

        let req = Request::builder()
            .method(Method::POST)
            .uri(format!("{}/api/upload", self.base))
            .header(header::CONTENT_TYPE, content_type)
            .body(Full::new(body))
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        let body = self.call(req).await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

impl std::fmt::Debug for HttpGalleryApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpGalleryApi")
            .field("base", &self.base)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_prefers_json_error() {
        assert_eq!(error_message(br#"{"error":"no file"}"#), "no file");
        assert_eq!(error_message(b"Bad Gateway"), "Bad Gateway");
    }

    #[tokio::test]
    async fn test_unreachable_server_is_transport_error() {
        // Port 9 (discard) on localhost is not expected to accept HTTP connections
        let api = HttpGalleryApi::new("http://127.0.0.1:9/");
        let err = api.list_images().await.unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
    }
}
