use bytes::Bytes;
use chrono::Utc;
use http_body_util::Full;
use hyper::{header, Method, Request};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;

use super::{ImageUpload, ObjectStore, StoredObject};
use crate::error::StoreError;
use crate::http::client::{error_message, https_client, send, HttpsClient};
use crate::http::multipart::MultipartForm;

/// Account credentials for the hosted image CDN
#[derive(Clone, Default, PartialEq)]
pub struct CloudCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

impl CloudCredentials {
    /// All three values present
    pub fn is_complete(&self) -> bool {
        !self.cloud_name.is_empty() && !self.api_key.is_empty() && !self.api_secret.is_empty()
    }
}

impl std::fmt::Debug for CloudCredentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudCredentials")
            .field("cloud_name", &self.cloud_name)
            .field("api_key", &self.api_key)
            .field("api_secret", &"<redacted>")
            .finish()
    }
}

/// Object store backed by a hosted image CDN's signed upload API
pub struct CloudObjectStore {
    credentials: CloudCredentials,
    endpoint: String,
    client: HttpsClient,
}

/// The parts of the CDN's upload reply we keep
#[derive(Debug, Deserialize)]
struct UploadReply {
    secure_url: String,
    public_id: String,
    format: String,
    width: u32,
    height: u32,
}

impl CloudObjectStore {
    pub fn new(credentials: CloudCredentials) -> Self {
        let endpoint = format!(
            "https://api.cloudinary.com/v1_1/{}/image/upload",
            credentials.cloud_name
        );
        Self::with_endpoint(credentials, endpoint)
    }

    /// Point the store at a different upload URL (self-hosted gateways, tests)
    pub fn with_endpoint(credentials: CloudCredentials, endpoint: impl Into<String>) -> Self {
        Self {
            credentials,
            endpoint: endpoint.into(),
            client: https_client(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Hex SHA-256 over the signed parameters followed by the secret
    fn sign(&self, timestamp: i64) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!("timestamp={}{}", timestamp, self.credentials.api_secret));
        hex::encode(hasher.finalize())
    }
}

impl ObjectStore for CloudObjectStore {
    async fn put(&self, upload: ImageUpload) -> Result<StoredObject, StoreError> {
        let timestamp = Utc::now().timestamp();
        let signature = self.sign(timestamp);

        let (content_type, body) = MultipartForm::new()
            .file(
                "file",
                &upload.original_name,
                &upload.content_type,
                &upload.bytes,
            )
            .text("api_key", &self.credentials.api_key)
            .text("timestamp", &timestamp.to_string())
            .text("signature", &signature)
            .text("signature_algorithm", "sha256")
            .finish();

        let req = Request::builder()
            .method(Method::POST)
            .uri(&self.endpoint)
            .header(header::CONTENT_TYPE, content_type)
            .body(Full::new(body))
            .map_err(|e| StoreError::Http(e.to_string()))?;

        let (status, body): (_, Bytes) = send(&self.client, req)
            .await
            .map_err(|e| StoreError::Http(e.to_string()))?;

        if !status.is_success() {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: error_message(&body),
            });
        }

        let reply: UploadReply = serde_json::from_slice(&body)?;
        debug!("☁️  CDN stored {} as {}", upload.original_name, reply.public_id);

        Ok(StoredObject {
            url: reply.secure_url,
            storage_id: reply.public_id,
            format: reply.format,
            width: reply.width,
            height: reply.height,
        })
    }
}

impl std::fmt::Debug for CloudObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudObjectStore")
            .field("credentials", &self.credentials)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}
