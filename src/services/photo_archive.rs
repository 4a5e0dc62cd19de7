// src/services/photo_archive.rs
// DOCUMENTATION: Archive of place photos in Cloud Storage
// PURPOSE: Store each place's main photo once and hand out its public URL

use crate::errors::PlacesError;
use crate::services::{ServiceAccountKey, ServiceAccountTokens};
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use std::time::Duration;

/// Idempotent photo upload keyed by Google place id
#[async_trait]
pub trait PhotoArchive: Send + Sync {
    /// Store `data` under `key` unless an object already exists there.
    /// Returns the public URL either way.
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<String, PlacesError>;
}

/// Object storage operations the archive is built on
#[async_trait]
pub trait ObjectBucket: Send + Sync {
    async fn exists(&self, key: &str) -> Result<bool, PlacesError>;

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), PlacesError>;

    fn public_url(&self, key: &str) -> String;
}

/// PhotoArchive over any bucket
/// DOCUMENTATION: The existence probe replaces locking. Two concurrent uploads of the
/// same key can both miss the probe and write twice; the object content is the same.
pub struct BucketPhotoArchive<B> {
    bucket: B,
}

impl<B: ObjectBucket> BucketPhotoArchive<B> {
    pub fn new(bucket: B) -> Self {
        Self { bucket }
    }
}

#[async_trait]
impl<B: ObjectBucket> PhotoArchive for BucketPhotoArchive<B> {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<String, PlacesError> {
        if self.bucket.exists(key).await? {
            log::debug!("Photo for {} already archived", key);
            return Ok(self.bucket.public_url(key));
        }

        self.bucket.put(key, data).await?;
        log::info!("Archived photo for {}", key);
        Ok(self.bucket.public_url(key))
    }
}

/// Google Cloud Storage bucket via the JSON API
/// DOCUMENTATION: Authenticates as a service account. A 401 drops the cached token so
/// the next request mints a fresh one.
pub struct GcsBucket {
    client: Client,
    bucket: String,
    tokens: ServiceAccountTokens,
    api_url: String,
    public_base_url: String,
}

impl GcsBucket {
    pub fn new(
        bucket: String,
        key: ServiceAccountKey,
        timeout: Duration,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder().timeout(timeout).build().map_err(|e| {
            PlacesError::StorageError(format!("Failed to build HTTP client: {}", e))
        })?;
        let tokens = ServiceAccountTokens::new(key, client.clone())?;

        Ok(Self {
            client,
            bucket,
            tokens,
            api_url: "https://storage.googleapis.com".to_string(),
            public_base_url: "https://storage.googleapis.com".to_string(),
        })
    }

    /// Turn a non-success status into an error, dropping the token on 401
    async fn status_error(&self, status: StatusCode, message: String) -> PlacesError {
        if status == StatusCode::UNAUTHORIZED {
            log::warn!("Storage rejected access token, refreshing on next request");
            self.tokens.invalidate().await;
        }
        PlacesError::StorageError(message)
    }

    /// Object metadata URL: {api}/storage/v1/b/{bucket}/o/{key}
    fn object_url(&self, key: &str) -> Result<Url, PlacesError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| PlacesError::StorageError(format!("Invalid storage URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PlacesError::StorageError("Storage URL cannot be a base".to_string()))?
            .extend(["storage", "v1", "b", self.bucket.as_str(), "o", key]);
        Ok(url)
    }

    /// Media upload URL: {api}/upload/storage/v1/b/{bucket}/o
    fn upload_url(&self) -> Result<Url, PlacesError> {
        let mut url = Url::parse(&self.api_url)
            .map_err(|e| PlacesError::StorageError(format!("Invalid storage URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| PlacesError::StorageError("Storage URL cannot be a base".to_string()))?
            .extend(["upload", "storage", "v1", "b", self.bucket.as_str(), "o"]);
        Ok(url)
    }
}

#[async_trait]
impl ObjectBucket for GcsBucket {
    async fn exists(&self, key: &str) -> Result<bool, PlacesError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .get(self.object_url(key)?)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| PlacesError::StorageError(format!("Existence check failed: {}", e)))?;

        match response.status() {
            s if s.is_success() => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            s => Err(self
                .status_error(s, format!("Existence check for {} returned {}", key, s))
                .await),
        }
    }

    async fn put(&self, key: &str, data: Vec<u8>) -> Result<(), PlacesError> {
        let token = self.tokens.access_token().await?;
        let response = self
            .client
            .post(self.upload_url()?)
            .query(&[("uploadType", "media"), ("name", key)])
            .bearer_auth(token)
            .header(reqwest::header::CONTENT_TYPE, "image/jpeg")
            .body(data)
            .send()
            .await
            .map_err(|e| PlacesError::StorageError(format!("Upload failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(self
                .status_error(
                    status,
                    format!("Upload of {} returned {}: {}", key, status, body),
                )
                .await);
        }

        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}/{}/{}", self.public_base_url, self.bucket, key)
    }
}
