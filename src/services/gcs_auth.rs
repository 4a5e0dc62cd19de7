// src/services/gcs_auth.rs
// DOCUMENTATION: Service account access tokens for Cloud Storage
// PURPOSE: Mint OAuth tokens from a service account key and refresh them before expiry
//
// Flow (OAuth 2.0 JWT bearer grant):
// 1. Sign an RS256 assertion {iss, scope, aud, iat, exp} with the key's private key
// 2. POST it to the key's token_uri
// 3. Cache the returned access token until shortly before it expires

use crate::errors::PlacesError;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

/// Read/write access to objects, nothing else
pub const STORAGE_SCOPE: &str = "https://www.googleapis.com/auth/devstorage.read_write";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Tokens this close to expiry are refreshed
const REFRESH_MARGIN_SECS: i64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a service account key file that token minting needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    /// PEM encoded RSA private key
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

impl ServiceAccountKey {
    /// Parse the JSON key file content (STORAGE_KEY_JSON)
    pub fn from_json(json: &str) -> Result<Self, PlacesError> {
        serde_json::from_str(json).map_err(|e| {
            PlacesError::StorageError(format!("Invalid service account key: {}", e))
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Access token source for one service account
/// DOCUMENTATION: The cache lock is held while refreshing, so concurrent callers
/// wait for a single token request instead of each minting their own.
pub struct ServiceAccountTokens {
    client: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokens {
    pub fn new(key: ServiceAccountKey, client: Client) -> Result<Self, PlacesError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes()).map_err(|e| {
            PlacesError::StorageError(format!("Invalid service account private key: {}", e))
        })?;

        Ok(Self {
            client,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// A valid access token, refreshed when missing or about to expire
    pub async fn access_token(&self) -> Result<String, PlacesError> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref().filter(|t| t.is_fresh(now)) {
            return Ok(token.value.clone());
        }

        let token = self.fetch_token(now).await?;
        let value = token.value.clone();
        *cached = Some(token);
        Ok(value)
    }

    /// Drop the cached token so the next call mints a new one
    pub async fn invalidate(&self) {
        *self.cached.lock().await = None;
    }

    fn assertion(&self, now: DateTime<Utc>) -> Result<String, PlacesError> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: STORAGE_SCOPE.to_string(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| PlacesError::StorageError(format!("Failed to sign assertion: {}", e)))
    }

    async fn fetch_token(&self, now: DateTime<Utc>) -> Result<CachedToken, PlacesError> {
        let assertion = self.assertion(now)?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| {
                log::error!("Storage token request failed: {}", e);
                PlacesError::StorageError(format!("Token request failed: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            log::error!("Storage token request returned {}: {}", status, body);
            return Err(PlacesError::StorageError(format!(
                "Token request returned {}: {}",
                status, body
            )));
        }

        let token: TokenResponse = response.json().await.map_err(|e| {
            PlacesError::StorageError(format!("Failed to parse token response: {}", e))
        })?;

        log::info!(
            "Refreshed storage access token for {} (expires in {}s)",
            self.key.client_email,
            token.expires_in
        );

        Ok(CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        })
    }
}
