/*!
 * Google Cloud credentials.
 *
 * Requests are authorized either with an API key header or with an OAuth2
 * access token obtained from a service account key through the JWT bearer
 * grant. Access tokens are cached until shortly before they expire.
 */

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use log::debug;
use parking_lot::Mutex;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, Instant};

use crate::app_config::GoogleCloudConfig;
use crate::errors::ProviderError;

/// OAuth scope covering all the APIs we call
const CLOUD_PLATFORM_SCOPE: &str = "https://www.googleapis.com/auth/cloud-platform";

/// Grant type for exchanging a signed assertion
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// Refresh cached tokens this long before they expire
const REFRESH_MARGIN_SECS: u64 = 60;

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

/// The fields of a service account JSON key we use
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
    #[serde(default)]
    pub project_id: Option<String>,
}

impl fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("token_uri", &self.token_uri)
            .field("project_id", &self.project_id)
            .finish_non_exhaustive()
    }
}

impl ServiceAccountKey {
    /// Decode a base64-encoded JSON key (whitespace is ignored)
    pub fn from_base64(encoded: &str) -> Result<Self, ProviderError> {
        let compact: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
        let json = BASE64.decode(compact.as_bytes()).map_err(|e| {
            ProviderError::AuthenticationError(format!("Credentials are not valid base64: {}", e))
        })?;
        serde_json::from_slice(&json).map_err(|e| {
            ProviderError::AuthenticationError(format!("Credentials are not a service account key: {}", e))
        })
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: u64,
}

struct CachedToken {
    access_token: String,
    refresh_at: Instant,
}

/// Service account with a cached access token
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    client: Client,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountAuth {
    /// Create an authenticator for a key
    pub fn new(key: ServiceAccountKey, client: Client) -> Self {
        Self {
            key,
            client,
            cached: Mutex::new(None),
        }
    }

    /// Project named in the key, if any
    pub fn project_id(&self) -> Option<&str> {
        self.key.project_id.as_deref()
    }

    /// Get a valid access token, fetching a new one when the cache is stale
    pub async fn access_token(&self) -> Result<String, ProviderError> {
        if let Some(cached) = self.cached.lock().as_ref() {
            if Instant::now() < cached.refresh_at {
                return Ok(cached.access_token.clone());
            }
        }

        let token = self.fetch_token().await?;
        let lifetime = token.expires_in.saturating_sub(REFRESH_MARGIN_SECS);
        let access_token = token.access_token.clone();
        *self.cached.lock() = Some(CachedToken {
            access_token: token.access_token,
            refresh_at: Instant::now() + Duration::from_secs(lifetime),
        });

        Ok(access_token)
    }

    /// Build the RS256-signed assertion for the token endpoint
    pub fn signed_assertion(&self) -> Result<String, ProviderError> {
        let now = chrono::Utc::now().timestamp();
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: CLOUD_PLATFORM_SCOPE,
            aud: &self.key.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        let signing_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes()).map_err(|e| {
            ProviderError::AuthenticationError(format!("Invalid service account private key: {}", e))
        })?;

        encode(&Header::new(Algorithm::RS256), &claims, &signing_key).map_err(|e| {
            ProviderError::AuthenticationError(format!("Failed to sign token assertion: {}", e))
        })
    }

    async fn fetch_token(&self) -> Result<TokenResponse, ProviderError> {
        debug!("Requesting access token for {}", self.key.client_email);
        let assertion = self.signed_assertion()?;

        let response = self
            .client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await
            .map_err(|e| ProviderError::ConnectionError(format!("Token endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to get error response text".to_string());
            return Err(ProviderError::AuthenticationError(format!(
                "Token exchange failed ({}): {}",
                status, error_text
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| ProviderError::ParseError(format!("Invalid token response: {}", e)))
    }
}

/// How requests to Google Cloud are authorized
pub enum Credentials {
    /// `x-goog-api-key` header
    ApiKey(String),
    /// OAuth2 bearer token from a service account
    ServiceAccount(ServiceAccountAuth),
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiKey(_) => write!(f, "Credentials::ApiKey(..)"),
            Credentials::ServiceAccount(auth) => {
                write!(f, "Credentials::ServiceAccount({})", auth.key.client_email)
            }
        }
    }
}

impl Credentials {
    /// Pick credentials from configuration; a service account wins over an API key
    pub fn from_config(config: &GoogleCloudConfig, client: Client) -> Result<Self, ProviderError> {
        if !config.credentials_base64.trim().is_empty() {
            let key = ServiceAccountKey::from_base64(&config.credentials_base64)?;
            return Ok(Credentials::ServiceAccount(ServiceAccountAuth::new(key, client)));
        }

        if !config.api_key.trim().is_empty() {
            return Ok(Credentials::ApiKey(config.api_key.trim().to_string()));
        }

        Err(ProviderError::AuthenticationError(
            "No Google Cloud credentials configured".to_string(),
        ))
    }

    /// Project named by the credentials, if any
    pub fn project_id(&self) -> Option<&str> {
        match self {
            Credentials::ApiKey(_) => None,
            Credentials::ServiceAccount(auth) => auth.project_id(),
        }
    }

    /// Attach authorization to a request
    pub async fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ProviderError> {
        match self {
            Credentials::ApiKey(key) => Ok(request.header("x-goog-api-key", key)),
            Credentials::ServiceAccount(auth) => {
                let token = auth.access_token().await?;
                Ok(request.bearer_auth(token))
            }
        }
    }
}
