/*!
 * Signed access tokens.
 *
 * Tokens are HS512 JWTs whose subject is the user ID.
 */

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::app_config::AuthConfig;
use crate::errors::{AppError, AppResult};

/// Claims carried by an access token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    /// Issued at, seconds since the epoch
    pub iat: i64,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Issues and validates access tokens
#[derive(Clone)]
pub struct JwtTokenProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiration_ms: u64,
}

impl fmt::Debug for JwtTokenProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtTokenProvider")
            .field("expiration_ms", &self.expiration_ms)
            .finish_non_exhaustive()
    }
}

impl JwtTokenProvider {
    /// Create a provider from a raw secret
    pub fn new(secret: &[u8], expiration_ms: u64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiration_ms,
        }
    }

    /// Create a provider from the auth configuration
    pub fn from_config(config: &AuthConfig) -> Self {
        Self::new(config.jwt_secret.as_bytes(), config.jwt_expiration_ms)
    }

    /// Token lifetime in milliseconds
    pub fn expiration_ms(&self) -> u64 {
        self.expiration_ms
    }

    /// Issue a token for a user
    pub fn generate_token(&self, user_id: &str) -> AppResult<String> {
        let now = chrono::Utc::now().timestamp_millis();
        let expires = now.saturating_add(i64::try_from(self.expiration_ms).unwrap_or(i64::MAX));
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now / 1000,
            exp: expires / 1000,
        };

        encode(&Header::new(Algorithm::HS512), &claims, &self.encoding_key)
            .map_err(|e| AppError::Unknown(format!("Failed to sign token: {}", e)))
    }

    /// Validate a token and return the user ID it was issued for
    pub fn validate_token(&self, token: &str) -> AppResult<String> {
        let mut validation = Validation::new(Algorithm::HS512);
        validation.leeway = 0;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims.sub)
            .map_err(|e| AppError::Unauthorized(format!("Invalid or expired token: {}", e)))
    }
}
