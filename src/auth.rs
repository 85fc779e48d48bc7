// ABOUTME: JWT-based user authentication and session management
// ABOUTME: Handles password hashing, token generation, validation and refresh
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! # Authentication and Session Management
//!
//! Stateless HS256 JWT access tokens plus database-backed refresh tokens.
//! Refresh tokens are random 256-bit values handed to the client once and
//! stored only as sha256 hashes; using one rotates it.

use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// `JWT` validation error with detailed information
#[derive(Debug, Clone)]
pub enum JwtValidationError {
    /// Token has expired
    TokenExpired {
        /// When the token expired
        expired_at: DateTime<Utc>,
        /// Current time for reference
        current_time: DateTime<Utc>,
    },
    /// Token signature is invalid
    TokenInvalid {
        /// Reason for invalidity
        reason: String,
    },
    /// Token is malformed (not proper `JWT` format)
    TokenMalformed {
        /// Details about malformation
        details: String,
    },
}

impl std::fmt::Display for JwtValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::TokenExpired {
                expired_at,
                current_time,
            } => {
                let expired_for = current_time.signed_duration_since(*expired_at);
                write!(
                    f,
                    "JWT token expired {} minutes ago at {}",
                    expired_for.num_minutes(),
                    expired_at.format("%Y-%m-%d %H:%M:%S UTC")
                )
            }
            Self::TokenInvalid { reason } => {
                write!(f, "JWT token signature is invalid: {reason}")
            }
            Self::TokenMalformed { details } => {
                write!(f, "JWT token is malformed: {details}")
            }
        }
    }
}

impl std::error::Error for JwtValidationError {}

impl From<JwtValidationError> for AppError {
    fn from(error: JwtValidationError) -> Self {
        match &error {
            JwtValidationError::TokenExpired { .. } => Self::auth_expired(),
            JwtValidationError::TokenInvalid { reason } => Self::auth_invalid(reason.clone()),
            JwtValidationError::TokenMalformed { details } => Self::auth_invalid(details.clone()),
        }
    }
}

/// `JWT` claims for user authentication
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// User `ID`
    pub sub: String,
    /// User email
    pub email: String,
    /// Account role at issuance time
    pub role: UserRole,
    /// Issued at timestamp (seconds)
    pub iat: i64,
    /// Expiration timestamp (seconds)
    pub exp: i64,
}

/// Authentication manager for `JWT` tokens and password hashes
pub struct AuthManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    token_expiry_hours: i64,
}

impl AuthManager {
    /// Create a new authentication manager from the raw HS256 secret
    #[must_use]
    pub fn new(jwt_secret: &[u8], token_expiry_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret),
            decoding_key: DecodingKey::from_secret(jwt_secret),
            token_expiry_hours,
        }
    }

    /// Generate a `JWT` access token for a user
    ///
    /// # Errors
    ///
    /// Returns an error if JWT encoding fails.
    pub fn generate_token(&self, user: &User) -> AppResult<String> {
        let now = Utc::now();
        let expiry = now + Duration::hours(self.token_expiry_hours);

        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: expiry.timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::internal(format!("Failed to encode JWT: {e}")))
    }

    /// Validate a `JWT` token with detailed error information
    ///
    /// Expiry is checked manually after signature verification so an
    /// expired token is distinguishable from a forged one.
    ///
    /// # Errors
    ///
    /// Returns a [`JwtValidationError`] when the token is expired, has a
    /// bad signature, or is not a `JWT` at all.
    pub fn validate_token(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let claims = self.decode_claims(token)?;

        let current_time = Utc::now();
        if current_time.timestamp() > claims.exp {
            let expired_at = DateTime::from_timestamp(claims.exp, 0).unwrap_or(current_time);
            tracing::warn!(
                "JWT token expired for user {} at {}",
                claims.sub,
                expired_at.to_rfc3339()
            );
            return Err(JwtValidationError::TokenExpired {
                expired_at,
                current_time,
            });
        }

        Ok(claims)
    }

    /// Decode and signature-check claims without expiration validation
    fn decode_claims(&self, token: &str) -> Result<Claims, JwtValidationError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| Self::convert_jwt_error(&e))
    }

    /// Convert JWT library errors to detailed validation errors
    fn convert_jwt_error(e: &jsonwebtoken::errors::Error) -> JwtValidationError {
        use jsonwebtoken::errors::ErrorKind;
        tracing::warn!("JWT token validation failed: {:?}", e);

        match e.kind() {
            ErrorKind::InvalidSignature => JwtValidationError::TokenInvalid {
                reason: "Token signature verification failed".into(),
            },
            ErrorKind::InvalidToken => JwtValidationError::TokenMalformed {
                details: "Token format is invalid".into(),
            },
            ErrorKind::Base64(base64_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid base64: {base64_err}"),
            },
            ErrorKind::Json(json_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid JSON: {json_err}"),
            },
            ErrorKind::Utf8(utf8_err) => JwtValidationError::TokenMalformed {
                details: format!("Token contains invalid UTF-8: {utf8_err}"),
            },
            _ => JwtValidationError::TokenInvalid {
                reason: format!("Token validation failed: {e}"),
            },
        }
    }

    /// Extract the user `ID` from a token, accepting expired tokens.
    ///
    /// Used by the refresh flow, where the access token may already be
    /// expired but must still be genuine.
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid or the subject is not
    /// a `UUID`.
    pub fn extract_user_id(&self, token: &str) -> AppResult<Uuid> {
        let claims = self.decode_claims(token)?;
        Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))
    }

    /// Access token lifetime in seconds, for login responses
    #[must_use]
    pub const fn expires_in_secs(&self) -> i64 {
        self.token_expiry_hours * 3600
    }
}

/// Hash a password for storage
///
/// # Errors
///
/// Returns an error if bcrypt fails (only on invalid cost, which is fixed
/// here).
pub fn hash_password(password: &str) -> AppResult<String> {
    bcrypt::hash(password, bcrypt::DEFAULT_COST)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a stored hash
///
/// # Errors
///
/// Returns an error if the stored hash is not valid bcrypt output.
pub fn verify_password(password: &str, password_hash: &str) -> AppResult<bool> {
    bcrypt::verify(password, password_hash)
        .map_err(|e| AppError::internal(format!("Failed to verify password: {e}")))
}

/// Generate a random 256-bit refresh token, returned as hex
#[must_use]
pub fn generate_refresh_token() -> String {
    let mut bytes = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Hash a refresh or invite token for at-rest storage
#[must_use]
pub fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_manager() -> AuthManager {
        AuthManager::new(b"test-secret-test-secret-test-secret!", 24)
    }

    fn test_user() -> User {
        User::new(
            "athlete@example.com".to_owned(),
            "hash".to_owned(),
            Some("Athlete".to_owned()),
        )
    }

    #[test]
    fn test_token_round_trip() {
        let manager = test_manager();
        let user = test_user();

        let token = manager.generate_token(&user).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, user.id.to_string());
        assert_eq!(claims.email, user.email);
        assert_eq!(claims.role, UserRole::Client);
    }

    #[test]
    fn test_expired_token_rejected() {
        let manager = AuthManager::new(b"test-secret-test-secret-test-secret!", -1);
        let user = test_user();

        let token = manager.generate_token(&user).unwrap();
        let err = manager.validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenExpired { .. }));

        // The refresh path still accepts it for identity extraction
        assert_eq!(manager.extract_user_id(&token).unwrap(), user.id);
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let manager = test_manager();
        let other = AuthManager::new(b"another-secret-another-secret-!!!!!!", 24);
        let user = test_user();

        let token = manager.generate_token(&user).unwrap();
        let err = other.validate_token(&token).unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenInvalid { .. }));
    }

    #[test]
    fn test_garbage_token_is_malformed() {
        let manager = test_manager();
        let err = manager.validate_token("not-a-jwt").unwrap_err();
        assert!(matches!(err, JwtValidationError::TokenMalformed { .. }));
    }

    #[test]
    fn test_password_hashing() {
        let hash = hash_password("hunter2!").unwrap();
        assert!(verify_password("hunter2!", &hash).unwrap());
        assert!(!verify_password("hunter3!", &hash).unwrap());
    }

    #[test]
    fn test_refresh_token_hashing_is_stable() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), 64);
        assert_eq!(hash_token(&token), hash_token(&token));
        assert_ne!(hash_token(&token), hash_token("other"));
    }
}
