// ABOUTME: Authentication middleware for request authentication and authorization
// ABOUTME: Validates bearer JWTs, loads the user and enforces role requirements
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::auth::AuthManager;
use crate::database::Database;
use crate::errors::{AppError, AppResult};
use crate::models::UserRole;
use axum::http::HeaderMap;
use std::sync::Arc;
use uuid::Uuid;

/// Identity attached to an authenticated request
#[derive(Debug, Clone)]
pub struct AuthedUser {
    /// Authenticated user `ID`
    pub id: Uuid,
    /// User email from the database row
    pub email: String,
    /// Current role (read fresh, not from the token)
    pub role: UserRole,
    /// Assigned coach, if any
    pub coach_id: Option<Uuid>,
}

impl AuthedUser {
    /// Require the admin role
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for non-admin users.
    pub fn require_admin(&self) -> AppResult<()> {
        if self.role == UserRole::Admin {
            Ok(())
        } else {
            Err(AppError::forbidden("Admin role required"))
        }
    }

    /// Require the coach or admin role
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` for plain client users.
    pub fn require_coach(&self) -> AppResult<()> {
        if self.role.is_privileged() {
            Ok(())
        } else {
            Err(AppError::forbidden("Coach role required"))
        }
    }
}

/// Middleware for bearer-token authentication
#[derive(Clone)]
pub struct AuthMiddleware {
    auth_manager: Arc<AuthManager>,
    database: Arc<Database>,
}

impl AuthMiddleware {
    /// Create new auth middleware
    #[must_use]
    pub const fn new(auth_manager: Arc<AuthManager>, database: Arc<Database>) -> Self {
        Self {
            auth_manager,
            database,
        }
    }

    /// Authenticate a request from its headers
    ///
    /// A missing `Authorization` header is a 401; a header that is present
    /// but malformed, forged or expired is a 403.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails for any of the reasons
    /// above, or the user row cannot be loaded.
    #[tracing::instrument(
        skip(self, headers),
        fields(user_id = tracing::field::Empty, success = tracing::field::Empty)
    )]
    pub async fn authenticate_request(&self, headers: &HeaderMap) -> AppResult<AuthedUser> {
        let Some(auth_header) = headers.get("authorization").and_then(|h| h.to_str().ok())
        else {
            tracing::debug!("Authentication failed: missing authorization header");
            return Err(AppError::auth_required());
        };

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            tracing::warn!("Authentication failed: authorization header is not a bearer token");
            return Err(AppError::auth_invalid(
                "Invalid authorization header format - must be 'Bearer <token>'",
            ));
        };

        self.authenticate_token(token).await
    }

    /// Authenticate a raw `JWT` and load the current user row
    ///
    /// # Errors
    ///
    /// Returns an error if the token fails validation, the user no longer
    /// exists or the account is disabled.
    pub async fn authenticate_token(&self, token: &str) -> AppResult<AuthedUser> {
        let claims = self.auth_manager.validate_token(token).map_err(|e| {
            tracing::Span::current().record("success", false);
            AppError::from(e)
        })?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| AppError::auth_invalid("Invalid user ID in token"))?;

        let user = self
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User no longer exists"))?;

        if !user.is_active {
            tracing::warn!("Authentication rejected for deactivated user {user_id}");
            return Err(AppError::forbidden("Account is deactivated"));
        }

        tracing::Span::current()
            .record("user_id", user_id.to_string())
            .record("success", true);

        Ok(AuthedUser {
            id: user.id,
            email: user.email,
            role: user.role,
            coach_id: user.coach_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::User;

    fn authed(role: UserRole) -> AuthedUser {
        let user = User::new("t@example.com".to_owned(), "h".to_owned(), None);
        AuthedUser {
            id: user.id,
            email: user.email,
            role,
            coach_id: None,
        }
    }

    #[test]
    fn test_role_guards() {
        assert!(authed(UserRole::Admin).require_admin().is_ok());
        assert!(authed(UserRole::Coach).require_admin().is_err());
        assert!(authed(UserRole::Coach).require_coach().is_ok());
        assert!(authed(UserRole::Admin).require_coach().is_ok());
        assert!(authed(UserRole::Client).require_coach().is_err());
    }
}
