// ABOUTME: Route handlers for registration, login, token refresh and profile
// ABOUTME: First registered account is promoted to admin for bootstrap
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

//! Auth routes.
//!
//! `register`, `login` and `refresh` are public; `me` requires a bearer
//! token. Refresh tokens rotate on every use.

use crate::auth::{generate_refresh_token, hash_password, hash_token, verify_password};
use crate::errors::{AppError, AppResult};
use crate::models::{User, UserRole};
use crate::routes::ServerResources;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Minimum accepted password length
const MIN_PASSWORD_CHARS: usize = 8;

/// Request body for registration
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub display_name: Option<String>,
    /// Optional coach invitation token; accepted atomically with signup
    pub invite_token: Option<String>,
}

/// Request body for login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for the refresh flow
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh_token: String,
}

/// Public view of a user account
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub role: UserRole,
    pub coach_id: Option<String>,
    pub onboarding_completed: bool,
    pub created_at: String,
}

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            role: user.role,
            coach_id: user.coach_id.map(|id| id.to_string()),
            onboarding_completed: user.onboarding_completed,
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

/// Response for register/login
#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub user: UserResponse,
    pub token: String,
    pub refresh_token: String,
    /// Access token lifetime in seconds
    pub expires_in: i64,
}

/// Response for the refresh flow
#[derive(Debug, Serialize)]
pub struct RefreshResponse {
    pub token: String,
    pub refresh_token: String,
    pub expires_in: i64,
}

/// Auth routes handler
pub struct AuthRoutes;

impl AuthRoutes {
    /// Create all auth routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/auth/register", post(Self::handle_register))
            .route("/api/auth/login", post(Self::handle_login))
            .route("/api/auth/refresh", post(Self::handle_refresh))
            .route("/api/auth/me", get(Self::handle_me))
            .with_state(resources)
    }

    fn validate_credentials(email: &str, password: &str) -> AppResult<()> {
        if !email.contains('@') || email.len() < 3 {
            return Err(AppError::invalid_input("A valid email address is required"));
        }
        if password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(AppError::invalid_input(format!(
                "Password must be at least {MIN_PASSWORD_CHARS} characters"
            )));
        }
        Ok(())
    }

    /// Issue the access + refresh pair for a user
    async fn issue_session(
        resources: &Arc<ServerResources>,
        user: &User,
    ) -> AppResult<(String, String)> {
        let token = resources.auth_manager.generate_token(user)?;

        let refresh_token = generate_refresh_token();
        let expires_at = Utc::now() + Duration::days(resources.config.auth.refresh_expiry_days);
        resources
            .database
            .create_refresh_token(user.id, &hash_token(&refresh_token), expires_at)
            .await?;

        Ok((token, refresh_token))
    }

    /// Handle POST /api/auth/register
    async fn handle_register(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RegisterRequest>,
    ) -> AppResult<Response> {
        Self::validate_credentials(&body.email, &body.password)?;

        let email = body.email.trim().to_lowercase();
        if resources.database.get_user_by_email(&email).await?.is_some() {
            return Err(AppError::conflict("Email is already registered"));
        }

        let mut user = User::new(email, hash_password(&body.password)?, body.display_name);

        // Bootstrap: the very first account becomes the site admin
        if resources.database.count_users().await? == 0 {
            user.role = UserRole::Admin;
        }

        resources.database.create_user(&user).await?;
        tracing::info!("Registered user {} ({})", user.id, user.role.as_str());

        // Invite acceptance is best effort at signup; a bad token still
        // leaves a working account that can accept later
        if let Some(invite_token) = body.invite_token.as_deref() {
            match resources
                .database
                .accept_invite(&hash_token(invite_token), user.id)
                .await
            {
                Ok(coach_id) => {
                    tracing::info!("User {} joined coach {} via invite", user.id, coach_id);
                }
                Err(e) => tracing::warn!("Invite not applied at signup for {}: {e}", user.id),
            }
        }

        // Re-read so the response reflects invite side effects
        let user = resources
            .database
            .get_user(user.id)
            .await?
            .ok_or_else(|| AppError::internal("User vanished after registration"))?;

        let (token, refresh_token) = Self::issue_session(&resources, &user).await?;
        let response = SessionResponse {
            user: UserResponse::from(&user),
            token,
            refresh_token,
            expires_in: resources.auth_manager.expires_in_secs(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle POST /api/auth/login
    async fn handle_login(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<LoginRequest>,
    ) -> AppResult<Response> {
        let email = body.email.trim().to_lowercase();

        // Same error for unknown email and bad password
        let invalid = || AppError::auth_invalid("Invalid email or password");

        let user = resources
            .database
            .get_user_by_email(&email)
            .await?
            .ok_or_else(invalid)?;

        if !verify_password(&body.password, &user.password_hash)? {
            tracing::warn!("Failed login attempt for {email}");
            return Err(invalid());
        }
        if !user.is_active {
            return Err(AppError::forbidden("Account is deactivated"));
        }

        let (token, refresh_token) = Self::issue_session(&resources, &user).await?;
        let response = SessionResponse {
            user: UserResponse::from(&user),
            token,
            refresh_token,
            expires_in: resources.auth_manager.expires_in_secs(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle POST /api/auth/refresh - rotate the refresh token
    async fn handle_refresh(
        State(resources): State<Arc<ServerResources>>,
        Json(body): Json<RefreshRequest>,
    ) -> AppResult<Response> {
        let user_id = resources
            .database
            .consume_refresh_token(&hash_token(&body.refresh_token))
            .await?
            .ok_or_else(|| AppError::auth_invalid("Refresh token is invalid or expired"))?;

        let user = resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::auth_invalid("User no longer exists"))?;

        if !user.is_active {
            return Err(AppError::forbidden("Account is deactivated"));
        }

        let (token, refresh_token) = Self::issue_session(&resources, &user).await?;
        let response = RefreshResponse {
            token,
            refresh_token,
            expires_in: resources.auth_manager.expires_in_secs(),
        };
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/auth/me
    async fn handle_me(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let user = resources
            .database
            .get_user(auth.id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok((StatusCode::OK, Json(UserResponse::from(&user))).into_response())
    }
}
