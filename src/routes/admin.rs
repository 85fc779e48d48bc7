// ABOUTME: Route handlers for admin user management, site stats and branding
// ABOUTME: Every endpoint requires the admin role
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::models::{BrandSettings, UserRole};
use crate::routes::auth::UserResponse;
use crate::routes::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, put};
use axum::{Json, Router};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Request body for changing a user's role
#[derive(Debug, Deserialize)]
pub struct SetRoleBody {
    pub role: UserRole,
}

/// Request body for enabling/disabling an account
#[derive(Debug, Deserialize)]
pub struct SetActiveBody {
    pub is_active: bool,
}

/// Request body for updating brand settings
#[derive(Debug, Deserialize)]
pub struct BrandBody {
    pub app_name: String,
    pub logo_url: Option<String>,
    pub primary_color: String,
    pub accent_color: String,
}

/// Site-wide statistics for the admin dashboard
#[derive(Debug, Serialize)]
pub struct AdminStats {
    pub users: i64,
    pub routines: i64,
    pub daily_logs: i64,
}

fn validate_color(field: &str, value: &str) -> AppResult<()> {
    let valid = value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit());
    if valid {
        Ok(())
    } else {
        Err(AppError::invalid_input(format!(
            "{field} must be a #rrggbb color"
        )))
    }
}

/// Admin routes handler
pub struct AdminRoutes;

impl AdminRoutes {
    /// Create all admin routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/admin/users", get(Self::handle_list_users))
            .route("/api/admin/users/:id/role", put(Self::handle_set_role))
            .route("/api/admin/users/:id/active", put(Self::handle_set_active))
            .route("/api/admin/stats", get(Self::handle_stats))
            .route("/api/admin/brand", put(Self::handle_update_brand))
            .with_state(resources)
    }

    /// Handle GET /api/admin/users
    async fn handle_list_users(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let users = resources.database.list_users().await?;
        let response: Vec<UserResponse> = users.iter().map(UserResponse::from).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle PUT /api/admin/users/:id/role
    async fn handle_set_role(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<Uuid>,
        Json(body): Json<SetRoleBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        if user_id == auth.id {
            return Err(AppError::invalid_input("You cannot change your own role"));
        }
        resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        resources.database.update_user_role(user_id, body.role).await?;
        tracing::info!("Admin {} set role of {user_id} to {}", auth.id, body.role.as_str());
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle PUT /api/admin/users/:id/active
    async fn handle_set_active(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(user_id): Path<Uuid>,
        Json(body): Json<SetActiveBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        if user_id == auth.id {
            return Err(AppError::invalid_input("You cannot deactivate yourself"));
        }
        resources
            .database
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        resources
            .database
            .set_user_active(user_id, body.is_active)
            .await?;

        // Deactivation also revokes outstanding sessions
        if !body.is_active {
            resources
                .database
                .revoke_refresh_tokens_for_user(user_id)
                .await?;
        }
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle GET /api/admin/stats
    async fn handle_stats(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        let stats = AdminStats {
            users: resources.database.count_users().await?,
            routines: resources.database.count_routines().await?,
            daily_logs: resources.database.count_daily_logs().await?,
        };
        Ok((StatusCode::OK, Json(stats)).into_response())
    }

    /// Handle PUT /api/admin/brand
    async fn handle_update_brand(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<BrandBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_admin()?;

        if body.app_name.trim().is_empty() {
            return Err(AppError::invalid_input("app_name must not be empty"));
        }
        validate_color("primary_color", &body.primary_color)?;
        validate_color("accent_color", &body.accent_color)?;

        let settings = BrandSettings {
            app_name: body.app_name.trim().to_owned(),
            logo_url: body.logo_url,
            primary_color: body.primary_color,
            accent_color: body.accent_color,
            updated_at: Utc::now(),
        };
        resources.database.update_brand_settings(&settings).await?;
        resources.cache.invalidate_pattern("brand:*").await?;

        Ok((StatusCode::OK, Json(settings)).into_response())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_validation() {
        assert!(validate_color("primary_color", "#1f6f54").is_ok());
        assert!(validate_color("primary_color", "#ZZZZZZ").is_err());
        assert!(validate_color("primary_color", "1f6f54").is_err());
        assert!(validate_color("primary_color", "#fff").is_err());
    }
}
