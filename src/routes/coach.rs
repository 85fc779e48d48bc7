// ABOUTME: Route handlers for coach features: clients, invites, check-in review
// ABOUTME: Invite acceptance is also mounted here for authenticated clients
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::auth::{generate_refresh_token, hash_token};
use crate::errors::{AppError, AppResult};
use crate::routes::auth::UserResponse;
use crate::routes::ServerResources;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// Invites expire after this many days
const INVITE_EXPIRY_DAYS: i64 = 14;

/// Request body for creating an invite
#[derive(Debug, Deserialize, Default)]
pub struct CreateInviteBody {
    /// Prefill email shown on the acceptance page
    pub email: Option<String>,
}

/// Response for a created invite; the raw token appears exactly once
#[derive(Debug, Serialize)]
pub struct InviteResponse {
    pub id: String,
    /// Raw token to hand to the client out of band
    pub token: String,
    /// Ready-to-share acceptance link
    pub accept_link: String,
    pub expires_at: String,
}

/// Request body for accepting an invite
#[derive(Debug, Deserialize)]
pub struct AcceptInviteBody {
    pub token: String,
}

/// Request body for commenting on a check-in
#[derive(Debug, Deserialize)]
pub struct CommentBody {
    pub comment: String,
}

/// Client summary returned to coaches
#[derive(Debug, Serialize)]
pub struct ClientSummary {
    pub user: UserResponse,
    pub active_goal: Option<crate::models::Goal>,
    pub recent_logs: Vec<crate::models::DailyLog>,
    pub checkin_count: usize,
}

/// Coach routes handler
pub struct CoachRoutes;

impl CoachRoutes {
    /// Create all coach routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route("/api/coach/clients", get(Self::handle_list_clients))
            .route(
                "/api/coach/clients/:id/summary",
                get(Self::handle_client_summary),
            )
            .route("/api/coach/invites", post(Self::handle_create_invite))
            .route("/api/coach/invites", get(Self::handle_list_invites))
            .route("/api/coach/checkins", get(Self::handle_list_checkins))
            .route(
                "/api/coach/checkins/:id/comment",
                post(Self::handle_comment_checkin),
            )
            .route("/api/invites/accept", post(Self::handle_accept_invite))
            .with_state(resources)
    }

    /// Resolve a client that belongs to the requesting coach
    async fn owned_client(
        resources: &Arc<ServerResources>,
        coach_id: Uuid,
        client_id: Uuid,
    ) -> AppResult<crate::models::User> {
        let client = resources
            .database
            .get_user(client_id)
            .await?
            .ok_or_else(|| AppError::not_found("Client"))?;

        if client.coach_id != Some(coach_id) {
            return Err(AppError::forbidden("Client is not assigned to you"));
        }
        Ok(client)
    }

    /// Handle GET /api/coach/clients
    async fn handle_list_clients(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_coach()?;

        let clients = resources.database.list_clients_for_coach(auth.id).await?;
        let response: Vec<UserResponse> = clients.iter().map(UserResponse::from).collect();
        Ok((StatusCode::OK, Json(response)).into_response())
    }

    /// Handle GET /api/coach/clients/:id/summary
    async fn handle_client_summary(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(client_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_coach()?;

        let client = Self::owned_client(&resources, auth.id, client_id).await?;

        let today = Utc::now().date_naive();
        let recent_logs = resources
            .database
            .list_daily_logs(client_id, today - Duration::days(13), today)
            .await?;
        let active_goal = resources.database.get_active_goal(client_id).await?;
        let checkins = resources.database.list_checkins_for_client(client_id).await?;

        let summary = ClientSummary {
            user: UserResponse::from(&client),
            active_goal,
            recent_logs,
            checkin_count: checkins.len(),
        };
        Ok((StatusCode::OK, Json(summary)).into_response())
    }

    /// Handle POST /api/coach/invites
    async fn handle_create_invite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<CreateInviteBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_coach()?;

        // Invite tokens reuse the refresh-token entropy source
        let raw_token = generate_refresh_token();
        let expires_at = Utc::now() + Duration::days(INVITE_EXPIRY_DAYS);

        let invite = resources
            .database
            .create_invite(auth.id, &hash_token(&raw_token), body.email.as_deref(), expires_at)
            .await?;

        let frontend = resources
            .config
            .frontend_url
            .as_deref()
            .unwrap_or("http://localhost:5173");
        let response = InviteResponse {
            id: invite.id.to_string(),
            accept_link: format!("{frontend}/invite?token={raw_token}"),
            token: raw_token,
            expires_at: invite.expires_at.to_rfc3339(),
        };
        Ok((StatusCode::CREATED, Json(response)).into_response())
    }

    /// Handle GET /api/coach/invites
    async fn handle_list_invites(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_coach()?;

        let invites = resources.database.list_invites_for_coach(auth.id).await?;
        Ok((StatusCode::OK, Json(invites)).into_response())
    }

    /// Handle POST /api/invites/accept - a logged-in client joins a coach
    async fn handle_accept_invite(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Json(body): Json<AcceptInviteBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let coach_id = resources
            .database
            .accept_invite(&hash_token(&body.token), auth.id)
            .await?;

        resources
            .database
            .create_notification(
                coach_id,
                "client_joined",
                "New client",
                &format!("{} accepted your invitation", auth.email),
            )
            .await?;

        tracing::info!("User {} joined coach {coach_id}", auth.id);
        Ok((StatusCode::OK, Json(serde_json::json!({ "coach_id": coach_id }))).into_response())
    }

    /// Handle GET /api/coach/checkins
    async fn handle_list_checkins(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_coach()?;

        let checkins = resources.database.list_checkins_for_coach(auth.id).await?;
        Ok((StatusCode::OK, Json(checkins)).into_response())
    }

    /// Handle POST /api/coach/checkins/:id/comment
    async fn handle_comment_checkin(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(checkin_id): Path<Uuid>,
        Json(body): Json<CommentBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        auth.require_coach()?;

        if body.comment.trim().is_empty() {
            return Err(AppError::invalid_input("Comment must not be empty"));
        }

        resources
            .database
            .comment_on_checkin(checkin_id, auth.id, body.comment.trim())
            .await?;

        // Notify the client that their coach replied
        let checkins = resources.database.list_checkins_for_coach(auth.id).await?;
        if let Some(checkin) = checkins.iter().find(|c| c.id == checkin_id) {
            resources
                .database
                .create_notification(
                    checkin.client_id,
                    "checkin_comment",
                    "Coach feedback",
                    "Your coach commented on your check-in",
                )
                .await?;
        }

        Ok(StatusCode::NO_CONTENT.into_response())
    }
}
