// ABOUTME: Route handlers for direct messages and the notification feed
// ABOUTME: Messaging is restricted to coach-client pairs (admins exempt)
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

use crate::errors::{AppError, AppResult};
use crate::middleware::AuthedUser;
use crate::models::UserRole;
use crate::routes::ServerResources;
use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Maximum message length in characters
const MAX_MESSAGE_CHARS: usize = 4000;

/// Request body for sending a message
#[derive(Debug, Deserialize)]
pub struct SendMessageBody {
    pub body: String,
}

/// Query parameters for the notification feed
#[derive(Debug, Deserialize, Default)]
pub struct NotificationsQuery {
    #[serde(default)]
    pub unread: bool,
}

/// Messaging routes handler
pub struct MessagingRoutes;

impl MessagingRoutes {
    /// Create all messaging and notification routes
    pub fn routes(resources: Arc<ServerResources>) -> Router {
        Router::new()
            .route(
                "/api/messages/conversations",
                get(Self::handle_conversations),
            )
            .route("/api/messages/:peer_id", get(Self::handle_thread))
            .route("/api/messages/:peer_id", post(Self::handle_send))
            .route("/api/messages/:peer_id/read", post(Self::handle_mark_read))
            .route("/api/notifications", get(Self::handle_notifications))
            .route(
                "/api/notifications/:id/read",
                post(Self::handle_notification_read),
            )
            .route(
                "/api/notifications/read-all",
                post(Self::handle_notifications_read_all),
            )
            .with_state(resources)
    }

    /// Messaging is allowed within a coach-client pair; admins can message
    /// anyone
    async fn assert_can_message(
        resources: &Arc<ServerResources>,
        sender: &AuthedUser,
        peer_id: Uuid,
    ) -> AppResult<()> {
        if sender.role == UserRole::Admin {
            return Ok(());
        }

        let peer = resources
            .database
            .get_user(peer_id)
            .await?
            .ok_or_else(|| AppError::not_found("User"))?;

        let paired = sender.coach_id == Some(peer_id)
            || peer.coach_id == Some(sender.id)
            || peer.role == UserRole::Admin;
        if paired {
            Ok(())
        } else {
            Err(AppError::forbidden(
                "Messaging is only available between a coach and their clients",
            ))
        }
    }

    /// Handle GET /api/messages/conversations
    async fn handle_conversations(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let peers = resources.database.list_conversation_peers(auth.id).await?;
        let peer_ids: Vec<String> = peers.iter().map(Uuid::to_string).collect();
        Ok((StatusCode::OK, Json(peer_ids)).into_response())
    }

    /// Handle GET /api/messages/:peer_id
    async fn handle_thread(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(peer_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        Self::assert_can_message(&resources, &auth, peer_id).await?;

        let messages = resources
            .database
            .list_messages_between(auth.id, peer_id)
            .await?;
        Ok((StatusCode::OK, Json(messages)).into_response())
    }

    /// Handle POST /api/messages/:peer_id
    async fn handle_send(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(peer_id): Path<Uuid>,
        Json(body): Json<SendMessageBody>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;

        let text = body.body.trim();
        if text.is_empty() {
            return Err(AppError::invalid_input("Message body must not be empty"));
        }
        if text.chars().count() > MAX_MESSAGE_CHARS {
            return Err(AppError::invalid_input(format!(
                "Message body must be at most {MAX_MESSAGE_CHARS} characters"
            )));
        }

        Self::assert_can_message(&resources, &auth, peer_id).await?;

        let message = resources
            .database
            .create_message(auth.id, peer_id, text)
            .await?;
        Ok((StatusCode::CREATED, Json(message)).into_response())
    }

    /// Handle POST /api/messages/:peer_id/read
    async fn handle_mark_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(peer_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let updated = resources.database.mark_messages_read(auth.id, peer_id).await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "updated": updated }))).into_response())
    }

    /// Handle GET /api/notifications
    async fn handle_notifications(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Query(query): Query<NotificationsQuery>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let notifications = resources
            .database
            .list_notifications(auth.id, query.unread)
            .await?;
        Ok((StatusCode::OK, Json(notifications)).into_response())
    }

    /// Handle POST /api/notifications/:id/read
    async fn handle_notification_read(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
        Path(notification_id): Path<Uuid>,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        resources
            .database
            .mark_notification_read(notification_id, auth.id)
            .await?;
        Ok(StatusCode::NO_CONTENT.into_response())
    }

    /// Handle POST /api/notifications/read-all
    async fn handle_notifications_read_all(
        State(resources): State<Arc<ServerResources>>,
        headers: HeaderMap,
    ) -> AppResult<Response> {
        let auth = resources.auth_middleware.authenticate_request(&headers).await?;
        let updated = resources.database.mark_all_notifications_read(auth.id).await?;
        Ok((StatusCode::OK, Json(serde_json::json!({ "updated": updated }))).into_response())
    }
}
