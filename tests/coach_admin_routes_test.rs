// ABOUTME: Integration tests for coach invitations, check-ins and admin endpoints
// ABOUTME: Covers role guards, invite acceptance and brand settings
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, register_user, request, send, test_app, TestSession};
use forma_server::routes::ServerResources;
use std::sync::Arc;

/// First user is the admin; promote the second to coach via the admin API
async fn setup_coach(
    app: &axum::Router,
    _resources: &Arc<ServerResources>,
) -> (TestSession, TestSession) {
    let admin = register_user(app, "admin@example.com").await;
    let coach = register_user(app, "coach@example.com").await;

    let response = send(
        app,
        request(
            Method::PUT,
            &format!("/api/admin/users/{}/role", coach.user_id),
            Some(&admin.token),
            Some(serde_json::json!({ "role": "coach" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    (admin, coach)
}

#[tokio::test]
async fn test_admin_guard_rejects_clients() {
    let (app, _resources) = test_app().await;
    register_user(&app, "admin@example.com").await;
    let client = register_user(&app, "client@example.com").await;

    let response = send(
        &app,
        request(Method::GET, "/api/admin/users", Some(&client.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_invite_accept_links_client_to_coach() {
    let (app, resources) = test_app().await;
    let (_admin, coach) = setup_coach(&app, &resources).await;
    let client = register_user(&app, "client@example.com").await;

    // Coach creates an invite and receives the raw token once
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/coach/invites",
            Some(&coach.token),
            Some(serde_json::json!({ "email": "client@example.com" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let invite = body_json(response).await;
    let token = invite["token"].as_str().unwrap().to_owned();
    assert!(invite["accept_link"].as_str().unwrap().contains(&token));

    // Client accepts
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/invites/accept",
            Some(&client.token),
            Some(serde_json::json!({ "token": token })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The coach now sees the client
    let response = send(
        &app,
        request(Method::GET, "/api/coach/clients", Some(&coach.token), None),
    )
    .await;
    let clients = body_json(response).await;
    assert_eq!(clients.as_array().unwrap().len(), 1);
    assert_eq!(clients[0]["email"], serde_json::json!("client@example.com"));

    // A used invite cannot be accepted again
    let other = register_user(&app, "other@example.com").await;
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/invites/accept",
            Some(&other.token),
            Some(serde_json::json!({ "token": token })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_checkin_flow_with_coach_comment() {
    let (app, resources) = test_app().await;
    let (_admin, coach) = setup_coach(&app, &resources).await;
    let client = register_user(&app, "client@example.com").await;

    // Link the client directly through the database
    let client_id = uuid::Uuid::parse_str(&client.user_id).unwrap();
    let coach_id = uuid::Uuid::parse_str(&coach.user_id).unwrap();
    resources
        .database
        .set_user_coach(client_id, Some(coach_id))
        .await
        .unwrap();

    // Client submits a check-in
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/checkins",
            Some(&client.token),
            Some(serde_json::json!({ "note": "Tough week", "weight_kg": 79.2 })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let checkin = body_json(response).await;
    let checkin_id = checkin["id"].as_str().unwrap().to_owned();

    // Coach sees it and comments
    let response = send(
        &app,
        request(Method::GET, "/api/coach/checkins", Some(&coach.token), None),
    )
    .await;
    let checkins = body_json(response).await;
    assert_eq!(checkins.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        request(
            Method::POST,
            &format!("/api/coach/checkins/{checkin_id}/comment"),
            Some(&coach.token),
            Some(serde_json::json!({ "comment": "Keep at it" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Client sees the comment and a notification
    let response = send(
        &app,
        request(Method::GET, "/api/checkins", Some(&client.token), None),
    )
    .await;
    let checkins = body_json(response).await;
    assert_eq!(checkins[0]["coach_comment"], serde_json::json!("Keep at it"));
}

#[tokio::test]
async fn test_checkin_requires_a_coach() {
    let (app, _resources) = test_app().await;
    register_user(&app, "admin@example.com").await;
    let loner = register_user(&app, "loner@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/checkins",
            Some(&loner.token),
            Some(serde_json::json!({ "note": "hello" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_messaging_requires_pairing() {
    let (app, resources) = test_app().await;
    let (_admin, coach) = setup_coach(&app, &resources).await;
    let client = register_user(&app, "client@example.com").await;
    let stranger = register_user(&app, "stranger@example.com").await;

    let client_id = uuid::Uuid::parse_str(&client.user_id).unwrap();
    let coach_id = uuid::Uuid::parse_str(&coach.user_id).unwrap();
    resources
        .database
        .set_user_coach(client_id, Some(coach_id))
        .await
        .unwrap();

    // Client and coach can talk
    let response = send(
        &app,
        request(
            Method::POST,
            &format!("/api/messages/{coach_id}"),
            Some(&client.token),
            Some(serde_json::json!({ "body": "Hi coach" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    // Strangers cannot
    let response = send(
        &app,
        request(
            Method::POST,
            &format!("/api/messages/{client_id}"),
            Some(&stranger.token),
            Some(serde_json::json!({ "body": "spam" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The thread is visible to both sides
    let response = send(
        &app,
        request(
            Method::GET,
            &format!("/api/messages/{client_id}"),
            Some(&coach.token),
            None,
        ),
    )
    .await;
    let thread = body_json(response).await;
    assert_eq!(thread.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_brand_settings_update_and_public_read() {
    let (app, _resources) = test_app().await;
    let admin = register_user(&app, "admin@example.com").await;

    // Public read works unauthenticated and returns the defaults
    let response = send(&app, request(Method::GET, "/api/brand", None, None)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let brand = body_json(response).await;
    assert_eq!(brand["app_name"], serde_json::json!("Forma"));

    let response = send(
        &app,
        request(
            Method::PUT,
            "/api/admin/brand",
            Some(&admin.token),
            Some(serde_json::json!({
                "app_name": "IronClub",
                "primary_color": "#112233",
                "accent_color": "#445566",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    // The cached public read reflects the update (write invalidates)
    let response = send(&app, request(Method::GET, "/api/brand", None, None)).await;
    let brand = body_json(response).await;
    assert_eq!(brand["app_name"], serde_json::json!("IronClub"));

    // Bad colors are rejected
    let response = send(
        &app,
        request(
            Method::PUT,
            "/api/admin/brand",
            Some(&admin.token),
            Some(serde_json::json!({
                "app_name": "IronClub",
                "primary_color": "red",
                "accent_color": "#445566",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_stats_and_deactivation() {
    let (app, _resources) = test_app().await;
    let admin = register_user(&app, "admin@example.com").await;
    let client = register_user(&app, "client@example.com").await;

    let response = send(
        &app,
        request(Method::GET, "/api/admin/stats", Some(&admin.token), None),
    )
    .await;
    let stats = body_json(response).await;
    assert_eq!(stats["users"], serde_json::json!(2));

    // Deactivate the client; their token stops working
    let response = send(
        &app,
        request(
            Method::PUT,
            &format!("/api/admin/users/{}/active", client.user_id),
            Some(&admin.token),
            Some(serde_json::json!({ "is_active": false })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        request(Method::GET, "/api/auth/me", Some(&client.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}
