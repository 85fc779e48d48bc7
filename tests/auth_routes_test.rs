// ABOUTME: Integration tests for registration, login, refresh and auth middleware
// ABOUTME: Covers the 401/403 split and refresh-token rotation
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, register_user, request, send, test_app};

#[tokio::test]
async fn test_register_login_me_flow() {
    let (app, _resources) = test_app().await;

    let session = register_user(&app, "athlete@example.com").await;

    // Login with the same credentials
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(serde_json::json!({
                "email": "athlete@example.com",
                "password": "correct-horse-battery",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let login_token = body["token"].as_str().unwrap().to_owned();

    // The token works against /me and reports the same user
    let response = send(
        &app,
        request(Method::GET, "/api/auth/me", Some(&login_token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let me = body_json(response).await;
    assert_eq!(me["id"], serde_json::json!(session.user_id));
    assert_eq!(me["email"], serde_json::json!("athlete@example.com"));
}

#[tokio::test]
async fn test_first_user_is_admin_rest_are_clients() {
    let (app, _resources) = test_app().await;

    register_user(&app, "admin@example.com").await;
    let second = register_user(&app, "client@example.com").await;

    let response = send(
        &app,
        request(Method::GET, "/api/auth/me", Some(&second.token), None),
    )
    .await;
    let me = body_json(response).await;
    assert_eq!(me["role"], serde_json::json!("client"));
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let (app, _resources) = test_app().await;
    register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "email": "athlete@example.com",
                "password": "another-password-1",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let (app, _resources) = test_app().await;
    register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/auth/login",
            None,
            Some(serde_json::json!({
                "email": "athlete@example.com",
                "password": "wrong-password-123",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_header_is_401_bad_token_is_403() {
    let (app, _resources) = test_app().await;

    // No Authorization header at all
    let response = send(&app, request(Method::GET, "/api/auth/me", None, None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Malformed bearer token
    let response = send(
        &app,
        request(Method::GET, "/api/auth/me", Some("not-a-jwt"), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // A token signed with a different secret
    let forged = {
        let other = forma_server::auth::AuthManager::new(b"other-secret-other-secret-other!!", 24);
        let user = forma_server::models::User::new(
            "forger@example.com".to_owned(),
            "hash".to_owned(),
            None,
        );
        other.generate_token(&user).unwrap()
    };
    let response = send(&app, request(Method::GET, "/api/auth/me", Some(&forged), None)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_refresh_rotates_and_rejects_reuse() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    // First refresh succeeds and returns a new pair
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(serde_json::json!({ "refresh_token": session.refresh_token })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let new_refresh = body["refresh_token"].as_str().unwrap().to_owned();
    assert_ne!(new_refresh, session.refresh_token);

    // The consumed token no longer works
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(serde_json::json!({ "refresh_token": session.refresh_token })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The rotated token does
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/auth/refresh",
            None,
            Some(serde_json::json!({ "refresh_token": new_refresh })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_short_password_rejected() {
    let (app, _resources) = test_app().await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/auth/register",
            None,
            Some(serde_json::json!({
                "email": "athlete@example.com",
                "password": "short",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
