// ABOUTME: Integration tests for onboarding energy numbers and recommendations
// ABOUTME: Drives logs through the API and checks the emitted advisories
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

mod common;

use axum::http::{Method, StatusCode};
use chrono::{Duration, Utc};
use common::{body_json, register_user, request, send, test_app};

#[tokio::test]
async fn test_onboarding_creates_goal_and_energy_profile() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/onboarding",
            Some(&session.token),
            Some(serde_json::json!({
                "weight_kg": 80.0,
                "height_cm": 180.0,
                "birth_year": 1995,
                "sex": "male",
                "activity_level": "moderate",
                "goal_type": "weight_loss",
                "target_weight_kg": 75.0,
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let body = body_json(response).await;

    // Mifflin-St Jeor at these stats is ~1780 kcal BMR, TDEE above that
    let bmr = body["energy"]["bmr_kcal"].as_f64().unwrap();
    assert!((1700.0..1900.0).contains(&bmr));
    let goal_kcal = body["energy"]["daily_calorie_goal"].as_u64().unwrap();
    assert!(goal_kcal > 1200);

    // The active goal exists and carries the computed budget
    let response = send(
        &app,
        request(Method::GET, "/api/goals/active", Some(&session.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let goal = body_json(response).await;
    assert_eq!(goal["goal_type"], serde_json::json!("weight_loss"));
    assert_eq!(goal["daily_calorie_goal"], serde_json::json!(goal_kcal));

    // Onboarding flag flips on the profile
    let response = send(
        &app,
        request(Method::GET, "/api/auth/me", Some(&session.token), None),
    )
    .await;
    let me = body_json(response).await;
    assert_eq!(me["onboarding_completed"], serde_json::json!(true));
}

#[tokio::test]
async fn test_onboarding_rejects_implausible_stats() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/onboarding",
            Some(&session.token),
            Some(serde_json::json!({
                "weight_kg": 5.0,
                "height_cm": 180.0,
                "birth_year": 1995,
                "sex": "male",
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rapid_loss_triggers_safety_recommendation() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    // Losing 2 kg in a week on an 80 kg frame is beyond the 1% guideline
    let today = Utc::now().date_naive();
    let week_ago = today - Duration::days(7);
    for (date, weight) in [(week_ago, 80.0), (today, 78.0)] {
        let response = send(
            &app,
            request(
                Method::PUT,
                &format!("/api/logs/{date}"),
                Some(&session.token),
                Some(serde_json::json!({ "weight_kg": weight })),
            ),
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = send(
        &app,
        request(
            Method::GET,
            "/api/recommendations",
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let recommendations = body_json(response).await;

    let safety: Vec<_> = recommendations
        .as_array()
        .unwrap()
        .iter()
        .filter(|r| r["category"] == serde_json::json!("safety"))
        .collect();
    assert_eq!(safety.len(), 1);
    assert_eq!(safety[0]["priority"], serde_json::json!("high"));
    assert_eq!(safety[0]["kind"], serde_json::json!("rapid_weight_loss"));

    // Sorted with the safety item first
    assert_eq!(
        recommendations[0]["category"],
        serde_json::json!("safety")
    );
}

#[tokio::test]
async fn test_steady_weight_emits_no_safety_entry() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let today = Utc::now().date_naive();
    let week_ago = today - Duration::days(7);
    for (date, weight) in [(week_ago, 80.0), (today, 79.7)] {
        send(
            &app,
            request(
                Method::PUT,
                &format!("/api/logs/{date}"),
                Some(&session.token),
                Some(serde_json::json!({ "weight_kg": weight })),
            ),
        )
        .await;
    }

    let response = send(
        &app,
        request(
            Method::GET,
            "/api/recommendations",
            Some(&session.token),
            None,
        ),
    )
    .await;
    let recommendations = body_json(response).await;
    assert!(recommendations
        .as_array()
        .unwrap()
        .iter()
        .all(|r| r["category"] != serde_json::json!("safety")));
}

#[tokio::test]
async fn test_recommendations_for_new_user_are_empty() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::GET,
            "/api/recommendations",
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let recommendations = body_json(response).await;
    assert_eq!(recommendations, serde_json::json!([]));
}
