// ABOUTME: Integration tests for daily logs, meal items and achievements
// ABOUTME: Covers lazy log creation and calorie aggregate maintenance
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Forma Fitness

mod common;

use axum::http::{Method, StatusCode};
use common::{body_json, register_user, request, seed_foods, send, test_app};

#[tokio::test]
async fn test_reading_an_unlogged_day_does_not_persist() {
    let (app, resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(Method::GET, "/api/logs/2025-06-01", Some(&session.token), None),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["calories_consumed"], serde_json::json!(0.0));
    assert_eq!(body["meals"], serde_json::json!([]));

    // Nothing was written
    let user_id = uuid::Uuid::parse_str(&session.user_id).unwrap();
    let count = resources
        .database
        .count_daily_logs_for_user(user_id)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_weight_upsert_creates_log_lazily() {
    let (app, resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::PUT,
            "/api/logs/2025-06-01",
            Some(&session.token),
            Some(serde_json::json!({ "weight_kg": 81.4, "notes": "morning" })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["weight_kg"], serde_json::json!(81.4));

    let user_id = uuid::Uuid::parse_str(&session.user_id).unwrap();
    let count = resources
        .database
        .count_daily_logs_for_user(user_id)
        .await
        .unwrap();
    assert_eq!(count, 1);

    // The profile weight follows the latest reading
    let user = resources.database.get_user(user_id).await.unwrap().unwrap();
    assert_eq!(user.weight_kg, Some(81.4));
}

#[tokio::test]
async fn test_meal_items_move_the_calorie_aggregate() {
    let (app, resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;
    seed_foods(&resources).await;

    let response = send(
        &app,
        request(Method::GET, "/api/foods?search=Oats", Some(&session.token), None),
    )
    .await;
    let foods = body_json(response).await;
    let food_id = foods[0]["id"].as_str().unwrap().to_owned();

    // 200 g of oats at 380 kcal/100g = 760 kcal
    let response = send(
        &app,
        request(
            Method::POST,
            "/api/logs/2025-06-01/meals",
            Some(&session.token),
            Some(serde_json::json!({
                "food_id": food_id,
                "meal": "breakfast",
                "quantity_g": 200.0,
            })),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let item = body_json(response).await;
    let item_id = item["id"].as_str().unwrap().to_owned();

    let response = send(
        &app,
        request(Method::GET, "/api/logs/2025-06-01", Some(&session.token), None),
    )
    .await;
    let day = body_json(response).await;
    assert!((day["calories_consumed"].as_f64().unwrap() - 760.0).abs() < 1e-6);
    assert_eq!(day["meals"].as_array().unwrap().len(), 1);

    // Removing the item rolls the aggregate back
    let response = send(
        &app,
        request(
            Method::DELETE,
            &format!("/api/logs/2025-06-01/meals/{item_id}"),
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = send(
        &app,
        request(Method::GET, "/api/logs/2025-06-01", Some(&session.token), None),
    )
    .await;
    let day = body_json(response).await;
    assert!(day["calories_consumed"].as_f64().unwrap().abs() < 1e-6);
}

#[tokio::test]
async fn test_first_log_awards_achievement_and_notification() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    send(
        &app,
        request(
            Method::PUT,
            "/api/logs/2025-06-01",
            Some(&session.token),
            Some(serde_json::json!({ "weight_kg": 81.0 })),
        ),
    )
    .await;

    let response = send(
        &app,
        request(Method::GET, "/api/achievements", Some(&session.token), None),
    )
    .await;
    let achievements = body_json(response).await;
    assert!(achievements
        .as_array()
        .unwrap()
        .iter()
        .any(|a| a["code"] == serde_json::json!("first_log")));

    let response = send(
        &app,
        request(Method::GET, "/api/notifications", Some(&session.token), None),
    )
    .await;
    let notifications = body_json(response).await;
    assert!(notifications
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["kind"] == serde_json::json!("achievement")));
}

#[tokio::test]
async fn test_log_range_listing() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    for date in ["2025-06-01", "2025-06-02", "2025-06-04"] {
        send(
            &app,
            request(
                Method::PUT,
                &format!("/api/logs/{date}"),
                Some(&session.token),
                Some(serde_json::json!({ "weight_kg": 80.0 })),
            ),
        )
        .await;
    }

    let response = send(
        &app,
        request(
            Method::GET,
            "/api/logs?from=2025-06-01&to=2025-06-03",
            Some(&session.token),
            None,
        ),
    )
    .await;
    let logs = body_json(response).await;
    assert_eq!(logs.as_array().unwrap().len(), 2);

    // Inverted range is a validation error
    let response = send(
        &app,
        request(
            Method::GET,
            "/api/logs?from=2025-06-03&to=2025-06-01",
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_meal_plan_generation_persists() {
    let (app, resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;
    seed_foods(&resources).await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/meal-plans/generate",
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let stored = body_json(response).await;
    assert_eq!(stored["daily_calorie_target"], serde_json::json!(2000.0));
    assert_eq!(stored["plan"]["days"].as_array().unwrap().len(), 7);
    let plan_id = stored["id"].as_str().unwrap().to_owned();

    // The plan can be listed and fetched back
    let response = send(
        &app,
        request(Method::GET, "/api/meal-plans", Some(&session.token), None),
    )
    .await;
    let plans = body_json(response).await;
    assert_eq!(plans.as_array().unwrap().len(), 1);

    let response = send(
        &app,
        request(
            Method::GET,
            &format!("/api/meal-plans/{plan_id}"),
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_meal_plan_generation_without_foods_is_bad_request() {
    let (app, _resources) = test_app().await;
    let session = register_user(&app, "athlete@example.com").await;

    let response = send(
        &app,
        request(
            Method::POST,
            "/api/meal-plans/generate",
            Some(&session.token),
            None,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
