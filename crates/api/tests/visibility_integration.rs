//! Integration tests for the visibility endpoints.
//!
//! These tests require a running PostgreSQL instance and skip themselves
//! when `TEST_DATABASE_URL` is unset.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    create_test_app, empty_request, get_request, json_request, parse_response_body, seed_class,
    seed_entry, seed_extra_class, try_create_pool,
};
use serde_json::json;
use tower::ServiceExt;

macro_rules! require_pool {
    () => {
        match try_create_pool().await {
            Some(pool) => pool,
            None => {
                eprintln!("TEST_DATABASE_URL not set; skipping");
                return;
            }
        }
    };
}

// ============================================================================
// Resolution and precedence
// ============================================================================

#[tokio::test]
async fn test_unconfigured_class_resolves_standard_at_show() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    let app = create_test_app(pool.clone());

    let response = app
        .oneshot(get_request(&format!(
            "/api/v1/classes/{}/visibility-settings",
            fixture.class_id
        )))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["preset"], "standard");
    assert_eq!(body["inherited_from"], "show");
    assert_eq!(body["placement"], "class_complete");
    assert_eq!(body["qualification"], "immediate");
}

#[tokio::test]
async fn test_class_override_wins_and_removal_restores_inheritance() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    let app = create_test_app(pool.clone());

    // Configure all three levels.
    let actor = json!({"preset": "review", "updated_by": "admin@example.com"});
    for uri in [
        format!("/api/v1/shows/{}/visibility", fixture.show_key),
        format!("/api/v1/trials/{}/visibility", fixture.trial_id),
    ] {
        let response = app
            .clone()
            .oneshot(json_request(Method::PUT, &uri, actor.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/classes/{}/visibility", fixture.class_id),
            json!({"preset": "open", "updated_by": "admin@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Class override wins in full over trial and show.
    let settings_uri = format!("/api/v1/classes/{}/visibility-settings", fixture.class_id);
    let body = parse_response_body(
        app.clone().oneshot(get_request(&settings_uri)).await.unwrap(),
    )
    .await;
    assert_eq!(body["preset"], "open");
    assert_eq!(body["inherited_from"], "class");

    // Removing the class override falls through to the trial.
    let response = app
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/api/v1/classes/{}/visibility", fixture.class_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = parse_response_body(
        app.clone().oneshot(get_request(&settings_uri)).await.unwrap(),
    )
    .await;
    assert_eq!(body["preset"], "review");
    assert_eq!(body["inherited_from"], "trial");

    // Removing the trial override falls through to the show.
    let response = app
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/api/v1/trials/{}/visibility", fixture.trial_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let body = parse_response_body(app.clone().oneshot(get_request(&settings_uri)).await.unwrap())
        .await;
    assert_eq!(body["preset"], "review");
    assert_eq!(body["inherited_from"], "show");
}

#[tokio::test]
async fn test_set_class_visibility_is_idempotent() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    let app = create_test_app(pool.clone());

    let uri = format!("/api/v1/classes/{}/visibility", fixture.class_id);
    let request_body = json!({"preset": "open", "updated_by": "secretary@example.com"});

    let first = parse_response_body(
        app.clone()
            .oneshot(json_request(Method::PUT, &uri, request_body.clone()))
            .await
            .unwrap(),
    )
    .await;
    let second = parse_response_body(
        app.clone()
            .oneshot(json_request(Method::PUT, &uri, request_body))
            .await
            .unwrap(),
    )
    .await;

    assert_eq!(first, second);
    assert_eq!(second["preset"], "open");
    assert_eq!(second["inherited_from"], "class");
}

#[tokio::test]
async fn test_bulk_set_applies_preset_to_every_class() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    let second_class = seed_extra_class(&pool, fixture.trial_id, "Interior").await;
    let third_class = seed_extra_class(&pool, fixture.trial_id, "Exterior").await;
    let app = create_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/trials/{}/classes/visibility", fixture.trial_id),
            json!({
                "class_ids": [fixture.class_id, second_class, third_class],
                "preset": "review",
                "updated_by": "secretary@example.com"
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = parse_response_body(response).await;
    assert_eq!(body["updated"], 3);

    for class_id in [fixture.class_id, second_class, third_class] {
        let body = parse_response_body(
            app.clone()
                .oneshot(get_request(&format!(
                    "/api/v1/classes/{}/visibility-settings",
                    class_id
                )))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(body["preset"], "review");
        assert_eq!(body["inherited_from"], "class");
    }
}

// ============================================================================
// Granular overrides
// ============================================================================

#[tokio::test]
async fn test_granular_override_merges_with_preset() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    let app = create_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/classes/{}/visibility", fixture.class_id),
            json!({"preset": "standard", "updated_by": "secretary@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/classes/{}/visibility/fields", fixture.class_id),
            json!({"time_timing": "immediate", "updated_by": "secretary@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(
        app.clone()
            .oneshot(get_request(&format!(
                "/api/v1/classes/{}/visibility-settings",
                fixture.class_id
            )))
            .await
            .unwrap(),
    )
    .await;
    // The explicit field override wins; everything else keeps the preset.
    assert_eq!(body["time"], "immediate");
    assert_eq!(body["placement"], "class_complete");
    assert_eq!(body["qualification"], "immediate");
    assert_eq!(body["faults"], "class_complete");
    assert_eq!(body["preset"], "standard");
}

#[tokio::test]
async fn test_granular_immediate_placement_is_rejected() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    let app = create_test_app(pool.clone());

    let response = app
        .oneshot(json_request(
            Method::PATCH,
            &format!("/api/v1/classes/{}/visibility/fields", fixture.class_id),
            json!({"placement_timing": "immediate", "updated_by": "secretary@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = parse_response_body(response).await;
    assert_eq!(body["error"], "validation_error");
}

// ============================================================================
// Field gating
// ============================================================================

#[tokio::test]
async fn test_review_preset_release_cycle() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    seed_entry(&pool, fixture.class_id, 101, true).await;
    seed_entry(&pool, fixture.class_id, 102, true).await;
    let app = create_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/classes/{}/visibility", fixture.class_id),
            json!({"preset": "review", "updated_by": "admin@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let fields_uri = |role: &str| {
        format!(
            "/api/v1/classes/{}/visible-fields?role={}",
            fixture.class_id, role
        )
    };

    // Exhibitors see nothing before the release, even with the class done.
    let body = parse_response_body(
        app.clone()
            .oneshot(get_request(&fields_uri("exhibitor")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["is_class_complete"], true);
    assert_eq!(body["fields"]["show_placement"], false);
    assert_eq!(body["fields"]["show_qualification"], false);
    assert_eq!(body["fields"]["show_time"], false);
    assert_eq!(body["fields"]["show_faults"], false);
    assert!(body["withheld"]
        .as_array()
        .unwrap()
        .iter()
        .all(|w| w["message"] == "Pending release"));

    // Officials bypass the gate entirely.
    let body = parse_response_body(
        app.clone()
            .oneshot(get_request(&fields_uri("judge")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["fields"]["show_placement"], true);
    assert_eq!(body["fields"]["show_time"], true);

    // Releasing makes everything visible to exhibitors.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::POST,
            &format!("/api/v1/classes/{}/release", fixture.class_id),
            json!({"released_by": "admin@example.com"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(
        app.clone()
            .oneshot(get_request(&fields_uri("exhibitor")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["fields"]["show_placement"], true);
    assert_eq!(body["fields"]["show_qualification"], true);

    // Clearing the release hides the fields again.
    let response = app
        .clone()
        .oneshot(empty_request(
            Method::DELETE,
            &format!("/api/v1/classes/{}/release", fixture.class_id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(
        app.clone()
            .oneshot(get_request(&fields_uri("exhibitor")))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["fields"]["show_placement"], false);
}

#[tokio::test]
async fn test_results_listing_follows_class_completion() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    seed_entry(&pool, fixture.class_id, 201, true).await;
    seed_entry(&pool, fixture.class_id, 202, true).await;
    let pending = seed_entry(&pool, fixture.class_id, 203, false).await;
    let app = create_test_app(pool.clone());

    let results_uri = format!(
        "/api/v1/classes/{}/results?role=exhibitor",
        fixture.class_id
    );

    // Standard preset by default: qualification immediately, comparative
    // data only once the class is done.
    let body = parse_response_body(app.clone().oneshot(get_request(&results_uri)).await.unwrap())
        .await;
    assert_eq!(body["is_class_complete"], false);
    let first = &body["entries"][0];
    assert_eq!(first["armband"], 201);
    assert_eq!(first["qualification"], "qualified");
    assert!(first["search_time_secs"].is_null());
    assert!(first["placement"].is_null());
    assert!(body["withheld"]
        .as_array()
        .unwrap()
        .iter()
        .all(|w| w["message"] == "Available when class completes"));

    // Scoring the last entry completes the class.
    common::score_entry(&pool, pending, 3).await;

    let body = parse_response_body(app.clone().oneshot(get_request(&results_uri)).await.unwrap())
        .await;
    assert_eq!(body["is_class_complete"], true);
    let first = &body["entries"][0];
    assert_eq!(first["placement"], 1);
    assert_eq!(first["search_time_secs"], 31.0);
    assert_eq!(body["withheld"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_pulled_entries_do_not_block_completion() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    seed_entry(&pool, fixture.class_id, 301, true).await;
    let pulled = seed_entry(&pool, fixture.class_id, 302, false).await;
    let app = create_test_app(pool.clone());

    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/entries/{}/checkin", pulled),
            json!({"status": "pulled"}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(
        app.clone()
            .oneshot(get_request(&format!(
                "/api/v1/classes/{}/visible-fields?role=exhibitor",
                fixture.class_id
            )))
            .await
            .unwrap(),
    )
    .await;
    assert_eq!(body["is_class_complete"], true);
}

// ============================================================================
// Self check-in
// ============================================================================

#[tokio::test]
async fn test_self_checkin_cascade() {
    let pool = require_pool!();
    let fixture = seed_class(&pool).await;
    let app = create_test_app(pool.clone());

    let uri = format!("/api/v1/classes/{}/self-checkin", fixture.class_id);

    // Nothing configured anywhere: enabled by default, no origin.
    let body = parse_response_body(app.clone().oneshot(get_request(&uri)).await.unwrap()).await;
    assert_eq!(body["enabled"], true);
    assert_eq!(body["inherited_from"], serde_json::Value::Null);

    // Disabling at the show propagates down.
    let response = app
        .clone()
        .oneshot(json_request(
            Method::PUT,
            &format!("/api/v1/shows/{}/self-checkin", fixture.show_key),
            json!({"enabled": false}),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(app.clone().oneshot(get_request(&uri)).await.unwrap()).await;
    assert_eq!(body["enabled"], false);
    assert_eq!(body["inherited_from"], "show");

    // A class-level value wins over the show.
    let response = app
        .clone()
        .oneshot(json_request(Method::PUT, &uri, json!({"enabled": true})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(app.clone().oneshot(get_request(&uri)).await.unwrap()).await;
    assert_eq!(body["enabled"], true);
    assert_eq!(body["inherited_from"], "class");
}

// ============================================================================
// Plumbing
// ============================================================================

#[tokio::test]
async fn test_unknown_class_returns_404() {
    let pool = require_pool!();
    let app = create_test_app(pool.clone());

    let response = app
        .oneshot(get_request(
            "/api/v1/classes/00000000-0000-0000-0000-000000000000/visibility-settings",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_database_status() {
    let pool = require_pool!();
    let app = create_test_app(pool.clone());

    let response = app.oneshot(get_request("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"]["connected"], true);
}
