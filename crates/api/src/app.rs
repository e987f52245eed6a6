use axum::{
    middleware,
    routing::{get, patch, post, put},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{classes, entries, health, visibility};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);

    let state = AppState {
        pool,
        config: config.clone(),
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // Versioned API routes
    let api_routes = Router::new()
        // Visibility configuration (show scope)
        .route(
            "/api/v1/shows/:show_key/visibility",
            get(visibility::get_show_visibility).put(visibility::set_show_visibility),
        )
        .route(
            "/api/v1/shows/:show_key/visibility/fields",
            patch(visibility::set_show_granular_visibility),
        )
        // Visibility configuration (trial scope)
        .route(
            "/api/v1/trials/:trial_id/visibility",
            put(visibility::set_trial_visibility).delete(visibility::remove_trial_visibility),
        )
        .route(
            "/api/v1/trials/:trial_id/visibility/fields",
            patch(visibility::set_trial_granular_visibility),
        )
        .route(
            "/api/v1/trials/:trial_id/classes/visibility",
            post(visibility::bulk_set_class_visibility),
        )
        // Visibility configuration (class scope)
        .route(
            "/api/v1/classes/:class_id/visibility",
            put(visibility::set_class_visibility).delete(visibility::remove_class_visibility),
        )
        .route(
            "/api/v1/classes/:class_id/visibility/fields",
            patch(visibility::set_class_granular_visibility),
        )
        // Visibility read side
        .route(
            "/api/v1/classes/:class_id/visibility-settings",
            get(visibility::get_class_visibility_settings),
        )
        .route(
            "/api/v1/classes/:class_id/visible-fields",
            get(visibility::get_visible_fields),
        )
        .route(
            "/api/v1/classes/:class_id/results",
            get(visibility::get_class_results),
        )
        // Manual release
        .route(
            "/api/v1/classes/:class_id/release",
            post(classes::release_results).delete(classes::clear_release),
        )
        // Self check-in
        .route(
            "/api/v1/classes/:class_id/self-checkin",
            get(classes::get_self_checkin).put(classes::set_class_self_checkin),
        )
        .route(
            "/api/v1/trials/:trial_id/self-checkin",
            put(classes::set_trial_self_checkin),
        )
        .route(
            "/api/v1/shows/:show_key/self-checkin",
            put(classes::set_show_self_checkin),
        )
        // Entries
        .route("/api/v1/classes/:class_id/entries", get(entries::list_entries))
        .route("/api/v1/entries/:entry_id/checkin", put(entries::update_checkin));

    // Public routes (probes and metrics)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    Router::new()
        .merge(public_routes)
        .merge(api_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(cors)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .with_state(state)
}
