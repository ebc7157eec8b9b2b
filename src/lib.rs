pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod lifecycle;
pub mod middleware;
pub mod models;
pub mod services;
pub mod state;

use axum::{
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::{AppConfig, Environment, SecurityConfig};
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;
use crate::state::AppState;

/// Full HTTP surface: public routes plus every protected group behind the JWT layer.
/// Request tracing is installed only when `api.enable_request_logging` is set.
pub fn app(state: AppState, config: &AppConfig) -> Router {
    let protected = Router::new()
        .merge(auth_routes())
        .merge(season_routes())
        .merge(match_routes())
        .merge(registration_routes())
        .merge(report_routes())
        .route_layer(from_fn_with_state(state.clone(), jwt_auth_middleware));

    let router = Router::new()
        // Public
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .merge(protected)
        // Global middleware
        .layer(
            ServiceBuilder::new()
                .layer(cors_layer(&config.security, &config.environment))
                .layer(DefaultBodyLimit::max(config.api.max_request_size_bytes)),
        );

    let router = if config.api.enable_request_logging {
        router.layer(TraceLayer::new_for_http())
    } else {
        router
    };

    router.with_state(state)
}

fn auth_routes() -> Router<AppState> {
    Router::new().route("/auth/whoami", get(protected::auth::whoami))
}

fn season_routes() -> Router<AppState> {
    use protected::seasons;

    Router::new()
        .route("/seasons", post(seasons::season_post))
        .route("/seasons/:season_id", get(seasons::season_get))
}

fn match_routes() -> Router<AppState> {
    use protected::{matches, reports};

    Router::new()
        .route(
            "/seasons/:season_id/matches",
            get(matches::matches_list).post(matches::match_post),
        )
        .route("/matches/:match_id/details", get(matches::match_details))
        .route("/matches/:match_id/change-status", post(matches::match_change_status))
        .route("/matches/:match_id/assign-officials", post(matches::match_assign_officials))
        .route("/matches/:match_id/lineup-status", post(matches::match_lineup_status))
        .route("/matches/:match_id/score", post(matches::match_score))
        .route(
            "/matches/:match_id/supervisor-reports",
            get(reports::match_reports_list).post(reports::report_post),
        )
}

fn registration_routes() -> Router<AppState> {
    use protected::registrations as reg;

    Router::new()
        .route(
            "/seasons/:season_id/registrations",
            get(reg::registrations_list).post(reg::registration_invite),
        )
        .route(
            "/seasons/:season_id/registrations/send-invitations",
            post(reg::registrations_send_invitations),
        )
        .route(
            "/seasons/:season_id/registrations/statistics",
            get(reg::registrations_statistics),
        )
        .route("/registrations/:id", get(reg::registration_get))
        .route("/registrations/:id/change-status", post(reg::registration_change_status))
        .route("/registrations/:id/accept", post(reg::registration_accept))
        .route("/registrations/:id/decline", post(reg::registration_decline))
        .route("/registrations/:id/submit", post(reg::registration_submit))
        .route("/registrations/:id/approve", post(reg::registration_approve))
        .route("/registrations/:id/reject", post(reg::registration_reject))
        .route("/registrations/:id/request-change", post(reg::registration_request_change))
}

fn report_routes() -> Router<AppState> {
    use axum::routing::put;
    use protected::reports;

    Router::new()
        .route("/supervisor-reports", get(reports::reports_list))
        .route("/supervisor-reports/:report_id", put(reports::report_put))
        .route("/supervisor-reports/:report_id/review", post(reports::report_review))
}

/// Development allows any origin; other environments only the configured list
fn cors_layer(security: &SecurityConfig, environment: &Environment) -> CorsLayer {
    if !security.enable_cors {
        return CorsLayer::new();
    }
    if matches!(environment, Environment::Development) {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
