use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::auth::require_auth;
use super::handlers;
use crate::AppState;

pub fn create_router(state: AppState) -> Router {
    // Public routes — no authentication required
    let public = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/metrics", get(handlers::metrics::render));

    // Protected API routes — require Bearer token when API_TOKEN is set
    let protected = Router::new()
        // Verify-then-mirror callbacks
        .route("/api/bets/record", post(handlers::bets::record))
        .route("/api/claims/record", post(handlers::claims::record))
        // Mirror reads
        .route("/api/markets", get(handlers::markets::list))
        .route("/api/markets/:id", get(handlers::markets::detail))
        .route("/api/markets/:id/eligibility", get(handlers::claims::check_eligibility))
        // Admin write path
        .route("/api/admin/markets", post(handlers::markets::create))
        .route("/api/admin/markets/:id/resolve", post(handlers::markets::resolve))
        .route("/api/admin/actions/resume", post(handlers::markets::resume))
        // On-demand reconciliation
        .route("/api/sync", post(handlers::sync::run))
        .layer(middleware::from_fn(require_auth));

    // CORS: the platform frontend proxies same-origin; direct access needs a token
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    public
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
