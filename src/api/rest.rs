// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// Read-only status surface for the signal service:
//   GET /                    liveness + service summary (same as health)
//   GET /api/v1/health       strategy, symbols, interval, cooldown, uptime
//   GET /api/v1/decisions    recent per-symbol decision envelopes
//   GET /api/v1/errors       recent per-symbol errors
//   GET /api/v1/cooldowns    active cooldown entries
//
// CORS is permissive; every request is traced.
// =============================================================================

use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, routing::get, Json, Router};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::app_state::AppState;
use crate::cooldown::CooldownEntry;

// =============================================================================
// Router construction
// =============================================================================

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(health))
        .route("/api/v1/health", get(health))
        .route("/api/v1/decisions", get(decisions))
        .route("/api/v1/errors", get(errors))
        .route("/api/v1/cooldowns", get(cooldowns))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors))
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.health())
}

async fn decisions(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let decisions = state.recent_decisions.read().clone();
    Json(decisions)
}

async fn errors(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let errors = state.recent_errors.read().clone();
    Json(errors)
}

#[derive(Serialize)]
struct CooldownsResponse {
    window_min: i64,
    entries: Vec<CooldownEntry>,
}

async fn cooldowns(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(CooldownsResponse {
        window_min: state.engine.window().num_minutes(),
        entries: state.cooldowns(),
    })
}
