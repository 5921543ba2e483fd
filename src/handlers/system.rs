//! Unauthenticated operational endpoints shared by both services.

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Json, Response},
};
use serde_json::{json, Value};

use crate::state::{AuthState, SystemState};

/// GET|HEAD /health - pings the database
pub async fn health(State(system): State<SystemState>) -> Response {
    match system.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "service": system.service,
                "database": "connected",
                "timestamp": chrono::Utc::now(),
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Health check failed: database unreachable");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "error",
                    "service": system.service,
                    "database": "unreachable",
                })),
            )
                .into_response()
        }
    }
}

fn not_ready(reason: &str) -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(json!({ "ready": false, "reason": reason })),
    )
        .into_response()
}

fn ready_ok() -> Response {
    (
        StatusCode::OK,
        Json(json!({ "ready": true, "database": "operational" })),
    )
        .into_response()
}

/// GET /ready (portfolio API)
pub async fn ready(State(system): State<SystemState>) -> Response {
    match system.store.ping().await {
        Ok(()) => ready_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed");
            not_ready("database connection error")
        }
    }
}

/// GET /ready (auth service) - runs a real query against the user table
pub async fn ready_with_users(State(state): State<AuthState>) -> Response {
    match state.repos.users.count().await {
        Ok(_) => ready_ok(),
        Err(e) => {
            tracing::error!(error = %e, "Readiness check failed: database query error");
            not_ready("database query failed")
        }
    }
}

/// GET /metrics - Prometheus text exposition
pub async fn metrics(State(system): State<SystemState>) -> Response {
    let body = system.metrics.export_prometheus().await;
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

/// GET / - service description
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "Portfolio Manager API",
            "version": env!("CARGO_PKG_VERSION"),
            "endpoints": {
                "portfolios": "/api/portfolios (public reads, /own requires JWT)",
                "categories": "/api/categories (public reads, /own requires JWT)",
                "projects": "/api/projects (public reads and search, /own requires JWT)",
                "sections": "/api/sections (public reads, /own requires JWT)",
                "section_contents": "/api/section-contents (public reads, /own requires JWT)",
                "health": "/health",
                "ready": "/ready",
                "metrics": "/metrics",
            }
        }
    }))
}
