//! Health check handlers.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::Serialize;

use crate::state::AppState;

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub services: ServiceStatus,
}

/// Individual service status.
#[derive(Debug, Serialize)]
pub struct ServiceStatus {
    pub store: ServiceHealth,
    pub redis: ServiceHealth,
}

/// Service health with optional error message.
#[derive(Debug, Serialize)]
pub struct ServiceHealth {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ServiceHealth {
    fn from_check<E: std::fmt::Display>(result: Result<(), E>) -> Self {
        match result {
            Ok(()) => Self::with_status("healthy"),
            Err(e) => Self {
                status: "unhealthy".to_string(),
                error: Some(e.to_string()),
            },
        }
    }

    fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            error: None,
        }
    }

    fn is_unhealthy(&self) -> bool {
        self.status == "unhealthy"
    }
}

/// Create health routes.
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health_check))
}

/// Health check endpoint - verifies the record store and Redis.
///
/// Backends running in process report `in-memory`.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "All backends reachable"),
        (status = 503, description = "A backend is unreachable")
    )
)]
pub async fn health_check(State(state): State<AppState>) -> Response {
    let store = match &state.database {
        Some(db) => ServiceHealth::from_check(db.ping().await),
        None => ServiceHealth::with_status("in-memory"),
    };
    let redis = match &state.cache {
        Some(cache) => ServiceHealth::from_check(
            cache
                .ping()
                .await
                .map_err(|e| e.detail().unwrap_or_else(|| e.to_string())),
        ),
        None => ServiceHealth::with_status("in-memory"),
    };

    let degraded = store.is_unhealthy() || redis.is_unhealthy();
    let response = HealthResponse {
        status: if degraded { "degraded" } else { "healthy" }.to_string(),
        services: ServiceStatus { store, redis },
    };

    if degraded {
        (StatusCode::SERVICE_UNAVAILABLE, Json(response)).into_response()
    } else {
        (StatusCode::OK, Json(response)).into_response()
    }
}
