//! Dispatch endpoints.

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::HeaderMap,
    routing::post,
    Router,
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use common::{ApiResponse, AppError};

use crate::extractors::ValidatedJson;
use crate::middleware::token_from_headers;
use crate::state::AppState;

/// Body of `POST /api`.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DispatchEnvelope {
    /// `resource.verb` or `resource/verb`
    #[validate(length(min = 1, message = "Action is required"))]
    #[schema(example = "directorates.list")]
    pub action: String,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub data: Value,
    /// Falls back to the `Authorization` / `X-Session-Token` headers
    #[serde(default, rename = "sessionToken", alias = "session_token")]
    pub session_token: Option<String>,
}

/// Create dispatch routes.
pub fn dispatch_routes() -> Router<AppState> {
    Router::new()
        .route("/", post(dispatch))
        .route("/:resource/:action", post(dispatch_resource))
}

/// Run an action named in the body.
#[utoipa::path(
    post,
    path = "/api",
    tag = "Dispatch",
    request_body = DispatchEnvelope,
    responses(
        (status = 200, description = "Result envelope `{success, data?, message?, errors?, code?, detail?}`")
    )
)]
pub async fn dispatch(
    State(state): State<AppState>,
    headers: HeaderMap,
    ValidatedJson(envelope): ValidatedJson<DispatchEnvelope>,
) -> ApiResponse<Value> {
    let token = envelope
        .session_token
        .or_else(|| token_from_headers(&headers));

    state
        .dispatcher
        .dispatch_action(token.as_deref(), &envelope.action, envelope.data)
        .await
}

/// Run `resource.action`; the body is the action's data.
#[utoipa::path(
    post,
    path = "/api/{resource}/{action}",
    tag = "Dispatch",
    params(
        ("resource" = String, Path, description = "e.g. `work-units`"),
        ("action" = String, Path, description = "e.g. `delete-cascade`")
    ),
    responses(
        (status = 200, description = "Result envelope `{success, data?, message?, errors?, code?, detail?}`")
    ),
    security(("session_token" = []))
)]
pub async fn dispatch_resource(
    State(state): State<AppState>,
    Path((resource, action)): Path<(String, String)>,
    headers: HeaderMap,
    body: Bytes,
) -> ApiResponse<Value> {
    let data = if body.is_empty() {
        Value::Null
    } else {
        match serde_json::from_slice(&body) {
            Ok(data) => data,
            Err(e) => return ApiResponse::failure(&AppError::bad_request(e.to_string())),
        }
    };

    let token = token_from_headers(&headers);
    state
        .dispatcher
        .dispatch(token.as_deref(), &resource, &action, data)
        .await
}
