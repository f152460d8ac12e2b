//! OpenAPI documentation.

use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};

use crate::handlers::dispatch_handler::DispatchEnvelope;
use crate::middleware::SESSION_HEADER;

/// API documentation struct.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::handlers::dispatch_handler::dispatch,
        crate::handlers::dispatch_handler::dispatch_resource,
        crate::handlers::health_handler::health_check,
    ),
    components(schemas(DispatchEnvelope)),
    modifiers(&SecurityAddon),
    tags(
        (name = "Dispatch", description = "Organization hierarchy actions (`resource.verb`)"),
        (name = "Health", description = "Backend status"),
    )
)]
pub struct ApiDoc;

/// Security scheme modifier.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
            components.add_security_scheme(
                "session_token",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(SESSION_HEADER))),
            );
        }
    }
}
