//! OpenAPI documentation configuration.

use utoipa::OpenApi;

use crate::{api, error, models};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    info(
        title = "MiniKit Gateway",
        version = "0.1.0",
        description = "API-key authenticated proxy for mini app notifications and transaction lookups"
    ),
    servers(
        (url = "/", description = "Local server")
    ),
    paths(
        // Health endpoints
        api::health::health,
        api::health::ready,
        // MiniKit endpoints
        api::notifications::send_notification,
        api::transactions::get_transaction,
    ),
    components(
        schemas(
            // Common
            error::ErrorEnvelope,
            // Health
            api::health::HealthResponse,
            api::health::ReadyResponse,
            // MiniKit
            models::SendNotificationRequest,
            models::SendNotificationResponse,
        )
    ),
    tags(
        (name = "Health", description = "Health check endpoints"),
        (name = "MiniKit", description = "Notification dispatch and transaction lookup")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Add API key security scheme.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "api_key",
                utoipa::openapi::security::SecurityScheme::Http(
                    utoipa::openapi::security::HttpBuilder::new()
                        .scheme(utoipa::openapi::security::HttpAuthScheme::Bearer)
                        .bearer_format("api_<base64(id:secret)>")
                        .build(),
                ),
            );
        }
    }
}
