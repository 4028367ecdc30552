//! API endpoint modules.

pub mod health;
pub mod notifications;
pub mod openapi;
pub mod transactions;
mod validation;

pub use health::configure_health_routes;
pub use notifications::configure_routes as configure_notification_routes;
pub use openapi::ApiDoc;
pub use transactions::configure_routes as configure_transaction_routes;

use actix_web::web;

/// Mount every route under its API version.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/api/v2")
            .configure(configure_notification_routes)
            .configure(configure_transaction_routes),
    )
    .service(web::scope("/api/v1").configure(configure_health_routes));
}
