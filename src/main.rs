//! MiniKit gateway - Main entry point.
//!
//! Starts the Actix-web server with configured routes and middleware.

use std::sync::Arc;

use actix_web::{App, HttpServer, web};
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use minikit_gateway_lib::api::{self, ApiDoc};
use minikit_gateway_lib::config::Config;
use minikit_gateway_lib::middleware::RequestLogger;
use minikit_gateway_lib::services::{
    CredentialVerifier, GraphqlAppMetadataStore, GraphqlClient, GraphqlKeyStore, PermissionGate,
    SigV4HttpClient, UpstreamProxy,
};

/// Perform health check (for Docker healthcheck).
fn health_check() -> bool {
    Config::from_env().is_ok()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Check for --health-check flag (used by Docker HEALTHCHECK)
    if std::env::args().any(|arg| arg == "--health-check") {
        dotenvy::dotenv().ok();
        std::process::exit(if health_check() { 0 } else { 1 });
    }

    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            error!("");
            error!("Please check your environment variables:");
            error!("  - APP_ENV must be set to 'dev', 'staging' or 'production'");
            error!("  - Outside dev, HASURA_*, GENERAL_SECRET_KEY and backend endpoints must be set");
            error!("  - Outside dev, secrets must not match development defaults");
            std::process::exit(1);
        }
    };

    info!("========================================");
    info!("  MiniKit Gateway");
    match config.stage {
        Some(stage) => info!("  Stage: {}", stage),
        None => info!("  Stage: <unset>"),
    }
    info!("========================================");

    match config.stage {
        None => warn!("APP_ENV is not a recognised stage - every MiniKit request will be rejected"),
        Some(stage) if stage.is_dev() => {
            warn!("Running in DEVELOPMENT mode - do not use in production!");
        }
        Some(_) => {}
    }

    if let Some(stage) = config.stage {
        info!(
            "Notification allow-list: {} team(s) for {}",
            config.permissions.len(stage),
            stage
        );
    }

    // Key store and app metadata share one GraphQL client
    let graphql = GraphqlClient::new(&config.graphql);
    let verifier = CredentialVerifier::new(
        config.stage,
        config.general_secret_key.clone(),
        Arc::new(GraphqlKeyStore::new(graphql.clone())),
    );
    let gate = PermissionGate::new(
        config.stage,
        config.permissions.clone(),
        Arc::new(GraphqlAppMetadataStore::new(graphql)),
    );

    let signer = match SigV4HttpClient::from_env(config.backend.region.clone()).await {
        Ok(client) => client,
        Err(e) => {
            error!("Failed to initialize request signing: {}", e);
            std::process::exit(1);
        }
    };
    let proxy = UpstreamProxy::new(Arc::new(signer), &config.backend);
    info!(region = %config.backend.region, "Backend request signing ready");

    let bind_address = config.bind_address();
    let worker_count = if config.is_development() {
        info!(
            "Starting server at http://{} (4 workers - development mode)",
            bind_address
        );
        4
    } else {
        let cpus = num_cpus::get();
        info!("Starting server at http://{} ({} workers)", bind_address, cpus);
        cpus
    };

    let verifier = web::Data::new(verifier);
    let gate = web::Data::new(gate);
    let proxy = web::Data::new(proxy);
    let openapi = ApiDoc::openapi();

    HttpServer::new(move || {
        App::new()
            .wrap(RequestLogger)
            .app_data(verifier.clone())
            .app_data(gate.clone())
            .app_data(proxy.clone())
            .configure(api::configure)
            .service(SwaggerUi::new("/api/docs/{_:.*}").url("/api/openapi.json", openapi.clone()))
    })
    .workers(worker_count)
    .bind(&bind_address)?
    .run()
    .await
}
