//! Transaction lookup handler.
//!
//! Called from browsers inside mini apps, so the route carries permissive
//! CORS headers and takes no credential.

use actix_cors::Cors;
use actix_web::http::{Method, header};
use actix_web::{HttpResponse, web};
use tracing::debug;

use crate::auth::CallerHeaders;
use crate::error::{AppError, AppResult};
use crate::models::{TransactionQuery, TransactionType};
use crate::services::UpstreamProxy;

const ALLOWED_METHODS: &str = "GET";
const ALLOWED_HEADERS: &str = "Content-Type, Authorization";

/// Resolve the `type` query parameter. Absent means `payment`.
fn transaction_type(kind: Option<&str>) -> AppResult<TransactionType> {
    match kind {
        None => Ok(TransactionType::default()),
        Some(value) => TransactionType::parse(value)
            .ok_or_else(|| AppError::invalid_request("Invalid transaction type.", "type")),
    }
}

/// Look up a payment or on-chain action by id.
///
/// Returns the first record the payments backend reports for the
/// transaction.
#[utoipa::path(
    get,
    path = "/api/v2/minikit/transaction/{transaction_id}",
    tag = "MiniKit",
    params(
        ("transaction_id" = String, Path, description = "Transaction or payment reference"),
        TransactionQuery
    ),
    responses(
        (status = 200, description = "Transaction record", body = serde_json::Value),
        (status = 400, description = "Missing app_id or invalid type", body = crate::error::ErrorEnvelope),
        (status = 404, description = "Transaction not found", body = crate::error::ErrorEnvelope),
        (status = 500, description = "Backend failure", body = crate::error::ErrorEnvelope),
    )
)]
pub async fn get_transaction(
    caller: CallerHeaders,
    proxy: web::Data<UpstreamProxy>,
    path: web::Path<String>,
    query: web::Query<TransactionQuery>,
) -> AppResult<HttpResponse> {
    let transaction_id = path.into_inner();
    let query = query.into_inner();

    let kind = transaction_type(query.kind.as_deref())?;
    let app_id = query
        .app_id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| AppError::invalid_request("App ID is required.", "app_id"))?;

    let transaction = proxy
        .fetch_transaction(&app_id, &transaction_id, kind, caller.user_agent.as_deref())
        .await?;

    debug!(app_id = %app_id, transaction_id = %transaction_id, "Transaction found");

    Ok(HttpResponse::Ok()
        .insert_header((header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"))
        .insert_header((header::ACCESS_CONTROL_ALLOW_METHODS, ALLOWED_METHODS))
        .insert_header((header::ACCESS_CONTROL_ALLOW_HEADERS, ALLOWED_HEADERS))
        .json(transaction))
}

/// Preflight handling for the lookup route.
fn cors() -> Cors {
    Cors::default()
        .allow_any_origin()
        .send_wildcard()
        .allowed_methods([Method::GET])
        .allowed_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600)
}

/// Configure transaction routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::resource("/minikit/transaction/{transaction_id}")
            .wrap(cors())
            .route(web::get().to(get_transaction)),
    );
}
