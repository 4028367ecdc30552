//! Request body reading and decoding.

use actix_web::web;
use futures_util::StreamExt;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{AppError, AppResult};

/// Largest accepted JSON body.
pub const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Collect the request body, rejecting it once it grows past `limit`.
pub async fn read_body(mut payload: web::Payload, limit: usize) -> AppResult<web::BytesMut> {
    let mut body = web::BytesMut::new();
    while let Some(chunk) = payload.next().await {
        let chunk = chunk.map_err(|e| {
            debug!("Failed to read request body: {}", e);
            AppError::InvalidRequest {
                detail: "Invalid request body.".to_string(),
                attribute: None,
            }
        })?;
        if body.len() + chunk.len() > limit {
            return Err(AppError::InvalidRequest {
                detail: "Request body is too large.".to_string(),
                attribute: None,
            });
        }
        body.extend_from_slice(&chunk);
    }
    Ok(body)
}

/// Decode a JSON body, mapping failures to `invalid_request`.
///
/// Required fields are checked by the decoded type, not here.
pub fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> AppResult<T> {
    serde_json::from_slice(body).map_err(|err| AppError::InvalidRequest {
        detail: format!("Invalid request body: {}", err),
        attribute: None,
    })
}
