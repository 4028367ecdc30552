//! Domain error types for the MiniKit gateway.
//!
//! Every failure, whichever step produced it, is answered with the same
//! [`ErrorEnvelope`] so callers can branch on `code` alone.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use utoipa::ToSchema;

/// Code used when the backend error carries no code of its own.
pub const INTERNAL_API_ERROR: &str = "internal_api_error";

/// Application-level errors.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Deployment stage is unset or unrecognised
    #[error("Invalid Environment Configuration")]
    InvalidEnvironment,

    /// Request failed validation
    #[error("{detail}")]
    InvalidRequest {
        detail: String,
        attribute: Option<String>,
    },

    /// Missing or malformed credential
    #[error("{0}")]
    Unauthorized(String),

    /// Resource not found
    #[error("{detail}")]
    NotFound {
        detail: String,
        attribute: &'static str,
    },

    #[error("API key is inactive.")]
    ApiKeyInactive,

    #[error("API key is not valid for this app.")]
    InvalidApp,

    #[error("API key is not valid.")]
    InvalidApiKey,

    /// Caller is authenticated but not permitted
    #[error("{detail}")]
    Forbidden {
        detail: String,
        attribute: &'static str,
    },

    /// Internal backend answered with a failure
    #[error("{detail}")]
    Upstream {
        status: u16,
        code: String,
        detail: String,
        attribute: &'static str,
    },

    /// Unexpected failure in a collaborator
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn invalid_request(detail: impl Into<String>, attribute: impl Into<String>) -> Self {
        AppError::InvalidRequest {
            detail: detail.into(),
            attribute: Some(attribute.into()),
        }
    }

    pub fn not_found(detail: impl Into<String>, attribute: &'static str) -> Self {
        AppError::NotFound {
            detail: detail.into(),
            attribute,
        }
    }

    /// Machine readable error code.
    pub fn code(&self) -> &str {
        match self {
            AppError::InvalidEnvironment | AppError::InvalidRequest { .. } => "invalid_request",
            AppError::Unauthorized(_) => "unauthorized",
            AppError::NotFound { .. } => "not_found",
            AppError::ApiKeyInactive => "api_key_inactive",
            AppError::InvalidApp => "invalid_app",
            AppError::InvalidApiKey => "invalid_api_key",
            AppError::Forbidden { .. } => "forbidden",
            AppError::Upstream { code, .. } => code.as_str(),
            AppError::Internal(_) => "internal_server_error",
        }
    }

    /// Request attribute the error relates to, if any.
    pub fn attribute(&self) -> Option<&str> {
        match self {
            AppError::InvalidEnvironment => Some("app_env"),
            AppError::InvalidRequest { attribute, .. } => attribute.as_deref(),
            AppError::Unauthorized(_)
            | AppError::ApiKeyInactive
            | AppError::InvalidApp
            | AppError::InvalidApiKey => Some("api_key"),
            AppError::NotFound { attribute, .. }
            | AppError::Forbidden { attribute, .. }
            | AppError::Upstream { attribute, .. } => Some(*attribute),
            AppError::Internal(_) => None,
        }
    }

    /// Status code as sent in the envelope.
    pub fn status_u16(&self) -> u16 {
        match self {
            AppError::InvalidEnvironment
            | AppError::InvalidRequest { .. }
            | AppError::ApiKeyInactive => 400,
            AppError::Unauthorized(_) => 401,
            AppError::InvalidApp | AppError::InvalidApiKey | AppError::Forbidden { .. } => 403,
            AppError::NotFound { .. } => 404,
            AppError::Upstream { status, .. } => match StatusCode::from_u16(*status) {
                Ok(code) if code.is_client_error() || code.is_server_error() => *status,
                _ => 500,
            },
            AppError::Internal(_) => 500,
        }
    }

    /// Build the envelope returned to callers.
    pub fn envelope(&self) -> ErrorEnvelope {
        let detail = match self {
            // Collaborator details stay in the logs.
            AppError::Internal(_) => "Internal server error.".to_string(),
            other => other.to_string(),
        };

        ErrorEnvelope {
            status_code: self.status_u16(),
            code: self.code().to_string(),
            detail,
            attribute: self.attribute().map(str::to_string),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> HttpResponse {
        let envelope = self.envelope();

        if envelope.status_code >= 500 {
            tracing::error!(code = %envelope.code, "{}", self);
        } else {
            tracing::warn!(code = %envelope.code, attribute = ?envelope.attribute, "{}", self);
        }

        HttpResponse::build(self.status_code()).json(envelope)
    }
}

/// Error response body shared by every endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorEnvelope {
    pub status_code: u16,
    pub code: String,
    pub detail: String,
    pub attribute: Option<String>,
}

impl std::fmt::Display for ErrorEnvelope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}: {}", self.status_code, self.code, self.detail)
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Internal(format!("HTTP request failed: {}", err))
    }
}
