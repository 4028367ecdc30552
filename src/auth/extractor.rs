//! Actix-web extractor for caller supplied headers.
//!
//! # Security
//! - The `Authorization` value is wrapped in `SecretString` immediately
//! - It is never logged or exposed in debug output
//! - Memory is zeroized when the request completes

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest};
use secrecy::SecretString;
use std::convert::Infallible;
use std::future::{Ready, ready};

/// Headers the proxy pipeline needs from the inbound request.
///
/// Extraction never fails: a missing credential is reported by the
/// credential verifier so that configuration errors are checked first.
#[derive(Debug, Clone, Default)]
pub struct CallerHeaders {
    /// Raw `Authorization` header value
    pub authorization: Option<SecretString>,
    /// Inbound `User-Agent`, forwarded upstream
    pub user_agent: Option<String>,
}

fn header_str<'a>(req: &'a HttpRequest, name: header::HeaderName) -> Option<&'a str> {
    req.headers().get(name).and_then(|v| v.to_str().ok())
}

impl FromRequest for CallerHeaders {
    type Error = Infallible;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(Ok(CallerHeaders {
            authorization: header_str(req, header::AUTHORIZATION)
                .map(|s| SecretString::from(s.to_string())),
            user_agent: header_str(req, header::USER_AGENT).map(str::to_string),
        }))
    }
}
