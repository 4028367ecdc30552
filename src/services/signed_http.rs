//! Signed HTTP calls to internal backends.
//!
//! Requests are signed with AWS SigV4 for `execute-api` using the ambient
//! credential chain, so the backend authenticates this service rather than
//! the end caller.

use std::time::SystemTime;

use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_credential_types::provider::{ProvideCredentials, SharedCredentialsProvider};
use aws_sigv4::http_request::{
    SignableBody, SignableRequest, SigningParams, SigningSettings, sign,
};
use aws_sigv4::sign::v4;
use aws_smithy_runtime_api::client::identity::Identity;
use reqwest::Method;
use tracing::{debug, warn};

use crate::config::SIGNING_SERVICE;
use crate::error::{AppError, AppResult, INTERNAL_API_ERROR};

/// Normalized outbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl ProxyRequest {
    /// JSON request with the standard proxy headers.
    pub fn json(method: Method, url: impl Into<String>, user_agent: &str) -> Self {
        Self {
            method,
            url: url.into(),
            headers: vec![
                ("user-agent".to_string(), user_agent.to_string()),
                ("content-type".to_string(), "application/json".to_string()),
            ],
            body: None,
        }
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// First value of a header, case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Raw backend answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl UpstreamResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Error for a backend that could not be reached or stopped mid-response.
fn transport_error() -> AppError {
    AppError::Upstream {
        status: 500,
        code: INTERNAL_API_ERROR.to_string(),
        detail: "Upstream service unavailable.".to_string(),
        attribute: "upstream",
    }
}

/// Sends requests authenticated as this service.
#[async_trait]
pub trait SignedHttpClient: Send + Sync {
    async fn execute(&self, request: ProxyRequest) -> AppResult<UpstreamResponse>;
}

/// SigV4 signing client over `reqwest`.
#[derive(Clone)]
pub struct SigV4HttpClient {
    credentials: SharedCredentialsProvider,
    region: String,
    http_client: reqwest::Client,
}

impl SigV4HttpClient {
    pub fn new(credentials: SharedCredentialsProvider, region: impl Into<String>) -> Self {
        Self {
            credentials,
            region: region.into(),
            http_client: reqwest::Client::new(),
        }
    }

    /// Build a client from the default AWS credential chain.
    pub async fn from_env(region: impl Into<String>) -> AppResult<Self> {
        let sdk_config = aws_config::load_defaults(BehaviorVersion::latest()).await;
        let credentials = sdk_config
            .credentials_provider()
            .ok_or_else(|| AppError::Internal("No AWS credentials provider configured".into()))?;
        Ok(Self::new(credentials, region))
    }

    /// Compute the SigV4 headers for `request`.
    async fn signature_headers(&self, request: &ProxyRequest) -> AppResult<Vec<(String, String)>> {
        let credentials = self
            .credentials
            .provide_credentials()
            .await
            .map_err(|e| AppError::Internal(format!("Failed to load AWS credentials: {}", e)))?;
        let identity: Identity = credentials.into();

        let params: SigningParams<'_> = v4::SigningParams::builder()
            .identity(&identity)
            .region(&self.region)
            .name(SIGNING_SERVICE)
            .time(SystemTime::now())
            .settings(SigningSettings::default())
            .build()
            .map_err(|e| AppError::Internal(format!("Invalid signing parameters: {}", e)))?
            .into();

        let body = match &request.body {
            Some(bytes) => SignableBody::Bytes(bytes),
            None => SignableBody::Bytes(&[]),
        };

        let signable = SignableRequest::new(
            request.method.as_str(),
            request.url.as_str(),
            request.headers.iter().map(|(k, v)| (k.as_str(), v.as_str())),
            body,
        )
        .map_err(|e| AppError::Internal(format!("Request cannot be signed: {}", e)))?;

        let (instructions, _signature) = sign(signable, &params)
            .map_err(|e| AppError::Internal(format!("Request signing failed: {}", e)))?
            .into_parts();

        Ok(instructions
            .headers()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect())
    }
}

#[async_trait]
impl SignedHttpClient for SigV4HttpClient {
    async fn execute(&self, request: ProxyRequest) -> AppResult<UpstreamResponse> {
        let signature_headers = self.signature_headers(&request).await?;

        let mut builder = self
            .http_client
            .request(request.method.clone(), &request.url);
        for (name, value) in request.headers.iter().chain(signature_headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        debug!(method = %request.method, url = %request.url, "Signed upstream request");

        let response = builder.send().await.map_err(|e| {
            warn!(url = %request.url, "Upstream request failed: {}", e);
            transport_error()
        })?;

        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| {
                warn!(url = %request.url, status, "Upstream response body unreadable: {}", e);
                transport_error()
            })?
            .to_vec();

        Ok(UpstreamResponse { status, body })
    }
}

impl std::fmt::Debug for SigV4HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SigV4HttpClient")
            .field("region", &self.region)
            .finish_non_exhaustive()
    }
}
