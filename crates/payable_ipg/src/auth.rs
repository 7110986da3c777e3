//! Client-credentials token lifecycle for stored-card operations.

use std::sync::Arc;

use base64::Engine;
use error_stack::{report, IntoReport, ResultExt};
use masking::{PeekInterface, Secret};
use time::OffsetDateTime;

use crate::{
    config::GatewayConfig,
    consts,
    errors::{CredentialError, CustomResult, TransportError},
    request::{headers, Method, Request, RequestBuilder, RequestContent},
};

/// Delivers a prepared request to the gateway and returns the raw response
/// body. Implementations must fail with [`TransportError`] for transport or
/// non-success HTTP outcomes; retry policy lives with the implementation.
#[async_trait::async_trait]
pub trait TokenTransport: Send + Sync {
    /// Executes `request` against the gateway.
    async fn execute(&self, request: Request) -> CustomResult<Vec<u8>, TransportError>;
}

/// Bearer token issued by the client-credentials grant.
#[derive(Clone, Debug)]
pub struct AccessToken {
    /// Token value attached as `Authorization: Bearer` on stored-card calls.
    pub token: Secret<String>,
    /// Instant after which the token is treated as absent.
    pub expires_at: OffsetDateTime,
}

impl AccessToken {
    /// Whether the token must be refreshed before use at `now`.
    pub fn is_expired_at(&self, now: OffsetDateTime) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, serde::Serialize)]
struct TokenGrantRequest {
    grant_type: &'static str,
}

#[derive(Debug, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenGrantResponse {
    access_token: Secret<String>,
    expires_in: Option<i64>,
}

/// Owns the merchant's business credentials and the cached access token.
///
/// The cache slot lock is held across the refresh await, so concurrent
/// callers share one in-flight acquisition instead of issuing their own.
#[derive(Debug)]
pub struct CredentialVault {
    config: Arc<GatewayConfig>,
    cached: tokio::sync::Mutex<Option<AccessToken>>,
}

impl CredentialVault {
    /// Creates a vault over `config`.
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self {
            config,
            cached: tokio::sync::Mutex::new(None),
        }
    }

    /// Returns the cached token while it is fresh, refreshing through
    /// `transport` otherwise.
    pub async fn get_valid_token(
        &self,
        transport: &dyn TokenTransport,
    ) -> CustomResult<AccessToken, CredentialError> {
        let mut slot = self.cached.lock().await;
        if let Some(token) = slot.as_ref() {
            if !token.is_expired_at(OffsetDateTime::now_utc()) {
                return Ok(token.clone());
            }
        }
        tracing::debug!("access token absent or expired, requesting a fresh grant");
        let fresh = self.acquire_token(transport).await?;
        *slot = Some(fresh.clone());
        Ok(fresh)
    }

    /// Requests a client-credentials grant and returns the issued token.
    /// Does not touch the cache; callers normally want
    /// [`Self::get_valid_token`] instead.
    pub async fn acquire_token(
        &self,
        transport: &dyn TokenTransport,
    ) -> CustomResult<AccessToken, CredentialError> {
        let request = self.grant_request()?;
        let body = transport
            .execute(request)
            .await
            .change_context(CredentialError::TokenEndpointUnreachable)?;
        let response: TokenGrantResponse = serde_json::from_slice(&body)
            .into_report()
            .change_context(CredentialError::ResponseDeserializationFailed)?;
        let ttl = response
            .expires_in
            .unwrap_or(consts::DEFAULT_ACCESS_TOKEN_TTL_SECONDS);
        Ok(AccessToken {
            token: response.access_token,
            expires_at: OffsetDateTime::now_utc() + time::Duration::seconds(ttl),
        })
    }

    /// Builds the grant request envelope with the basic authorization
    /// credential derived from the business key and token.
    fn grant_request(&self) -> CustomResult<Request, CredentialError> {
        let credentials = &self.config.credentials;
        let business_key = credentials
            .business_key
            .as_deref()
            .ok_or(report!(CredentialError::MissingBusinessCredentials))?;
        let business_token = credentials
            .business_token
            .as_ref()
            .ok_or(report!(CredentialError::MissingBusinessCredentials))?;
        let credential = consts::BASE64_ENGINE.encode(format!(
            "{}:{}",
            business_key,
            business_token.peek()
        ));
        let body = RequestContent::json(&TokenGrantRequest {
            grant_type: "client_credentials",
        })
        .change_context(CredentialError::RequestEncodingFailed)?;
        Ok(RequestBuilder::new()
            .method(Method::Post)
            .url(&self.config.url(consts::AUTH_TOKENIZE_PATH))
            .header(headers::CONTENT_TYPE, "application/json")
            .header_masked(
                headers::AUTHORIZATION,
                Secret::new(format!("Basic {credential}")),
            )
            .set_body(body)
            .build())
    }
}
