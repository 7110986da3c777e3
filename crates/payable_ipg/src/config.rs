//! Gateway connection settings and merchant credentials.
//!
//! One explicitly constructed [`GatewayConfig`] is shared by every
//! component; nothing in the crate reads ambient process state.

use masking::Secret;

use crate::consts;

/// Gateway environment the integration talks to.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Eq,
    PartialEq,
    serde::Deserialize,
    serde::Serialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Environment {
    /// Hosted sandbox for integration testing.
    #[default]
    Sandbox,
    /// Live gateway.
    Production,
}

impl Environment {
    /// Base URL of this environment's gateway host.
    pub const fn base_url(self) -> &'static str {
        match self {
            Self::Sandbox => consts::SANDBOX_BASE_URL,
            Self::Production => consts::PRODUCTION_BASE_URL,
        }
    }
}

/// Merchant identity and secrets issued by the gateway.
///
/// The merchant token never leaves this struct in the clear; checksum
/// chains close over its SHA-512 digest instead.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct MerchantCredentials {
    /// Public merchant identifier carried in dispatch payloads.
    pub merchant_key: String,
    /// Shared secret closing every checksum chain.
    pub merchant_token: Secret<String>,
    /// Business identifier for the client-credentials grant.
    pub business_key: Option<String>,
    /// Business secret for the client-credentials grant.
    pub business_token: Option<Secret<String>>,
}

/// Full gateway configuration handed to every component.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct GatewayConfig {
    /// Target environment.
    #[serde(default)]
    pub environment: Environment,
    /// Merchant identity and secrets.
    pub credentials: MerchantCredentials,
    /// Webhook delivery URL registered with checkout dispatches, if any.
    pub notification_url: Option<String>,
}

impl GatewayConfig {
    /// Absolute URL for `path` on the configured environment.
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.environment.base_url(), path)
    }
}
