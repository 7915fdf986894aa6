//! PayPal environment selection and OAuth wire types.

use crate::errors::TokenRefreshError;
use serde::Deserialize;

/// Base URL of the live PayPal REST API.
pub const PRODUCTION_BASE_URL: &str = "https://api-m.paypal.com";
/// Base URL of the PayPal sandbox.
pub const SANDBOX_BASE_URL: &str = "https://api-m.sandbox.paypal.com";
/// Path of the OAuth token endpoint, relative to the base URL.
pub const TOKEN_PATH: &str = "/v1/oauth2/token";

/// Which PayPal deployment requests are sent to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PayPalEnvironment {
    #[default]
    Production,
    Sandbox,
    /// Arbitrary base URL, used to point the client at a mock server.
    Custom(String),
}

impl PayPalEnvironment {
    /// Picks the sandbox when `sandbox` is set, production otherwise.
    #[must_use]
    pub const fn from_sandbox_flag(sandbox: bool) -> Self {
        if sandbox { Self::Sandbox } else { Self::Production }
    }

    /// Base URL without a trailing slash.
    #[must_use]
    pub fn base_url(&self) -> &str {
        match self {
            Self::Production => PRODUCTION_BASE_URL,
            Self::Sandbox => SANDBOX_BASE_URL,
            Self::Custom(url) => url.trim_end_matches('/'),
        }
    }

    /// Full URL of the client-credentials token endpoint.
    #[must_use]
    pub fn token_url(&self) -> String {
        format!("{}{TOKEN_PATH}", self.base_url())
    }
}

/// Body returned by `POST /v1/oauth2/token`.
///
/// PayPal sends more fields (`scope`, `app_id`, `nonce`); only the ones needed to
/// use and expire the token are kept.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    /// Lifetime in seconds, relative to when the token was issued
    pub expires_in: u64,
}

impl TokenResponse {
    /// Parses and validates a token response body.
    ///
    /// Empty tokens and a zero lifetime are rejected: either would leave the
    /// session without a usable token after a "successful" refresh.
    pub fn parse(body: &[u8]) -> Result<Self, TokenRefreshError> {
        let response: Self = serde_json::from_slice(body).map_err(|e| {
            TokenRefreshError::MalformedResponse {
                message: e.to_string(),
            }
        })?;

        if response.access_token.is_empty() {
            return Err(TokenRefreshError::MalformedResponse {
                message: "access_token is empty".to_string(),
            });
        }
        if response.expires_in == 0 {
            return Err(TokenRefreshError::MalformedResponse {
                message: "expires_in must be positive".to_string(),
            });
        }

        Ok(response)
    }
}
