//! Unified error types for `InvoiceBuddy`.
//!
//! Every fallible operation in the crate returns [`Result`], so errors from the
//! PayPal token endpoint, the role check and the Discord framework all reach the
//! command boundary through one type.

use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// A configuration value was present but invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Human readable description of the problem
        message: String,
    },

    /// A required configuration value was absent at startup.
    #[error("Missing configuration value: {key}")]
    ConfigurationMissing {
        /// Name of the missing key (environment variable or config field)
        key: String,
    },

    /// The OAuth client-credentials grant failed.
    #[error("Token refresh failed: {0}")]
    TokenRefresh(#[from] TokenRefreshError),

    /// The invoking user lacks the role that gates the command.
    #[error("You need the <@&{role_id}> role to use this command.")]
    InsufficientPrivilege {
        /// The role that was required
        role_id: u64,
    },

    /// The credential session was shut down and can no longer issue requests.
    #[error("The payment session has been shut down")]
    SessionClosed,

    /// Building an HTTP client failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

/// Reasons a token refresh can fail.
///
/// All of these are fatal for the in-flight command. The caller may try again on
/// its next invocation.
#[derive(Debug, Error)]
pub enum TokenRefreshError {
    /// The request never produced a response (connection failure, timeout).
    #[error("request to the authorization endpoint failed: {0}")]
    Transport(#[source] reqwest::Error),

    /// The authorization endpoint answered with a non-success status.
    #[error("authorization endpoint returned {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, as far as it could be read
        body: String,
    },

    /// The response body was not the expected token JSON.
    #[error("malformed token response: {message}")]
    MalformedResponse {
        /// What was wrong with the body
        message: String,
    },
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_privilege_mentions_role() {
        let err = Error::InsufficientPrivilege { role_id: 42 };
        assert_eq!(
            err.to_string(),
            "You need the <@&42> role to use this command."
        );
    }

    #[test]
    fn test_token_refresh_error_converts() {
        let err: Error = TokenRefreshError::Status {
            status: 401,
            body: "invalid_client".to_string(),
        }
        .into();
        assert!(matches!(
            err,
            Error::TokenRefresh(TokenRefreshError::Status { status: 401, .. })
        ));
        assert!(err.to_string().contains("401"));
    }
}
