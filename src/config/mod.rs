//! Application configuration resolved once at startup.
//!
//! Values come from an optional `config.toml` (see [`file`]) and are overridden
//! by environment variables. The Discord bot token is deliberately not part of
//! [`AppConfig`]; it is read directly before the client is built.

/// `config.toml` loading
pub mod file;

use crate::{
    core::paypal::PayPalEnvironment,
    errors::{Error, Result},
};
use file::FileConfig;
use std::{fmt, time::Duration};
use tracing::{error, info, warn};

/// Environment variable holding the Discord bot token.
pub const DISCORD_TOKEN_VAR: &str = "DISCORD_TOKEN";
/// Environment variable that overrides the config file location.
pub const CONFIG_PATH_VAR: &str = "INVOICE_BUDDY_CONFIG";

const GUILD_ID_VAR: &str = "GUILD_ID";
const REQUIRED_ROLE_ID_VAR: &str = "REQUIRED_ROLE_ID";
const CLIENT_ID_VAR: &str = "PAYPAL_CLIENT_ID";
const CLIENT_SECRET_VAR: &str = "PAYPAL_SECRET";
const SANDBOX_VAR: &str = "DEBUG";

const DEFAULT_ACTIVITY: &str = "Serious business.";
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Settings for the PayPal client credentials flow.
#[derive(Clone)]
pub struct PayPalConfig {
    pub client_id: String,
    pub client_secret: String,
    pub environment: PayPalEnvironment,
    /// Upper bound on each request to PayPal, including the token request
    pub request_timeout: Duration,
}

impl fmt::Debug for PayPalConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PayPalConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("environment", &self.environment)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Everything the bot needs besides its token.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Guild that commands are registered in
    pub guild_id: u64,
    /// Role gating `/invoice`
    pub required_role_id: Option<u64>,
    /// Presence text shown as "Playing ..."
    pub activity: String,
    /// `Some` only when the payment feature is fully configured
    pub paypal: Option<PayPalConfig>,
}

impl AppConfig {
    /// Loads `config.toml` (if present) and the process environment.
    pub fn load() -> Result<Self> {
        let path = std::env::var(CONFIG_PATH_VAR)
            .unwrap_or_else(|_| file::DEFAULT_CONFIG_PATH.to_string());
        let file_config = file::load_optional_config(&path)?;
        Self::resolve(file_config, |key| std::env::var(key).ok())
    }

    /// Merges file settings with values from `env`, which take precedence.
    ///
    /// Empty environment values count as absent. The payment feature is only
    /// enabled when the client id, the secret and the required role are all
    /// known; a missing guild id is fatal.
    pub fn resolve<F>(file_config: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| env(key).filter(|value| !value.trim().is_empty());

        let guild_id = match lookup(GUILD_ID_VAR) {
            Some(value) => parse_id(GUILD_ID_VAR, &value)?,
            None => file_config
                .bot
                .guild_id
                .ok_or_else(|| Error::ConfigurationMissing {
                    key: GUILD_ID_VAR.to_string(),
                })?,
        };

        let required_role_id = match lookup(REQUIRED_ROLE_ID_VAR) {
            Some(value) => Some(parse_id(REQUIRED_ROLE_ID_VAR, &value)?),
            None => file_config.bot.required_role_id,
        };

        let sandbox = lookup(SANDBOX_VAR).is_some() || file_config.paypal.sandbox.unwrap_or(false);
        let request_timeout = file_config
            .paypal
            .request_timeout_secs
            .map_or(DEFAULT_REQUEST_TIMEOUT, Duration::from_secs);

        let paypal = match (lookup(CLIENT_ID_VAR), lookup(CLIENT_SECRET_VAR)) {
            (Some(client_id), Some(client_secret)) if required_role_id.is_some() => {
                Some(PayPalConfig {
                    client_id,
                    client_secret,
                    environment: PayPalEnvironment::from_sandbox_flag(sandbox),
                    request_timeout,
                })
            }
            (Some(_), Some(_)) => {
                error!(
                    "{REQUIRED_ROLE_ID_VAR} is not configured; the invoice command is disabled"
                );
                None
            }
            (Some(_), None) | (None, Some(_)) => {
                warn!(
                    "Only one of {CLIENT_ID_VAR} and {CLIENT_SECRET_VAR} is set; the invoice command is disabled"
                );
                None
            }
            (None, None) => None,
        };

        if let Some(paypal) = &paypal {
            info!(environment = ?paypal.environment, "PayPal payments enabled");
        }

        Ok(Self {
            guild_id,
            required_role_id,
            activity: file_config
                .bot
                .activity
                .unwrap_or_else(|| DEFAULT_ACTIVITY.to_string()),
            paypal,
        })
    }
}

fn parse_id(key: &str, value: &str) -> Result<u64> {
    match value.trim().parse::<u64>() {
        Ok(id) if id != 0 => Ok(id),
        _ => Err(Error::Config {
            message: format!("{key} must be a non-zero Discord id, got {value:?}"),
        }),
    }
}
