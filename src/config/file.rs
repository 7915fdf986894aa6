//! Optional `config.toml` loading
//!
//! Non-secret settings (guild, role, presence text, sandbox flag) can live in a
//! TOML file next to the binary. Every field is optional; environment variables
//! override whatever the file provides.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{io::ErrorKind, path::Path};

/// Default location of the configuration file.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Discord-side settings
    pub bot: BotSection,
    /// PayPal client settings (credentials stay in the environment)
    pub paypal: PayPalSection,
}

/// `[bot]` table
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BotSection {
    /// Guild that slash commands are registered in
    pub guild_id: Option<u64>,
    /// Role required to run `/invoice`
    pub required_role_id: Option<u64>,
    /// "Playing ..." presence text
    pub activity: Option<String>,
}

/// `[paypal]` table
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PayPalSection {
    /// Route requests to the PayPal sandbox
    pub sandbox: Option<bool>,
    /// Timeout for each PayPal request, in seconds
    pub request_timeout_secs: Option<u64>,
}

/// Loads configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid or contains unknown keys
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path_ref = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path_ref);
    let contents = std::fs::read_to_string(path_ref)?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path_ref.display()),
    })
}

/// Like [`load_config`], but a missing file yields the empty configuration.
pub fn load_optional_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    match load_config(path.as_ref()) {
        Err(Error::Io(e)) if e.kind() == ErrorKind::NotFound => {
            tracing::debug!(
                "No configuration file at {:?}, using environment only",
                path.as_ref()
            );
            Ok(FileConfig::default())
        }
        other => other,
    }
}
