//! Credential session manager for the PayPal REST API.
//!
//! [`CredentialSession`] owns the two outbound HTTP sessions (one for the OAuth
//! token endpoint, one for payment calls) and the current bearer token. Callers
//! run [`CredentialSession::ensure_valid_token`] before every protected
//! operation; it refreshes the token through the client-credentials grant only
//! when none is stored or the stored one has expired.

use crate::{
    config::PayPalConfig,
    core::{
        clock::{Clock, SystemClock},
        paypal::TokenResponse,
    },
    errors::{Error, Result, TokenRefreshError},
};
use chrono::{DateTime, TimeDelta, Utc};
use reqwest::{
    Client,
    header::{ACCEPT, ACCEPT_LANGUAGE, HeaderMap, HeaderValue},
};
use std::{
    fmt,
    sync::{
        Arc, Mutex as StdMutex, PoisonError,
        atomic::{AtomicBool, Ordering},
    },
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// A bearer token together with its scheme and absolute expiry.
///
/// The three fields only ever travel together, so a stored token can never have
/// an expiry without a value or the other way round.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    pub access_token: String,
    /// Bearer scheme reported by PayPal, normally `Bearer`
    pub token_type: String,
    /// Instant at and after which the token must not be used
    pub expires_at: DateTime<Utc>,
}

impl AccessToken {
    /// Whether the token is unusable at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Value for an `Authorization` header, e.g. `Bearer A21AA...`.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token)
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("access_token", &"[REDACTED]")
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Owner of the PayPal HTTP sessions and the current access token.
pub struct CredentialSession {
    config: PayPalConfig,
    clock: Arc<dyn Clock>,
    auth_client: StdMutex<Option<Client>>,
    api_client: StdMutex<Option<Client>>,
    // Held across the refresh request so concurrent callers share one refresh.
    token: Mutex<Option<AccessToken>>,
    closed: AtomicBool,
}

impl CredentialSession {
    /// Creates a session that reads time from the system clock.
    ///
    /// No network activity happens here; both HTTP sessions are created on
    /// first use.
    #[must_use]
    pub fn new(config: PayPalConfig) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Creates a session with a custom time source.
    #[must_use]
    pub fn with_clock(config: PayPalConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            config,
            clock,
            auth_client: StdMutex::new(None),
            api_client: StdMutex::new(None),
            token: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Returns a token that is valid right now, refreshing it first if needed.
    ///
    /// Performs no network call while the stored token is unexpired. A failed
    /// refresh leaves any previously stored token in place and is returned as
    /// [`Error::TokenRefresh`]; no retry is attempted.
    #[instrument(skip(self))]
    pub async fn ensure_valid_token(&self) -> Result<AccessToken> {
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }

        let mut token = self.token.lock().await;
        let now = self.clock.now();
        if let Some(current) = token.as_ref().filter(|t| !t.is_expired_at(now)) {
            return Ok(current.clone());
        }

        match token.as_ref() {
            Some(stale) => debug!(expired_at = %stale.expires_at, "Access token expired"),
            None => debug!("No access token stored yet"),
        }

        let fresh = self.refresh_token().await?;
        *token = Some(fresh.clone());
        Ok(fresh)
    }

    /// Snapshot of the stored token without triggering a refresh.
    pub async fn current_token(&self) -> Option<AccessToken> {
        self.token.lock().await.clone()
    }

    /// HTTP session for payment API calls, created on first use.
    pub fn api_client(&self) -> Result<Client> {
        self.ensure_session(&self.api_client, build_api_client)
    }

    /// Releases both HTTP sessions.
    ///
    /// Sessions that were never created are skipped. Calling this more than once
    /// is a no-op, and every later token or client request fails with
    /// [`Error::SessionClosed`].
    pub fn shutdown(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            debug!("Credential session already shut down");
            return;
        }

        let released: Vec<&str> = [
            ("authorization", &self.auth_client),
            ("payments", &self.api_client),
        ]
        .into_iter()
        .filter_map(|(name, slot)| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
                .map(|_| name)
        })
        .collect();

        info!(?released, "Credential session shut down");
    }

    /// Whether [`Self::shutdown`] has run.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    fn auth_client(&self) -> Result<Client> {
        self.ensure_session(&self.auth_client, build_auth_client)
    }

    fn ensure_session(
        &self,
        slot: &StdMutex<Option<Client>>,
        build: fn(&PayPalConfig) -> reqwest::Result<Client>,
    ) -> Result<Client> {
        let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
        // Checked under the lock so shutdown cannot miss a session created concurrently.
        if self.is_closed() {
            return Err(Error::SessionClosed);
        }
        if let Some(client) = guard.as_ref() {
            return Ok(client.clone());
        }

        let client = build(&self.config)?;
        debug!("Opened HTTP session");
        *guard = Some(client.clone());
        Ok(client)
    }

    async fn refresh_token(&self) -> Result<AccessToken> {
        let client = self.auth_client()?;
        let url = self.config.environment.token_url();
        let started_at = self.clock.now();

        debug!(%url, "Requesting PayPal access token");
        let response = client
            .post(&url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(TokenRefreshError::Transport)?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error response".to_string());
            warn!(status = status.as_u16(), "PayPal rejected the token request");
            return Err(TokenRefreshError::Status {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let body = response
            .bytes()
            .await
            .map_err(TokenRefreshError::Transport)?;
        let parsed = TokenResponse::parse(&body)?;

        let expires_at = i64::try_from(parsed.expires_in)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .and_then(|lifetime| started_at.checked_add_signed(lifetime))
            .ok_or_else(|| TokenRefreshError::MalformedResponse {
                message: format!("expires_in {} is out of range", parsed.expires_in),
            })?;

        info!(
            token_type = %parsed.token_type,
            %expires_at,
            "Refreshed PayPal access token"
        );

        Ok(AccessToken {
            access_token: parsed.access_token,
            token_type: parsed.token_type,
            expires_at,
        })
    }

    #[cfg(test)]
    fn open_sessions(&self) -> (bool, bool) {
        let open = |slot: &StdMutex<Option<Client>>| {
            slot.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .is_some()
        };
        (open(&self.auth_client), open(&self.api_client))
    }
}

impl fmt::Debug for CredentialSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialSession")
            .field("config", &self.config)
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}

fn build_auth_client(config: &PayPalConfig) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en_US"));

    Client::builder()
        .default_headers(headers)
        .timeout(config.request_timeout)
        .build()
}

fn build_api_client(config: &PayPalConfig) -> reqwest::Result<Client> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

    Client::builder()
        .default_headers(headers)
        .timeout(config.request_timeout)
        .build()
}
