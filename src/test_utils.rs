//! Shared test utilities for `InvoiceBuddy`.
//!
//! Provides a manually advanced clock and helpers for standing up a mock PayPal
//! token endpoint with `wiremock`.

use crate::{
    config::PayPalConfig,
    core::{clock::Clock, paypal::PayPalEnvironment},
};
use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use std::{
    sync::{Mutex, PoisonError},
    time::Duration,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

/// Clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn at(start: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Moves the clock forward by `delta`.
    pub fn advance(&self, delta: TimeDelta) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += delta;
    }
}

impl Default for ManualClock {
    /// Starts at 2024-01-01 00:00:00 UTC.
    fn default() -> Self {
        Self::at(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap_or_default())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// PayPal settings pointing at a mock server.
///
/// # Defaults
/// * `client_id`: `"client-id"`
/// * `client_secret`: `"client-secret"`
/// * `request_timeout`: 5 seconds
pub fn test_paypal_config(base_url: &str) -> PayPalConfig {
    PayPalConfig {
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        environment: PayPalEnvironment::Custom(base_url.to_string()),
        request_timeout: Duration::from_secs(5),
    }
}

/// JSON body in the shape PayPal's token endpoint returns.
pub fn token_body(access_token: &str, expires_in: u64) -> serde_json::Value {
    serde_json::json!({
        "scope": "https://uri.paypal.com/services/invoicing",
        "access_token": access_token,
        "token_type": "Bearer",
        "app_id": "APP-80W284485P519543T",
        "expires_in": expires_in,
    })
}

/// Mounts a token endpoint that always succeeds with the given token.
pub async fn mount_token_endpoint(server: &MockServer, access_token: &str, expires_in: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body(access_token, expires_in)))
        .mount(server)
        .await;
}
