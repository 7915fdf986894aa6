use dotenvy::dotenv;
use invoice_buddy::{
    bot,
    config::{AppConfig, DISCORD_TOKEN_VAR},
    core::credentials::CredentialSession,
    errors::{Error, Result},
    logging::{self, LogConfig},
};
use std::{env, sync::Arc, time::Duration};
use tracing::{error, info};

const LOG_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load .env file before anything reads the environment
    let dotenv_result = dotenv();

    // 2. Initialize tracing (needs LOGGING_WEBHOOK from the environment)
    let log_guard = logging::init(&LogConfig::from_env());
    if dotenv_result.is_err() {
        info!("No .env file loaded; using the process environment.");
    }

    let result = run().await;

    // Every exit path, fatal errors included, reaches the webhook before the runtime stops
    log_guard.flush(LOG_FLUSH_TIMEOUT).await;
    result
}

async fn run() -> Result<()> {
    // 3. Load the main application configuration
    let app_config = AppConfig::load()
        .inspect_err(|e| error!("Critical error loading application configuration: {}", e))?;
    info!("Successfully processed application configuration.");

    // 4. The PayPal session exists only when payments are enabled
    let payments = app_config
        .paypal
        .clone()
        .map(|paypal| Arc::new(CredentialSession::new(paypal)));

    // 5. Run the bot
    // DISCORD_TOKEN is loaded here, directly before use, not stored in AppConfig
    let token = env::var(DISCORD_TOKEN_VAR)
        .inspect_err(|e| error!("{DISCORD_TOKEN_VAR} not found: {}", e))
        .map_err(|_| Error::ConfigurationMissing {
            key: DISCORD_TOKEN_VAR.to_string(),
        })?;

    let result = bot::run_bot(token, Arc::new(app_config), payments.clone()).await;

    // 6. Release PayPal connections whether the bot stopped cleanly or not
    if let Some(session) = payments {
        session.shutdown();
    }

    result
}
