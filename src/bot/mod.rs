//! Bot layer - Discord-specific interface and command handlers
//!
//! Builds the poise framework, registers the slash commands in the configured
//! guild and runs the gateway client until it is shut down.

/// Checks gating protected commands
pub mod checks;
/// Discord command implementations (time, invoice)
pub mod commands;

use crate::{
    config::AppConfig,
    core::credentials::CredentialSession,
    errors::{Error, Result},
};
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument, warn};

/// Shared data available to all bot commands.
#[derive(Debug)]
pub struct BotData {
    /// Resolved application configuration
    pub config: Arc<AppConfig>,
    /// PayPal session, present only when payments are enabled
    pub payments: Option<Arc<CredentialSession>>,
}

impl BotData {
    /// Creates a new `BotData` instance.
    #[must_use]
    pub const fn new(config: Arc<AppConfig>, payments: Option<Arc<CredentialSession>>) -> Self {
        Self { config, payments }
    }
}

/// Commands to register; `invoice` only exists when payments are enabled.
#[must_use]
pub fn command_list(payments_enabled: bool) -> Vec<poise::Command<BotData, Error>> {
    let mut commands = vec![commands::timestamp()];
    if payments_enabled {
        commands.push(commands::invoice());
    }
    commands
}

async fn reply_ephemeral(ctx: poise::Context<'_, BotData, Error>, content: String) {
    let reply = poise::CreateReply::default().content(content).ephemeral(true);
    if let Err(e) = ctx.send(reply).await {
        error!("Failed to send error message: {}", e);
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup {
            error, framework, ..
        } => {
            error!("Failed to start bot: {:?}", error);
            framework.shard_manager().shutdown_all().await;
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            reply_ephemeral(ctx, format!("An error occurred: {error}")).await;
        }
        poise::FrameworkError::CommandCheckFailed {
            error: Some(error),
            ctx,
            ..
        } => {
            if !matches!(error, Error::InsufficientPrivilege { .. }) {
                warn!("Check for `{}` failed: {:?}", ctx.command().name, error);
            }
            reply_ephemeral(ctx, error.to_string()).await;
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Connects to Discord and serves commands until the gateway shuts down.
///
/// Ctrl-C stops all shards, after which this returns. Releasing the PayPal
/// session is left to the caller, which owns it.
#[instrument(skip(token, config, payments))]
pub async fn run_bot(
    token: String,
    config: Arc<AppConfig>,
    payments: Option<Arc<CredentialSession>>,
) -> Result<()> {
    let guild_id = serenity::GuildId::new(config.guild_id);
    let activity = serenity::ActivityData::playing(config.activity.clone());

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: command_list(payments.is_some()),
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                    .await?;
                info!("Registered commands in guild {}", guild_id);
                Ok(BotData::new(config, payments))
            })
        })
        .build();

    // Slash commands only; no message content or member cache needed
    let intents = serenity::GatewayIntents::GUILDS;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .activity(activity)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    let shard_manager = Arc::clone(&client.shard_manager);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl-C, shutting down");
            shard_manager.shutdown_all().await;
        }
    });

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
