//! Time commands - `timestamp`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::timestamp::{host_zone, native_timestamp_message},
        errors::{Error, Result},
    };

    /// Sends the current time as a Discord timestamp, and as plain text.
    #[poise::command(slash_command)]
    pub async fn timestamp(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let message = native_timestamp_message(chrono::Utc::now(), host_zone());
        ctx.say(message).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
