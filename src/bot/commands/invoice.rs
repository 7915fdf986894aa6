//! PayPal invoice command.
//!
//! Only registered when PayPal credentials and the required role are configured.
//! The role check and the token refresh both run before anything is sent to
//! PayPal; invoice creation itself is still a placeholder.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks::has_required_role},
        errors::{Error, Result},
    };
    use tracing::info;

    const NOT_IMPLEMENTED: &str = "This command is not yet implemented.";

    /// Creates an invoice for the specified amount and sends it.
    #[poise::command(slash_command, guild_only, check = "has_required_role")]
    pub async fn invoice(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "The amount of money, USD, that is owed."]
        #[min = 1]
        amount: i64,
    ) -> Result<()> {
        let Some(session) = ctx.data().payments.as_ref() else {
            return Err(Error::ConfigurationMissing {
                key: "PAYPAL_CLIENT_ID".to_string(),
            });
        };

        // Token refresh may take longer than Discord's three second window.
        ctx.defer_ephemeral().await?;

        let token = session.ensure_valid_token().await?;
        let _payments = session.api_client()?;
        info!(
            amount,
            user = %ctx.author().name,
            token_expires_at = %token.expires_at,
            "Invoice requested"
        );

        ctx.send(
            poise::CreateReply::default()
                .content(NOT_IMPLEMENTED)
                .ephemeral(true),
        )
        .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
