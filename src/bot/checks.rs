//! Command checks run by poise before a command body executes.

use crate::{
    bot::BotData,
    core::authorization::authorize,
    errors::{Error, Result},
};

/// Lets the command run only for members holding the configured role.
///
/// Returning an error (rather than `Ok(false)`) lets the error hook tell the
/// user which role is missing.
pub async fn has_required_role(ctx: poise::Context<'_, BotData, Error>) -> Result<bool> {
    let Some(required_role) = ctx.data().config.required_role_id else {
        return Err(Error::ConfigurationMissing {
            key: "REQUIRED_ROLE_ID".to_string(),
        });
    };

    let roles: Vec<u64> = ctx
        .author_member()
        .await
        .map(|member| member.roles.iter().map(|role| role.get()).collect())
        .unwrap_or_default();

    authorize(&roles, required_role).inspect_err(|_| {
        tracing::info!(
            user = %ctx.author().name,
            command = %ctx.command().name,
            "Denied command: missing required role"
        );
    })?;
    Ok(true)
}
