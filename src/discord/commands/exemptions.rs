// Exempt-list slash commands.
//
// This layer is THIN - extract the user id from the Discord type, call the
// core service, phrase the reply from the outcome. All replies are ephemeral
// so only the requesting moderator sees them.

use crate::core::moderation::{AddOutcome, ModerationService, RemoveOutcome};
use crate::infra::exemptions::JsonExemptStore;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Type alias for our bot's context.
/// This is what every command receives as its first parameter.
pub type Error = Box<dyn std::error::Error + Send + Sync>;
pub type Context<'a> = poise::Context<'a, Data, Error>;

/// Data that's shared across all commands.
pub struct Data {
    pub moderation: Arc<ModerationService<JsonExemptStore>>,
}

/// Manage the moderation exempt list.
#[poise::command(
    slash_command,
    subcommands("add", "remove", "list"),
    required_permissions = "MODERATE_MEMBERS",
    guild_only
)]
pub async fn exempt(_ctx: Context<'_>) -> Result<(), Error> {
    // Parent command - subcommands do the work
    Ok(())
}

/// Exempt a user from moderation.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MODERATE_MEMBERS"
)]
pub async fn add(
    ctx: Context<'_>,
    #[description = "User to exempt from moderation"] user: serenity::User,
) -> Result<(), Error> {
    let outcome = ctx
        .data()
        .moderation
        .add_exempt(user.id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    let reply = match outcome {
        AddOutcome::Added => format!("✅ <@{}> has been added to the exempt list.", user.id),
        AddOutcome::AlreadyExempt => format!("<@{}> is already on the exempt list.", user.id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Put a user back under moderation.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MODERATE_MEMBERS"
)]
pub async fn remove(
    ctx: Context<'_>,
    #[description = "User to remove from the exempt list"] user: serenity::User,
) -> Result<(), Error> {
    let outcome = ctx
        .data()
        .moderation
        .remove_exempt(user.id.get())
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    let reply = match outcome {
        RemoveOutcome::Removed => {
            format!("✅ <@{}> has been removed from the exempt list.", user.id)
        }
        RemoveOutcome::NotExempt => format!("<@{}> is not on the exempt list.", user.id),
    };
    ctx.say(reply).await?;
    Ok(())
}

/// Show who is currently exempt from moderation.
#[poise::command(
    slash_command,
    guild_only,
    ephemeral,
    required_permissions = "MODERATE_MEMBERS"
)]
pub async fn list(ctx: Context<'_>) -> Result<(), Error> {
    let users = ctx
        .data()
        .moderation
        .exempt_users()
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    if users.is_empty() {
        ctx.say("The exempt list is empty.").await?;
    } else {
        let mentions: Vec<String> = users.iter().map(|id| format!("<@{id}>")).collect();
        ctx.say(format!("Exempt users: {}", mentions.join(", ")))
            .await?;
    }
    Ok(())
}
