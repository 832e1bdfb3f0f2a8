// Discord-specific enforcement - translates rule-chain decisions into
// Discord actions.

use crate::core::moderation::{ExemptStore, ModAction, ModerationService};
use crate::discord::Error;
use poise::serenity_prelude as serenity;
use std::time::Duration;

/// Run a message through the rule chain and enforce the outcome.
///
/// Returns `true` if the message was silenced.
pub async fn handle_message<S: ExemptStore>(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    moderation: &ModerationService<S>,
) -> Result<bool, Error> {
    // Skip bots (including our own messages)
    if msg.author.bot {
        return Ok(false);
    }

    // Only moderate guild messages
    let guild_id = match msg.guild_id {
        Some(id) => id,
        None => return Ok(false),
    };

    let action = moderation
        .check_message(msg.author.id.get(), &msg.content)
        .await
        .map_err(|e| Error::from(e.to_string()))?;

    match action {
        ModAction::None => Ok(false),
        ModAction::Silence { duration, reason } => {
            apply_silence(ctx, msg, guild_id, duration, &reason).await;
            Ok(true)
        }
    }
}

/// Delete the message, then time out its author.
///
/// Both calls are best-effort: a refused delete never blocks the timeout,
/// a refused timeout is logged and dropped, and the author is told nothing
/// either way.
async fn apply_silence(
    ctx: &serenity::Context,
    msg: &serenity::Message,
    guild_id: serenity::GuildId,
    duration: Duration,
    reason: &str,
) {
    if let Err(e) = msg.delete(&ctx.http).await {
        tracing::warn!(
            "Failed to delete message {} from {}: {}",
            msg.id,
            msg.author.id,
            e
        );
    }

    let timeout_until = match serenity::Timestamp::from_unix_timestamp(
        chrono::Utc::now().timestamp() + duration.as_secs() as i64,
    ) {
        Ok(ts) => ts,
        Err(e) => {
            tracing::error!("Failed to create timeout timestamp: {}", e);
            return;
        }
    };

    match guild_id
        .edit_member(
            &ctx.http,
            msg.author.id,
            serenity::EditMember::new()
                .disable_communication_until_datetime(timeout_until)
                .audit_log_reason(reason),
        )
        .await
    {
        Ok(_) => tracing::info!(
            user_id = msg.author.id.get(),
            timeout_secs = duration.as_secs(),
            reason,
            "User silenced"
        ),
        Err(e) => tracing::warn!("Failed to time out {}: {}", msg.author.id, e),
    }
}
