// This is the entry point of the moderation bot.
//
// **Architecture Overview:**
// - `core/` = Business logic (platform-agnostic)
// - `infra/` = Implementations of core traits (storage, web)
// - `discord/` = Discord-specific adapters (commands, events)
//
// This file's job is to:
// 1. Load configuration
// 2. Initialize services (dependency injection)
// 3. Spawn the liveness endpoint and keepalive pinger
// 4. Set up the Discord framework

// These attrs point each module declaration at a more descriptive root file
// so we don't end up with a pile of mod.rs files that all look the same.
#[path = "core/core_layer.rs"]
mod core;
#[path = "discord/discord_layer.rs"]
mod discord;
#[path = "infra/infra_layer.rs"]
mod infra;

use crate::core::moderation::ModerationService;
use crate::discord::moderation as moderation_handler;
use crate::discord::{Data, Error};
use crate::infra::exemptions::JsonExemptStore;
use crate::infra::web::{liveness, pinger};
use poise::serenity_prelude as serenity;
use std::sync::Arc;

const DEFAULT_PORT: u16 = 10000;

/// Event handler for non-command Discord events.
/// Every incoming message goes through the rule chain here.
async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, Error>,
    data: &Data,
) -> Result<(), Error> {
    if let serenity::FullEvent::Message { new_message } = event {
        // One bad message must never halt the dispatch loop - log and move on.
        if let Err(e) =
            moderation_handler::handle_message(ctx, new_message, &data.moderation).await
        {
            tracing::error!("Error moderating message {}: {}", new_message.id, e);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    // Initialize logging so we can see what's happening
    tracing_subscriber::fmt::init();

    // Load environment variables from .env file (if it exists)
    dotenv::dotenv().ok();

    // Get Discord bot token from environment
    let token = match std::env::var("DISCORD_TOKEN") {
        Ok(t) if !t.trim().is_empty() => t.trim().to_string(),
        _ => {
            tracing::error!("DISCORD_TOKEN environment variable is not set; refusing to start");
            std::process::exit(1);
        }
    };

    // Keep runtime state in a dedicated folder so the repo root stays tidy.
    let data_dir = "data";
    if let Err(e) = std::fs::create_dir_all(data_dir) {
        tracing::warn!("Failed to create data directory {}: {}", data_dir, e);
    }

    // ========================================================================
    // DEPENDENCY INJECTION
    // ========================================================================
    // Create our services with their dependencies.
    // This is the "composition root" where we wire everything together.

    let exempt_store = JsonExemptStore::new(format!("{}/exempt_users.json", data_dir));
    let moderation_service = Arc::new(ModerationService::new(exempt_store));

    let data = Data {
        moderation: Arc::clone(&moderation_service),
    };

    // ========================================================================
    // BACKGROUND TASKS
    // ========================================================================
    // The liveness endpoint and the keepalive pinger run for the process
    // lifetime and share no state with moderation.

    let port = std::env::var("PORT")
        .ok()
        .and_then(|v| v.parse::<u16>().ok())
        .unwrap_or(DEFAULT_PORT);
    tokio::spawn(async move {
        if let Err(e) = liveness::serve(port).await {
            tracing::error!("Liveness endpoint failed: {}", e);
        }
    });

    match std::env::var("RENDER_EXTERNAL_URL") {
        Ok(url) if !url.trim().is_empty() => {
            tokio::spawn(pinger::ping_loop(url));
        }
        _ => tracing::info!("RENDER_EXTERNAL_URL not set; keepalive pinger disabled"),
    }

    // ========================================================================
    // DISCORD FRAMEWORK SETUP
    // ========================================================================
    // Configure the poise framework with our commands and settings.

    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT // Required to read message content
        | serenity::GatewayIntents::GUILDS
        | serenity::GatewayIntents::GUILD_MEMBERS;

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![discord::commands::exemptions::exempt()],
            // Event handler for incoming messages
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(|ctx, _ready, framework| {
            Box::pin(async move {
                // Register slash commands globally (can take a while to propagate)
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                tracing::info!("Commands registered; bot is ready");
                Ok(data)
            })
        })
        .build();

    // Create the client and start the bot
    let mut client = match serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
    {
        Ok(client) => client,
        Err(e) => {
            tracing::error!("Error creating Discord client: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = client.start().await {
        tracing::error!("Bot stopped with error: {}", e);
    }
}
