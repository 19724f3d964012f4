use anyhow::Result;
use dotenvy::dotenv;
use log::{debug, error, info, warn};
use serenity::async_trait;
use serenity::http::Http;
use serenity::model::application::interaction::Interaction;
use serenity::model::channel::Message;
use serenity::model::gateway::Ready;
use serenity::model::id::GuildId;
use serenity::prelude::*;
use std::sync::Arc;
use std::time::Duration;

use airdrop_keeper::commands::{register_global_commands, register_guild_commands, CommandHandler};
use airdrop_keeper::core::{Config, StoreBackendConfig};
use airdrop_keeper::features::access::AccessGate;
use airdrop_keeper::features::conversation::ConversationEngine;
use airdrop_keeper::features::reminders::{DiscordNotifier, ReminderScheduler};
use airdrop_keeper::features::store::{
    Backend, GitHubContentsBackend, LocalFileBackend, RecordStore,
};
use airdrop_keeper::message_components::MessageComponentHandler;

/// How often abandoned conversations are swept
const SESSION_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

struct Handler {
    command_handler: Arc<CommandHandler>,
    component_handler: Arc<MessageComponentHandler>,
    guild_id: Option<GuildId>,
}

impl Handler {
    fn new(
        command_handler: CommandHandler,
        component_handler: MessageComponentHandler,
        guild_id: Option<GuildId>,
    ) -> Self {
        Handler {
            command_handler: Arc::new(command_handler),
            component_handler: Arc::new(component_handler),
            guild_id,
        }
    }
}

#[async_trait]
impl EventHandler for Handler {
    async fn message(&self, ctx: Context, msg: Message) {
        if let Err(e) = self.command_handler.handle_message(&ctx, &msg).await {
            error!("Error handling message from {}: {e}", msg.author.id);
            let _ = msg
                .channel_id
                .say(&ctx.http, "❌ Sorry, something went wrong. Please try again.")
                .await;
        }
    }

    async fn ready(&self, ctx: Context, ready: Ready) {
        info!("✅ {} is connected and ready!", ready.user.name);
        info!("📊 Connected to {} guilds", ready.guilds.len());

        // Guild commands update instantly, global ones can take an hour
        if let Some(guild_id) = self.guild_id {
            info!("🔧 Registering commands for guild {guild_id}");
            if let Err(e) = register_guild_commands(&ctx, guild_id).await {
                error!("❌ Failed to register guild slash commands: {e}");
            }
        } else {
            info!("🌍 Registering commands globally");
            if let Err(e) = register_global_commands(&ctx).await {
                error!("❌ Failed to register global slash commands: {e}");
            }
        }
    }

    async fn interaction_create(&self, ctx: Context, interaction: Interaction) {
        match interaction {
            Interaction::ApplicationCommand(command) => {
                if let Err(e) = self
                    .command_handler
                    .handle_slash_command(&ctx, &command)
                    .await
                {
                    error!("Error handling slash command '{}': {e}", command.data.name);
                    let _ = command
                        .channel_id
                        .say(&ctx.http, "❌ Sorry, I encountered an error processing your command.")
                        .await;
                }
            }
            Interaction::MessageComponent(component) => {
                if let Err(e) = self
                    .component_handler
                    .handle_component_interaction(&ctx, &component)
                    .await
                {
                    error!(
                        "Error handling component '{}': {e}",
                        component.data.custom_id
                    );
                    let _ = component
                        .channel_id
                        .say(&ctx.http, "❌ Sorry, something went wrong. Please try again.")
                        .await;
                }
            }
            Interaction::Ping(_) => {
                info!("Ping interaction received - Discord health check");
            }
            other => {
                debug!("Ignoring interaction of kind {:?}", other.kind());
            }
        }
    }
}

fn build_backend(config: &Config) -> Result<Arc<dyn Backend>> {
    Ok(match &config.store {
        StoreBackendConfig::Local { data_dir } => {
            info!("📁 Using local file store in {}", data_dir.display());
            Arc::new(LocalFileBackend::new(data_dir.clone()))
        }
        StoreBackendConfig::GitHub(settings) => {
            info!(
                "🐙 Using GitHub store {}@{} under {}/",
                settings.repo, settings.branch, settings.folder
            );
            Arc::new(GitHubContentsBackend::new(
                settings.clone(),
                config.store_timeout,
            )?)
        }
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting Airdrop Keeper bot...");

    let store = RecordStore::new(build_backend(&config)?, config.store_timeout);

    // Reminders are sent over REST, independent of the gateway connection
    let http = Arc::new(Http::new(&config.discord_token));
    let scheduler = ReminderScheduler::new(store.clone(), Arc::new(DiscordNotifier::new(http)));

    let engine = Arc::new(
        ConversationEngine::new(store, scheduler.clone(), config.session_idle)
            .with_auto_interval(config.auto_reminder_interval_secs),
    );
    let command_handler = CommandHandler::new(AccessGate::new(config.admin_id), engine.clone());
    let component_handler = MessageComponentHandler::new(command_handler.clone());
    let handler = Handler::new(
        command_handler,
        component_handler,
        config.discord_guild_id.map(GuildId),
    );

    match config.session_idle {
        Some(idle) => {
            info!("⏳ Conversations expire after {} minutes idle", idle.as_secs() / 60);
            let sweep_engine = engine.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(SESSION_SWEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    let purged = sweep_engine.sessions().purge_expired();
                    if purged > 0 {
                        debug!("Swept {purged} idle conversations");
                    }
                }
            });
        }
        None => warn!("Session idle timeout disabled; abandoned flows stay open"),
    }

    let intents = GatewayIntents::GUILDS
        | GatewayIntents::GUILD_MESSAGES
        | GatewayIntents::DIRECT_MESSAGES
        | GatewayIntents::MESSAGE_CONTENT;

    let mut client = Client::builder(&config.discord_token, intents)
        .event_handler(handler)
        .await
        .map_err(|e| {
            error!("Failed to create Discord client: {e}");
            anyhow::anyhow!("Client creation failed: {}", e)
        })?;

    let shard_manager = client.shard_manager.clone();
    let shutdown_scheduler = scheduler.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("🛑 Shutdown requested");
            shutdown_scheduler.shutdown();
            shard_manager.lock().await.shutdown_all().await;
        }
    });

    info!("Establishing WebSocket connection to Discord gateway...");
    info!("Gateway intents: {intents:?}");

    if let Err(why) = client.start().await {
        error!("Gateway connection failed: {why:?}");
        scheduler.shutdown();
        return Err(anyhow::anyhow!(
            "Failed to establish gateway connection: {}",
            why
        ));
    }

    scheduler.shutdown();
    info!("Airdrop Keeper stopped");
    Ok(())
}
