//! # Command Handler
//!
//! Single entry point for every inbound Discord event. Applies the access
//! gate, turns the event into an [`InboundEvent`], and hands it to the
//! conversation engine.
//!
//! - **Version**: 4.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 4.0.0: Routes through the conversation engine behind the access gate
//! - 1.0.0: Initial release

use anyhow::Result;
use log::{debug, info, warn};
use serenity::model::application::interaction::application_command::ApplicationCommandInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::Message;
use serenity::prelude::Context;
use std::sync::Arc;

use crate::features::access::{AccessGate, DENIED_MESSAGE};
use crate::features::conversation::{ConversationEngine, InboundEvent, Reply, Topic};
use crate::message_components::{build_components, send_reply};

#[derive(Clone)]
pub struct CommandHandler {
    gate: AccessGate,
    engine: Arc<ConversationEngine>,
}

impl CommandHandler {
    pub fn new(gate: AccessGate, engine: Arc<ConversationEngine>) -> Self {
        Self { gate, engine }
    }

    pub fn engine(&self) -> &Arc<ConversationEngine> {
        &self.engine
    }

    /// Gate, then route. `None` means nothing should be sent back.
    ///
    /// Free text from other users is dropped without a reply so the bot
    /// stays quiet in shared channels; commands and buttons get a denial.
    pub async fn handle_event(&self, user_id: u64, event: InboundEvent) -> Option<Reply> {
        if !self.gate.permits(user_id) {
            return match event {
                InboundEvent::Text(_) => None,
                _ => Some(Reply::text(DENIED_MESSAGE)),
            };
        }
        self.engine.handle(&user_id.to_string(), event).await
    }

    /// Plain messages feed free-text answers into the current flow
    pub async fn handle_message(&self, ctx: &Context, msg: &Message) -> Result<()> {
        if msg.author.bot || msg.content.trim().is_empty() {
            return Ok(());
        }

        let event = InboundEvent::Text(msg.content.clone());
        if let Some(reply) = self.handle_event(msg.author.id.0, event).await {
            send_reply(&ctx.http, msg.channel_id, &reply).await?;
        }
        Ok(())
    }

    pub async fn handle_slash_command(
        &self,
        ctx: &Context,
        command: &ApplicationCommandInteraction,
    ) -> Result<()> {
        let user_id = command.user.id.0;
        info!("Slash command /{} from user {user_id}", command.data.name);

        let event = match command.data.name.as_str() {
            "start" => InboundEvent::Topic(Topic::Start),
            other => {
                warn!("Unknown slash command: /{other}");
                command
                    .create_interaction_response(&ctx.http, |response| {
                        response
                            .kind(InteractionResponseType::ChannelMessageWithSource)
                            .interaction_response_data(|message| {
                                message.content("Unknown command.").ephemeral(true)
                            })
                    })
                    .await?;
                return Ok(());
            }
        };

        let reply = match self.handle_event(user_id, event).await {
            Some(reply) => reply,
            None => {
                debug!("/{} produced no reply", command.data.name);
                return Ok(());
            }
        };

        command
            .create_interaction_response(&ctx.http, |response| {
                response
                    .kind(InteractionResponseType::ChannelMessageWithSource)
                    .interaction_response_data(|message| {
                        message
                            .content(&reply.text)
                            .set_components(build_components(&reply.buttons))
                    })
            })
            .await?;
        Ok(())
    }
}
