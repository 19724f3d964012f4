//! # Message Components
//!
//! Renders replies as Discord messages with button rows, and routes button
//! presses back into the command handler.
//!
//! - **Version**: 2.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 2.1.0: Paging buttons styled as navigation
//! - 2.0.0: Buttons generated from conversation replies
//! - 1.0.0: Initial release

use anyhow::Result;
use log::{info, warn};
use serenity::builder::CreateComponents;
use serenity::http::Http;
use serenity::model::application::component::ButtonStyle;
use serenity::model::application::interaction::message_component::MessageComponentInteraction;
use serenity::model::application::interaction::InteractionResponseType;
use serenity::model::channel::AttachmentType;
use serenity::model::id::ChannelId;
use serenity::prelude::Context;
use std::borrow::Cow;

use crate::command_handler::CommandHandler;
use crate::core::response::{chunk_for_message, truncate_label};
use crate::features::conversation::event::{
    DELETE_AIRDROP_PREFIX, DELETE_WALLET_PREFIX, PAGE_PREFIX, STOP_REMINDER_PREFIX,
};
use crate::features::conversation::{Button, InboundEvent, Reply, Topic};

/// Discord allows five buttons per action row
pub const BUTTONS_PER_ROW: usize = 5;
/// and five action rows per message
pub const MAX_BUTTONS: usize = 25;

/// Group buttons into action rows, dropping anything past the platform limit
pub fn layout_rows(buttons: &[Button]) -> Vec<&[Button]> {
    if buttons.len() > MAX_BUTTONS {
        warn!(
            "Reply has {} buttons, only the first {MAX_BUTTONS} are shown",
            buttons.len()
        );
    }
    let shown = &buttons[..buttons.len().min(MAX_BUTTONS)];
    shown.chunks(BUTTONS_PER_ROW).collect()
}

fn style_for(custom_id: &str) -> ButtonStyle {
    let destructive = [DELETE_WALLET_PREFIX, DELETE_AIRDROP_PREFIX, STOP_REMINDER_PREFIX];
    if destructive.iter().any(|p| custom_id.starts_with(p)) {
        ButtonStyle::Danger
    } else if custom_id.starts_with(PAGE_PREFIX)
        || Topic::MENU.iter().any(|t| t.id() == custom_id)
    {
        ButtonStyle::Secondary
    } else {
        ButtonStyle::Primary
    }
}

pub fn build_components(buttons: &[Button]) -> CreateComponents {
    let mut components = CreateComponents::default();
    for row_buttons in layout_rows(buttons) {
        components.create_action_row(|row| {
            for button in row_buttons {
                row.create_button(|b| {
                    b.custom_id(&button.custom_id)
                        .label(truncate_label(&button.label))
                        .style(style_for(&button.custom_id))
                });
            }
            row
        });
    }
    components
}

/// Send a reply to a channel. Long text is split; buttons and the
/// attachment ride on the last message.
pub async fn send_reply(http: &Http, channel_id: ChannelId, reply: &Reply) -> Result<()> {
    let chunks = chunk_for_message(&reply.text);
    let last = chunks.len().saturating_sub(1);

    for (i, chunk) in chunks.iter().enumerate() {
        let is_last = i == last;
        channel_id
            .send_message(http, |message| {
                message.content(chunk);
                if is_last {
                    if !reply.buttons.is_empty() {
                        message.set_components(build_components(&reply.buttons));
                    }
                    if let Some(attachment) = &reply.attachment {
                        message.add_file(AttachmentType::Bytes {
                            data: Cow::Borrowed(attachment.bytes.as_slice()),
                            filename: attachment.filename.clone(),
                        });
                    }
                }
                message
            })
            .await?;
    }
    Ok(())
}

/// Handler for button presses
pub struct MessageComponentHandler {
    command_handler: CommandHandler,
}

impl MessageComponentHandler {
    pub fn new(command_handler: CommandHandler) -> Self {
        Self { command_handler }
    }

    pub async fn handle_component_interaction(
        &self,
        ctx: &Context,
        interaction: &MessageComponentInteraction,
    ) -> Result<()> {
        let custom_id = &interaction.data.custom_id;
        let user_id = interaction.user.id.0;

        info!("Processing component interaction: {custom_id} from user: {user_id}");

        let Some(event) = InboundEvent::from_custom_id(custom_id) else {
            warn!("Unknown component id: {custom_id}");
            interaction
                .create_interaction_response(&ctx.http, |response| {
                    response
                        .kind(InteractionResponseType::ChannelMessageWithSource)
                        .interaction_response_data(|message| {
                            message
                                .content("Unknown component interaction.")
                                .ephemeral(true)
                        })
                })
                .await?;
            return Ok(());
        };

        // Acknowledge first; store calls may outlast the interaction deadline
        interaction
            .create_interaction_response(&ctx.http, |response| {
                response.kind(InteractionResponseType::DeferredUpdateMessage)
            })
            .await?;

        if let Some(reply) = self.command_handler.handle_event(user_id, event).await {
            send_reply(&ctx.http, interaction.channel_id, &reply).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::conversation::reply::main_menu;
    use crate::features::conversation::Selection;

    fn numbered(n: usize) -> Vec<Button> {
        (0..n)
            .map(|i| Button::selection(Selection::DeleteWallet(i), format!("wallet {i}")))
            .collect()
    }

    #[test]
    fn test_main_menu_fits_two_rows() {
        let menu = main_menu();
        let rows = layout_rows(&menu);
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.len() <= BUTTONS_PER_ROW));
    }

    #[test]
    fn test_overflow_is_dropped() {
        let buttons = numbered(31);
        let rows = layout_rows(&buttons);
        assert_eq!(rows.len(), 5);
        assert_eq!(rows.iter().map(|r| r.len()).sum::<usize>(), MAX_BUTTONS);
        assert_eq!(rows[4].last().unwrap().custom_id, "delwallet_24");
    }

    #[test]
    fn test_styles() {
        assert!(matches!(style_for("delairdrop_2"), ButtonStyle::Danger));
        assert!(matches!(style_for("add_wallet"), ButtonStyle::Secondary));
        assert!(matches!(style_for("wallet_type_evm"), ButtonStyle::Primary));
        assert!(matches!(style_for("page_1"), ButtonStyle::Secondary));
    }

    #[test]
    fn test_build_components_rows() {
        let components = build_components(&numbered(7));
        assert_eq!(components.0.len(), 2);
    }
}
