//! # Reminder Delivery
//!
//! How a fired reminder reaches its owner.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use anyhow::{Context as _, Result};
use async_trait::async_trait;
use log::debug;
use serenity::http::Http;
use serenity::model::id::UserId;
use std::sync::Arc;

use crate::core::response::chunk_for_message;

/// Delivers a rendered reminder to its owner
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, owner: &str, text: &str) -> Result<()>;
}

/// Sends reminders as Discord direct messages
pub struct DiscordNotifier {
    http: Arc<Http>,
}

impl DiscordNotifier {
    pub fn new(http: Arc<Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Notifier for DiscordNotifier {
    async fn notify(&self, owner: &str, text: &str) -> Result<()> {
        let user_id: u64 = owner
            .parse()
            .with_context(|| format!("owner id {owner} is not a Discord user id"))?;
        let http: &Http = &self.http;

        let dm = UserId(user_id).create_dm_channel(http).await?;
        for chunk in chunk_for_message(text) {
            dm.say(http, chunk).await?;
        }
        debug!("Delivered reminder DM to {owner}");
        Ok(())
    }
}
