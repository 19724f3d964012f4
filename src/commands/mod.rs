//! # Command System
//!
//! Slash command (/) registration. Everything after `/start` is driven by
//! message-component buttons.
//!
//! - **Version**: 3.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 3.0.0: Single `/start` entry point
//! - 1.0.0: Initial release

pub mod slash;

pub use crate::command_handler::CommandHandler;

pub use slash::{create_slash_commands, register_global_commands, register_guild_commands};
