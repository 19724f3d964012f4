//! # Features Module
//!
//! Each feature lives in its own directory with a `mod.rs` header.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Airdrop record store, conversations, reminders and access gate
//! - 1.0.0: Initial release

pub mod access;
pub mod conversation;
pub mod reminders;
pub mod store;

// Re-export commonly used items
pub use access::AccessGate;
pub use conversation::{ConversationEngine, InboundEvent, Reply};
pub use reminders::{DiscordNotifier, Notifier, ReminderScheduler};
pub use store::{
    Backend, GitHubContentsBackend, LocalFileBackend, MemoryBackend, RecordStore, StoreError,
};
