// Core layer - configuration and Discord limits
pub mod core;

// Features layer - store, conversation, reminders, access
pub mod features;

// UI components
pub mod message_components;

// Application layer
pub mod command_handler;
pub mod commands;

pub use self::core::Config;

pub use features::{
    // Access
    AccessGate,
    // Conversation
    ConversationEngine, InboundEvent, Reply,
    // Reminders
    DiscordNotifier, Notifier, ReminderScheduler,
    // Store
    Backend, GitHubContentsBackend, LocalFileBackend, MemoryBackend, RecordStore, StoreError,
};
