//! # Conversation Feature
//!
//! Per-owner multi-step flows: add/delete wallet, add/delete airdrop,
//! reminder setup and teardown, listings and export.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Idle timeout for abandoned flows
//! - 1.0.0: Initial release

pub mod engine;
pub mod event;
pub mod render;
pub mod reply;
pub mod session;
pub mod state;

pub use engine::{parse_delay_minutes, ConversationEngine, MAX_DELAY_MINUTES};
pub use event::{InboundEvent, ReminderMode, Selection, Topic, WalletKind};
pub use reply::{Attachment, Button, Reply};
pub use session::SessionStore;
pub use state::{AirdropDraft, ConversationState};
