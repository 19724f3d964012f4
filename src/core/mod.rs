//! # Core Module
//!
//! Configuration and Discord response limits shared by every feature.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Store backend selection and session timeout settings
//! - 1.1.0: Add response module with Discord message chunking utilities
//! - 1.0.0: Initial creation with config module

pub mod config;
pub mod response;

// Re-export commonly used items
pub use config::{Config, StoreBackendConfig};
pub use response::{chunk_for_message, chunk_text, truncate_label, BUTTON_LABEL_LIMIT, MESSAGE_LIMIT};
