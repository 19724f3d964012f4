//! # Reminders Feature
//!
//! Recurring airdrop reminders delivered by direct message.
//!
//! - **Version**: 2.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 2.0.0: Recurring per-row jobs with late-bound table lookup
//! - 1.0.0: Initial release

pub mod notifier;
pub mod scheduler;

pub use notifier::{DiscordNotifier, Notifier};
pub use scheduler::{
    JobId, ReminderInfo, ReminderScheduler, ScheduleError, AUTO_INTERVAL_SECS, MAX_INTERVAL_SECS,
};
