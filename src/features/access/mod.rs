//! # Access Gate
//!
//! Single-operator restriction applied before any event is routed.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false

use log::warn;

pub const DENIED_MESSAGE: &str = "⛔ Sorry, you are not allowed to use this bot.";

/// Admits exactly one configured identity
#[derive(Debug, Clone, Copy)]
pub struct AccessGate {
    admin_id: u64,
}

impl AccessGate {
    pub fn new(admin_id: u64) -> Self {
        Self { admin_id }
    }

    pub fn admin_id(&self) -> u64 {
        self.admin_id
    }

    pub fn permits(&self, user_id: u64) -> bool {
        let allowed = user_id == self.admin_id;
        if !allowed {
            warn!("Rejected event from unauthorized user {user_id}");
        }
        allowed
    }
}
