//! # Conversation States
//!
//! Each awaiting state carries exactly the draft fields collected so far,
//! so a flow can only read data its earlier steps produced.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use crate::features::store::WalletEntry;

/// Airdrop fields collected before a wallet is chosen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropDraft {
    pub link: String,
    pub title: String,
    pub kind: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ConversationState {
    #[default]
    Idle,

    // Add wallet
    AwaitWalletAddress,
    AwaitWalletType {
        address: String,
    },
    AwaitChainName {
        address: String,
    },

    // Add airdrop
    AwaitAirdropLink,
    AwaitAirdropTitle {
        link: String,
    },
    AwaitAirdropType {
        link: String,
        title: String,
    },
    /// `offered` is the wallet list the choice buttons were built from
    AwaitWalletChoice {
        draft: AirdropDraft,
        offered: Vec<WalletEntry>,
    },

    // Deletion
    AwaitWalletToDelete,
    AwaitAirdropToDelete,

    // Reminders
    AwaitReminderMode,
    AwaitReminderDelay,
    AwaitReminderTarget {
        interval_secs: i64,
    },
    AwaitReminderToStop,
}

impl ConversationState {
    pub fn name(&self) -> &'static str {
        match self {
            ConversationState::Idle => "IDLE",
            ConversationState::AwaitWalletAddress => "AWAIT_WALLET_ADDRESS",
            ConversationState::AwaitWalletType { .. } => "AWAIT_WALLET_TYPE",
            ConversationState::AwaitChainName { .. } => "AWAIT_CHAIN_NAME",
            ConversationState::AwaitAirdropLink => "AWAIT_AIRDROP_LINK",
            ConversationState::AwaitAirdropTitle { .. } => "AWAIT_AIRDROP_TITLE",
            ConversationState::AwaitAirdropType { .. } => "AWAIT_AIRDROP_TYPE",
            ConversationState::AwaitWalletChoice { .. } => "AWAIT_WALLET_CHOICE",
            ConversationState::AwaitWalletToDelete => "AWAIT_WALLET_TO_DELETE",
            ConversationState::AwaitAirdropToDelete => "AWAIT_AIRDROP_TO_DELETE",
            ConversationState::AwaitReminderMode => "AWAIT_REMINDER_MODE",
            ConversationState::AwaitReminderDelay => "AWAIT_REMINDER_DELAY",
            ConversationState::AwaitReminderTarget { .. } => "AWAIT_REMINDER_TARGET",
            ConversationState::AwaitReminderToStop => "AWAIT_REMINDER_TO_STOP",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ConversationState::Idle)
    }
}
