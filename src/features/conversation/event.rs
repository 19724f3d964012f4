//! # Inbound Events
//!
//! Menu buttons carry a bare topic id (`add_wallet`); choice buttons carry
//! `<prefix>_<payload>` (`delairdrop_3`). The prefix decides which
//! transition the event can drive.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: `page_<n>` turns long choice menus
//! - 1.0.0: Initial release

pub const WALLET_TYPE_PREFIX: &str = "wallet_type_";
pub const AIRDROP_TYPE_PREFIX: &str = "airdrop_type_";
pub const WALLET_CHOICE_PREFIX: &str = "wallet_";
pub const DELETE_WALLET_PREFIX: &str = "delwallet_";
pub const DELETE_AIRDROP_PREFIX: &str = "delairdrop_";
pub const REMINDER_MODE_PREFIX: &str = "rem_sett_mode_";
pub const REMINDER_TARGET_PREFIX: &str = "rem_sett_choice_";
pub const STOP_REMINDER_PREFIX: &str = "stoprem_";
pub const PAGE_PREFIX: &str = "page_";

/// Accepted airdrop categories
pub const AIRDROP_TYPES: [&str; 4] = ["TESTNET", "AIRDROP", "NODE", "OTHER"];

/// Entry points shown on the main menu (plus `start`)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topic {
    Start,
    AddAirdrop,
    AddWallet,
    DeleteWallet,
    ListWallet,
    ListAirdrop,
    ReminderList,
    ReminderSett,
    StopReminder,
    DownloadData,
    DeleteAirdrop,
}

impl Topic {
    /// Main menu order
    pub const MENU: [Topic; 10] = [
        Topic::AddAirdrop,
        Topic::AddWallet,
        Topic::DeleteWallet,
        Topic::ListWallet,
        Topic::ListAirdrop,
        Topic::ReminderList,
        Topic::ReminderSett,
        Topic::StopReminder,
        Topic::DownloadData,
        Topic::DeleteAirdrop,
    ];

    pub fn id(self) -> &'static str {
        match self {
            Topic::Start => "start",
            Topic::AddAirdrop => "add_airdrop",
            Topic::AddWallet => "add_wallet",
            Topic::DeleteWallet => "delete_wallet",
            Topic::ListWallet => "list_wallet",
            Topic::ListAirdrop => "list_airdrop",
            Topic::ReminderList => "reminder_lst",
            Topic::ReminderSett => "reminder_sett",
            Topic::StopReminder => "stop_reminder",
            Topic::DownloadData => "download_data",
            Topic::DeleteAirdrop => "delete_airdrop",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Topic::Start => "🏠 Menu",
            Topic::AddAirdrop => "✨ Add Airdrop",
            Topic::AddWallet => "💳 Add Wallet",
            Topic::DeleteWallet => "🗑 Delete Wallet",
            Topic::ListWallet => "📋 List Wallet Address",
            Topic::ListAirdrop => "📊 List Airdrop Saved",
            Topic::ReminderList => "⏰ Reminder List",
            Topic::ReminderSett => "⚙️ Reminder Sett",
            Topic::StopReminder => "⏹ Stop Reminder",
            Topic::DownloadData => "📥 Download Data",
            Topic::DeleteAirdrop => "🗑 Delete Airdrop",
        }
    }

    fn from_id(id: &str) -> Option<Self> {
        std::iter::once(Topic::Start)
            .chain(Topic::MENU)
            .find(|topic| topic.id() == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletKind {
    Evm,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReminderMode {
    Auto,
    Manual,
}

/// A button choice made inside a flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    WalletType(WalletKind),
    AirdropType(String),
    /// Index into the wallet list offered for a new airdrop
    Wallet(usize),
    /// Index into the wallet list offered for deletion
    DeleteWallet(usize),
    /// Row position offered for deletion
    DeleteAirdrop(usize),
    ReminderMode(ReminderMode),
    /// Row position to remind about
    ReminderTarget(usize),
    /// Row position whose reminder should stop
    StopReminder(usize),
    /// Zero-based page of the open choice menu
    Page(usize),
}

impl Selection {
    /// Identifier to put on the button that produces this selection
    pub fn custom_id(&self) -> String {
        match self {
            Selection::WalletType(WalletKind::Evm) => format!("{WALLET_TYPE_PREFIX}evm"),
            Selection::WalletType(WalletKind::Other) => format!("{WALLET_TYPE_PREFIX}other"),
            Selection::AirdropType(kind) => {
                format!("{AIRDROP_TYPE_PREFIX}{}", kind.to_lowercase())
            }
            Selection::Wallet(i) => format!("{WALLET_CHOICE_PREFIX}{i}"),
            Selection::DeleteWallet(i) => format!("{DELETE_WALLET_PREFIX}{i}"),
            Selection::DeleteAirdrop(row) => format!("{DELETE_AIRDROP_PREFIX}{row}"),
            Selection::ReminderMode(ReminderMode::Auto) => format!("{REMINDER_MODE_PREFIX}auto"),
            Selection::ReminderMode(ReminderMode::Manual) => {
                format!("{REMINDER_MODE_PREFIX}manual")
            }
            Selection::ReminderTarget(row) => format!("{REMINDER_TARGET_PREFIX}{row}"),
            Selection::StopReminder(row) => format!("{STOP_REMINDER_PREFIX}{row}"),
            Selection::Page(page) => format!("{PAGE_PREFIX}{page}"),
        }
    }

    fn parse(id: &str) -> Option<Self> {
        // Longer prefixes first: "wallet_type_" also starts with "wallet_"
        if let Some(kind) = id.strip_prefix(WALLET_TYPE_PREFIX) {
            return match kind {
                "evm" => Some(Selection::WalletType(WalletKind::Evm)),
                "other" => Some(Selection::WalletType(WalletKind::Other)),
                _ => None,
            };
        }
        if let Some(kind) = id.strip_prefix(AIRDROP_TYPE_PREFIX) {
            let kind = kind.to_uppercase();
            return AIRDROP_TYPES
                .contains(&kind.as_str())
                .then_some(Selection::AirdropType(kind));
        }
        if let Some(mode) = id.strip_prefix(REMINDER_MODE_PREFIX) {
            return match mode {
                "auto" => Some(Selection::ReminderMode(ReminderMode::Auto)),
                "manual" => Some(Selection::ReminderMode(ReminderMode::Manual)),
                _ => None,
            };
        }

        let numbered: [(&str, fn(usize) -> Selection); 6] = [
            (WALLET_CHOICE_PREFIX, Selection::Wallet),
            (DELETE_WALLET_PREFIX, Selection::DeleteWallet),
            (DELETE_AIRDROP_PREFIX, Selection::DeleteAirdrop),
            (REMINDER_TARGET_PREFIX, Selection::ReminderTarget),
            (STOP_REMINDER_PREFIX, Selection::StopReminder),
            (PAGE_PREFIX, Selection::Page),
        ];
        numbered.iter().find_map(|(prefix, build)| {
            id.strip_prefix(prefix)
                .and_then(|payload| payload.parse::<usize>().ok())
                .map(build)
        })
    }
}

/// Everything the conversation engine reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Topic(Topic),
    Text(String),
    Selection(Selection),
}

impl InboundEvent {
    /// Parse a button identifier; `None` for identifiers this bot never issues.
    pub fn from_custom_id(id: &str) -> Option<Self> {
        Topic::from_id(id)
            .map(InboundEvent::Topic)
            .or_else(|| Selection::parse(id).map(InboundEvent::Selection))
    }
}
