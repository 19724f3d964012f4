//! # Rendering
//!
//! Listing text and choice buttons.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Choice menus split into pages
//! - 1.0.0: Initial release

use chrono::Local;

use super::event::{ReminderMode, Selection, WalletKind, AIRDROP_TYPES};
use super::reply::Button;
use crate::features::reminders::ReminderInfo;
use crate::features::store::{AirdropRecord, Table, WalletEntry};

/// Characters of the link shown on a delete button
const LINK_PREVIEW_CHARS: usize = 20;

/// Choices per page: four full action rows, leaving the fifth for paging
pub const CHOICES_PER_PAGE: usize = 20;

pub fn wallet_list(wallets: &[WalletEntry]) -> String {
    if wallets.is_empty() {
        return "⚠️ No wallet address saved yet.".to_string();
    }
    let mut text = String::from("💳 **Saved wallets:**\n");
    for (i, wallet) in wallets.iter().enumerate() {
        text.push_str(&format!("{}. {}\n", i + 1, wallet.label()));
    }
    text
}

fn record_block(position: usize, record: &AirdropRecord) -> String {
    format!(
        "**{position}. {}**\n🔗 {}\n🏷 {}\n💳 {}\n🕒 {}\n",
        record.title, record.link, record.kind, record.wallet_address, record.timestamp
    )
}

pub fn airdrop_list(table: &Table) -> String {
    let records = table.records();
    if records.is_empty() {
        return "⚠️ No airdrop data saved yet.".to_string();
    }
    let mut text = String::from("📊 **Saved airdrops:**\n\n");
    for (position, record) in &records {
        text.push_str(&record_block(*position, record));
        text.push('\n');
    }
    text
}

pub fn reminder_list(reminders: &[ReminderInfo]) -> String {
    if reminders.is_empty() {
        return "⚠️ No active reminders.".to_string();
    }
    let mut text = String::from("⏰ **Active reminders:**\n");
    for reminder in reminders {
        text.push_str(&format!(
            "- Row {} every {} min, next at {}\n",
            reminder.row_ref,
            reminder.interval_secs / 60,
            reminder
                .next_fire
                .with_timezone(&Local)
                .format("%Y-%m-%d %H:%M:%S")
        ));
    }
    text
}

fn preview(link: &str) -> String {
    let mut chars = link.chars();
    let head: String = chars.by_ref().take(LINK_PREVIEW_CHARS).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

pub fn wallet_type_buttons() -> Vec<Button> {
    vec![
        Button::selection(Selection::WalletType(WalletKind::Evm), "EVM"),
        Button::selection(Selection::WalletType(WalletKind::Other), "Other"),
    ]
}

pub fn airdrop_type_buttons() -> Vec<Button> {
    AIRDROP_TYPES
        .iter()
        .map(|kind| Button::selection(Selection::AirdropType(kind.to_string()), *kind))
        .collect()
}

pub fn reminder_mode_buttons() -> Vec<Button> {
    vec![
        Button::selection(Selection::ReminderMode(ReminderMode::Auto), "🤖 Auto (every 6h)"),
        Button::selection(Selection::ReminderMode(ReminderMode::Manual), "✍️ Manual"),
    ]
}

pub fn wallet_choice_buttons(wallets: &[WalletEntry]) -> Vec<Button> {
    wallets
        .iter()
        .enumerate()
        .map(|(i, w)| Button::selection(Selection::Wallet(i), w.label()))
        .collect()
}

pub fn wallet_delete_buttons(wallets: &[WalletEntry]) -> Vec<Button> {
    wallets
        .iter()
        .enumerate()
        .map(|(i, w)| Button::selection(Selection::DeleteWallet(i), format!("❌ {}", w.label())))
        .collect()
}

/// One button per record, labelled `<row>. <title> - <link preview>`
pub fn row_buttons(table: &Table, select: fn(usize) -> Selection) -> Vec<Button> {
    table
        .records()
        .into_iter()
        .map(|(position, record)| {
            Button::selection(
                select(position),
                format!("{position}. {} - {}", record.title, preview(&record.link)),
            )
        })
        .collect()
}

pub fn stop_buttons(reminders: &[ReminderInfo]) -> Vec<Button> {
    reminders
        .iter()
        .map(|r| {
            Button::selection(
                Selection::StopReminder(r.row_ref),
                format!("⏹ Row {}", r.row_ref),
            )
        })
        .collect()
}

/// Number of pages needed for `count` choices (at least one)
pub fn page_count(count: usize) -> usize {
    count.div_ceil(CHOICES_PER_PAGE).max(1)
}

/// One page of `choices` followed by previous/next buttons where they
/// apply. A page past the end shows the last page.
pub fn paged(choices: Vec<Button>, page: usize) -> Vec<Button> {
    let pages = page_count(choices.len());
    let page = page.min(pages - 1);

    let mut buttons: Vec<Button> = choices
        .into_iter()
        .skip(page * CHOICES_PER_PAGE)
        .take(CHOICES_PER_PAGE)
        .collect();
    if page > 0 {
        buttons.push(Button::selection(
            Selection::Page(page - 1),
            format!("⬅️ Page {page}/{pages}"),
        ));
    }
    if page + 1 < pages {
        buttons.push(Button::selection(
            Selection::Page(page + 1),
            format!("Page {}/{pages} ➡️", page + 2),
        ));
    }
    buttons
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_wallet_list_numbers_from_one() {
        let text = wallet_list(&[WalletEntry::new("0xABC", "evm"), WalletEntry::new("bc1q", "btc")]);
        assert!(text.contains("1. 0xABC (EVM)"));
        assert!(text.contains("2. bc1q (BTC)"));
        assert!(wallet_list(&[]).contains("No wallet"));
    }

    #[test]
    fn test_row_buttons_use_positions() {
        let mut table = Table::with_header();
        table.push([
            "T.ME/SOME_VERY_LONG_CHANNEL_NAME".into(),
            "FOO".into(),
            "NODE".into(),
            "0xABC".into(),
            "2024-01-01 00:00:00".into(),
        ]);
        let buttons = row_buttons(&table, Selection::DeleteAirdrop);
        assert_eq!(buttons.len(), 1);
        assert_eq!(buttons[0].custom_id, "delairdrop_2");
        assert_eq!(buttons[0].label, "2. FOO - T.ME/SOME_VERY_LONG_...");
    }

    fn choices(n: usize) -> Vec<Button> {
        (0..n)
            .map(|i| Button::selection(Selection::DeleteWallet(i), format!("w{i}")))
            .collect()
    }

    #[test]
    fn test_short_menu_has_no_paging() {
        let buttons = paged(choices(20), 0);
        assert_eq!(buttons.len(), 20);
        assert!(buttons.iter().all(|b| !b.custom_id.starts_with("page_")));
        assert_eq!(page_count(0), 1);
    }

    #[test]
    fn test_every_choice_is_reachable_across_pages() {
        let all = choices(45);
        assert_eq!(page_count(all.len()), 3);

        let first = paged(all.clone(), 0);
        assert_eq!(first.len(), CHOICES_PER_PAGE + 1);
        assert_eq!(first.last().unwrap().custom_id, "page_1");

        let middle = paged(all.clone(), 1);
        assert_eq!(middle[0].custom_id, "delwallet_20");
        let nav: Vec<&str> = middle[20..].iter().map(|b| b.custom_id.as_str()).collect();
        assert_eq!(nav, vec!["page_0", "page_2"]);

        let last = paged(all.clone(), 2);
        assert_eq!(last.len(), 5 + 1);
        assert_eq!(last[4].custom_id, "delwallet_44");
        assert_eq!(last[5].custom_id, "page_1");

        // Past the end clamps to the last page
        assert_eq!(paged(all, 9), last);
    }

    #[test]
    fn test_reminder_list_shows_minutes() {
        let text = reminder_list(&[ReminderInfo {
            row_ref: 3,
            interval_secs: 300,
            next_fire: Utc::now(),
        }]);
        assert!(text.contains("Row 3 every 5 min"));
    }
}
