//! # Conversation Engine
//!
//! Routes one inbound event against the owner's current state, performs the
//! store or scheduler side effect, and returns the next state plus a reply.
//! Events that match no transition are ignored and leave the session as is.
//! An owner's events are handled one at a time.
//!
//! - **Version**: 1.2.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.2.0: Per-owner turns, paged choice menus, manual delay capped at a year
//! - 1.1.0: Wallet choices validated against the list that was offered
//! - 1.0.0: Initial release

use chrono::Local;
use log::{debug, error, info, warn};
use std::time::Duration;

use super::event::{InboundEvent, ReminderMode, Selection, Topic, WalletKind};
use super::render;
use super::reply::Reply;
use super::session::SessionStore;
use super::state::{AirdropDraft, ConversationState};
use crate::features::reminders::{ReminderScheduler, AUTO_INTERVAL_SECS, MAX_INTERVAL_SECS};
use crate::features::store::{
    RecordStore, StoreError, WalletEntry, TABLE_FILE, TIMESTAMP_FORMAT,
};

/// Longest manual delay, the scheduler's interval cap in minutes
pub const MAX_DELAY_MINUTES: i64 = MAX_INTERVAL_SECS / 60;

const WALLET_DELETE_PROMPT: &str = "🗑 Choose the wallet to delete:";
const AIRDROP_DELETE_PROMPT: &str = "🗑 Choose the airdrop to delete:";
const WALLET_CHOICE_PROMPT: &str = "💳 Choose the wallet used for this airdrop:";
const REMINDER_TARGET_PROMPT: &str = "⏰ Choose the airdrop to be reminded about:";
const STOP_PROMPT: &str = "⏹ Choose the reminder to stop:";

/// Outcome of routing an event
enum Step {
    /// No transition for this (state, event) pair
    Ignored,
    Next(ConversationState, Reply),
}

/// End the flow: back to IDLE with the main menu attached
fn finish(reply: Reply) -> Step {
    Step::Next(ConversationState::Idle, reply.with_menu())
}

fn finish_text(text: impl Into<String>) -> Step {
    finish(Reply::text(text))
}

fn ask(state: ConversationState, reply: Reply) -> Step {
    Step::Next(state, reply)
}

/// Parse a manual reminder delay given in whole minutes into seconds.
/// Accepts `1..=MAX_DELAY_MINUTES`.
pub fn parse_delay_minutes(input: &str) -> Option<i64> {
    input
        .trim()
        .parse::<i64>()
        .ok()
        .filter(|minutes| (1..=MAX_DELAY_MINUTES).contains(minutes))
        .map(|minutes| minutes * 60)
}

fn wallet_choice_menu(draft: AirdropDraft, offered: Vec<WalletEntry>, page: usize) -> Step {
    let buttons = render::paged(render::wallet_choice_buttons(&offered), page);
    ask(
        ConversationState::AwaitWalletChoice { draft, offered },
        Reply::text(WALLET_CHOICE_PROMPT).with_buttons(buttons),
    )
}

pub struct ConversationEngine {
    sessions: SessionStore,
    store: RecordStore,
    scheduler: ReminderScheduler,
    auto_interval_secs: i64,
}

impl ConversationEngine {
    pub fn new(
        store: RecordStore,
        scheduler: ReminderScheduler,
        idle_timeout: Option<Duration>,
    ) -> Self {
        Self {
            sessions: SessionStore::new(idle_timeout),
            store,
            scheduler,
            auto_interval_secs: AUTO_INTERVAL_SECS,
        }
    }

    pub fn with_auto_interval(mut self, secs: i64) -> Self {
        self.auto_interval_secs = secs;
        self
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    pub fn scheduler(&self) -> &ReminderScheduler {
        &self.scheduler
    }

    pub fn state_of(&self, owner: &str) -> ConversationState {
        self.sessions.state(owner)
    }

    /// Handle one event for `owner`. `None` means the event was ignored.
    pub async fn handle(&self, owner: &str, event: InboundEvent) -> Option<Reply> {
        // Held until the next state is stored, so a double press sees the
        // state the first press left behind
        let _turn = self.sessions.begin_turn(owner).await;

        let step = match event {
            // Menu topics are entry points from any state
            InboundEvent::Topic(topic) => {
                if self.sessions.reset(owner) {
                    debug!("{owner}: discarded in-flight flow for {}", topic.id());
                }
                self.enter(owner, topic).await
            }
            other => {
                let state = self.sessions.state(owner);
                let from = state.name();
                let step = self.advance(owner, state, other).await;
                if matches!(step, Step::Ignored) {
                    debug!("{owner}: no transition from {from}, ignoring input");
                }
                step
            }
        };

        match step {
            Step::Ignored => None,
            Step::Next(next, reply) => {
                debug!("{owner}: -> {}", next.name());
                self.sessions.set(owner, next);
                Some(reply)
            }
        }
    }

    // ------------------------------------------------------------------
    // Entry points
    // ------------------------------------------------------------------

    async fn enter(&self, owner: &str, topic: Topic) -> Step {
        use ConversationState as S;

        match topic {
            Topic::Start => finish_text("👋 Welcome to Airdrop Keeper! Choose an action:"),
            Topic::AddWallet => ask(
                S::AwaitWalletAddress,
                Reply::text("💳 Send the WALLET ADDRESS you want to save:"),
            ),
            Topic::AddAirdrop => ask(
                S::AwaitAirdropLink,
                Reply::text("📎 Send the TELEGRAM LINK of the airdrop:"),
            ),
            Topic::DeleteWallet => self.wallet_delete_menu(owner, 0).await,
            Topic::DeleteAirdrop => self.airdrop_delete_menu(owner, 0).await,
            Topic::ListWallet => {
                let wallets = self.store.load_wallets(owner).await;
                finish_text(render::wallet_list(&wallets))
            }
            Topic::ListAirdrop => match self.store.load_table(owner).await {
                Ok(table) => finish_text(render::airdrop_list(&table)),
                Err(e) => store_failure(owner, "load airdrops", e),
            },
            Topic::ReminderSett => ask(
                S::AwaitReminderMode,
                Reply::text("⚙️ Choose the reminder mode:")
                    .with_buttons(render::reminder_mode_buttons()),
            ),
            Topic::ReminderList => finish_text(render::reminder_list(&self.scheduler.list(owner))),
            Topic::StopReminder => self.stop_menu(owner, 0),
            Topic::DownloadData => match self.store.export_table(owner).await {
                Ok(bytes) => {
                    info!("{owner}: exported airdrop table ({} bytes)", bytes.len());
                    finish(
                        Reply::text("📥 Here is your airdrop data:")
                            .with_attachment(TABLE_FILE, bytes),
                    )
                }
                Err(e) => store_failure(owner, "export airdrops", e),
            },
        }
    }

    // ------------------------------------------------------------------
    // In-flow transitions
    // ------------------------------------------------------------------

    async fn advance(&self, owner: &str, state: ConversationState, event: InboundEvent) -> Step {
        use ConversationState as S;
        use InboundEvent as E;
        use Selection as Sel;

        if let E::Text(text) = &event {
            if text.trim().is_empty() {
                return Step::Ignored;
            }
        }

        match (state, event) {
            (S::AwaitWalletAddress, E::Text(address)) => ask(
                S::AwaitWalletType {
                    address: address.trim().to_string(),
                },
                Reply::text("🔗 Choose the wallet type:")
                    .with_buttons(render::wallet_type_buttons()),
            ),
            (S::AwaitWalletType { address }, E::Selection(Sel::WalletType(WalletKind::Evm))) => {
                self.save_wallet(owner, &address, "EVM").await
            }
            (S::AwaitWalletType { address }, E::Selection(Sel::WalletType(WalletKind::Other))) => {
                ask(
                    S::AwaitChainName { address },
                    Reply::text("⛓ Send the CHAIN name (e.g. SOLANA, BTC):"),
                )
            }
            (S::AwaitChainName { address }, E::Text(chain)) => {
                self.save_wallet(owner, &address, &chain).await
            }

            (S::AwaitAirdropLink, E::Text(link)) => ask(
                S::AwaitAirdropTitle {
                    link: link.trim().to_uppercase(),
                },
                Reply::text("📝 Send the TITLE of the airdrop:"),
            ),
            (S::AwaitAirdropTitle { link }, E::Text(title)) => ask(
                S::AwaitAirdropType {
                    link,
                    title: title.trim().to_uppercase(),
                },
                Reply::text("🏷 Choose the airdrop type:")
                    .with_buttons(render::airdrop_type_buttons()),
            ),
            (S::AwaitAirdropType { link, title }, E::Selection(Sel::AirdropType(kind))) => {
                self.offer_wallets(owner, AirdropDraft { link, title, kind })
                    .await
            }
            (S::AwaitWalletChoice { draft, offered }, E::Selection(Sel::Wallet(index))) => {
                self.save_airdrop(owner, draft, offered, index).await
            }

            (S::AwaitWalletToDelete, E::Selection(Sel::DeleteWallet(index))) => {
                match self.store.remove_wallet_at(owner, index).await {
                    Ok(Some(wallet)) => {
                        finish_text(format!("✅ Wallet {} deleted.", wallet.label()))
                    }
                    Ok(None) => finish_text("⚠️ That wallet no longer exists."),
                    Err(e) => store_failure(owner, "delete wallet", e),
                }
            }
            (S::AwaitAirdropToDelete, E::Selection(Sel::DeleteAirdrop(position))) => {
                match self.store.delete_row(owner, position).await {
                    Ok(Some(record)) => {
                        finish_text(format!("✅ Airdrop \"{}\" deleted.", record.title))
                    }
                    Ok(None) => finish_text(format!("✅ Row {position} deleted.")),
                    Err(e) => store_failure(owner, "delete airdrop", e),
                }
            }

            (S::AwaitReminderMode, E::Selection(Sel::ReminderMode(ReminderMode::Auto))) => {
                self.reminder_target_menu(
                    owner,
                    self.auto_interval_secs,
                    Some("🤖 Auto mode: reminders repeat every 6 hours."),
                    0,
                )
                .await
            }
            (S::AwaitReminderMode, E::Selection(Sel::ReminderMode(ReminderMode::Manual))) => ask(
                S::AwaitReminderDelay,
                Reply::text("⏱ Send the reminder interval in minutes:"),
            ),
            (S::AwaitReminderDelay, E::Text(text)) => match parse_delay_minutes(&text) {
                Some(interval_secs) => {
                    self.reminder_target_menu(
                        owner,
                        interval_secs,
                        Some("✍️ Manual mode selected."),
                        0,
                    )
                    .await
                }
                None => finish_text(format!(
                    "⚠️ The interval must be a positive whole number of minutes, \
                     at most {MAX_DELAY_MINUTES} (one year)."
                )),
            },
            (S::AwaitReminderTarget { interval_secs }, E::Selection(Sel::ReminderTarget(row))) => {
                match self.scheduler.schedule(owner, row, interval_secs) {
                    Ok(_) => finish_text(format!(
                        "✅ Reminder set for row {row}, every {} minutes.",
                        interval_secs / 60
                    )),
                    Err(e) => {
                        warn!("{owner}: rejected reminder for row {row}: {e}");
                        finish_text(format!("⚠️ {e}"))
                    }
                }
            }
            (S::AwaitReminderToStop, E::Selection(Sel::StopReminder(row))) => {
                if self.scheduler.cancel(owner, row) {
                    finish_text(format!("✅ Reminder for row {row} stopped."))
                } else {
                    finish_text(format!("⚠️ No reminder found for row {row}."))
                }
            }

            (state, E::Selection(Sel::Page(page))) => self.turn_page(owner, state, page).await,

            _ => Step::Ignored,
        }
    }

    // ------------------------------------------------------------------
    // Choice menus
    // ------------------------------------------------------------------

    /// Re-render the open choice menu at `page`; other states ignore paging.
    async fn turn_page(&self, owner: &str, state: ConversationState, page: usize) -> Step {
        use ConversationState as S;

        match state {
            S::AwaitWalletChoice { draft, offered } => wallet_choice_menu(draft, offered, page),
            S::AwaitWalletToDelete => self.wallet_delete_menu(owner, page).await,
            S::AwaitAirdropToDelete => self.airdrop_delete_menu(owner, page).await,
            S::AwaitReminderTarget { interval_secs } => {
                self.reminder_target_menu(owner, interval_secs, None, page)
                    .await
            }
            S::AwaitReminderToStop => self.stop_menu(owner, page),
            _ => Step::Ignored,
        }
    }

    async fn wallet_delete_menu(&self, owner: &str, page: usize) -> Step {
        let wallets = self.store.load_wallets(owner).await;
        if wallets.is_empty() {
            return finish_text("⚠️ No wallet address saved yet.");
        }
        ask(
            ConversationState::AwaitWalletToDelete,
            Reply::text(WALLET_DELETE_PROMPT)
                .with_buttons(render::paged(render::wallet_delete_buttons(&wallets), page)),
        )
    }

    async fn airdrop_delete_menu(&self, owner: &str, page: usize) -> Step {
        match self.store.load_table(owner).await {
            Ok(table) if table.is_empty() => finish_text("⚠️ No airdrop data saved yet."),
            Ok(table) => ask(
                ConversationState::AwaitAirdropToDelete,
                Reply::text(AIRDROP_DELETE_PROMPT).with_buttons(render::paged(
                    render::row_buttons(&table, Selection::DeleteAirdrop),
                    page,
                )),
            ),
            Err(e) => store_failure(owner, "load airdrops", e),
        }
    }

    async fn reminder_target_menu(
        &self,
        owner: &str,
        interval_secs: i64,
        intro: Option<&str>,
        page: usize,
    ) -> Step {
        let prompt = match intro {
            Some(intro) => format!("{intro}\n{REMINDER_TARGET_PROMPT}"),
            None => REMINDER_TARGET_PROMPT.to_string(),
        };
        match self.store.load_table(owner).await {
            Ok(table) if table.is_empty() => finish_text("⚠️ No airdrop data saved yet."),
            Ok(table) => ask(
                ConversationState::AwaitReminderTarget { interval_secs },
                Reply::text(prompt).with_buttons(render::paged(
                    render::row_buttons(&table, Selection::ReminderTarget),
                    page,
                )),
            ),
            Err(e) => store_failure(owner, "load airdrops", e),
        }
    }

    fn stop_menu(&self, owner: &str, page: usize) -> Step {
        let reminders = self.scheduler.list(owner);
        if reminders.is_empty() {
            return finish_text("⚠️ No active reminders.");
        }
        ask(
            ConversationState::AwaitReminderToStop,
            Reply::text(STOP_PROMPT)
                .with_buttons(render::paged(render::stop_buttons(&reminders), page)),
        )
    }

    // ------------------------------------------------------------------
    // Side effects
    // ------------------------------------------------------------------

    async fn save_wallet(&self, owner: &str, address: &str, chain: &str) -> Step {
        match self.store.append_wallet(owner, address, chain).await {
            Ok(entry) => finish_text(format!("✅ Wallet {} saved.", entry.label())),
            Err(e) => store_failure(owner, "save wallet", e),
        }
    }

    async fn offer_wallets(&self, owner: &str, draft: AirdropDraft) -> Step {
        let wallets = self.store.load_wallets(owner).await;
        if wallets.is_empty() {
            return finish_text("⚠️ No wallet address saved yet. Add a wallet first.");
        }
        wallet_choice_menu(draft, wallets, 0)
    }

    async fn save_airdrop(
        &self,
        owner: &str,
        draft: AirdropDraft,
        offered: Vec<WalletEntry>,
        index: usize,
    ) -> Step {
        let current = self.store.load_wallets(owner).await;
        if current != offered {
            info!("{owner}: wallet list changed since the choice was offered");
            return finish_text("⚠️ Your wallet list changed meanwhile. Please try again.");
        }
        let Some(wallet) = current.get(index) else {
            return finish_text("⚠️ Invalid wallet choice.");
        };

        let timestamp = Local::now().format(TIMESTAMP_FORMAT).to_string();
        let title = draft.title.clone();
        let cells = [
            draft.link,
            draft.title,
            draft.kind,
            wallet.address.clone(),
            timestamp,
        ];
        match self.store.append_row(owner, cells).await {
            Ok(position) => finish_text(format!(
                "✅ Airdrop \"{title}\" saved as row {position}."
            )),
            Err(e) => store_failure(owner, "save airdrop", e),
        }
    }
}

/// Map a store error onto a user reply and end the flow
fn store_failure(owner: &str, action: &str, e: StoreError) -> Step {
    if e.is_conflict() {
        warn!("{owner}: failed to {action} after retry: {e}");
        finish_text("⚠️ The data was changed at the same time. Please try again.")
    } else if e.is_validation() {
        info!("{owner}: failed to {action}: {e}");
        finish_text(format!("⚠️ {e}"))
    } else {
        error!("{owner}: failed to {action}: {e}");
        finish_text("❌ Something went wrong with the data storage. Please try again later.")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::reminders::Notifier;
    use crate::features::store::{Backend, MemoryBackend, ObjectKey, StoredObject, VersionToken};
    use async_trait::async_trait;
    use std::sync::Arc;

    const OWNER: &str = "42";

    struct SilentNotifier;

    #[async_trait]
    impl Notifier for SilentNotifier {
        async fn notify(&self, _owner: &str, _text: &str) -> anyhow::Result<()> {
            Ok(())
        }
    }

    /// Memory backend whose reads take `delay`
    struct Slow {
        inner: MemoryBackend,
        delay: Duration,
    }

    #[async_trait]
    impl Backend for Slow {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn read(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError> {
            tokio::time::sleep(self.delay).await;
            self.inner.read(key).await
        }

        async fn write(
            &self,
            key: &ObjectKey,
            bytes: Vec<u8>,
            expected: Option<&VersionToken>,
        ) -> Result<VersionToken, StoreError> {
            self.inner.write(key, bytes, expected).await
        }
    }

    fn engine_on(backend: Arc<dyn Backend>, call_timeout: Duration) -> ConversationEngine {
        let store = RecordStore::new(backend, call_timeout);
        let scheduler = ReminderScheduler::new(store.clone(), Arc::new(SilentNotifier));
        ConversationEngine::new(store, scheduler, None)
    }

    fn engine() -> ConversationEngine {
        engine_on(Arc::new(MemoryBackend::new()), Duration::from_secs(5))
    }

    fn slow_engine(delay: Duration) -> ConversationEngine {
        let backend = Slow {
            inner: MemoryBackend::new(),
            delay,
        };
        engine_on(Arc::new(backend), Duration::from_secs(5))
    }

    fn row(title: &str) -> [String; 5] {
        [
            "T.ME/X".to_string(),
            title.to_string(),
            "TESTNET".to_string(),
            "0xABC".to_string(),
            "2024-05-01 10:00:00".to_string(),
        ]
    }

    fn draft() -> AirdropDraft {
        AirdropDraft {
            link: "T.ME/X".into(),
            title: "FOO".into(),
            kind: "NODE".into(),
        }
    }

    fn text(s: &str) -> InboundEvent {
        InboundEvent::Text(s.to_string())
    }

    fn pick(selection: Selection) -> InboundEvent {
        InboundEvent::Selection(selection)
    }

    async fn add_wallet(engine: &ConversationEngine, address: &str) {
        engine.handle(OWNER, InboundEvent::Topic(Topic::AddWallet)).await;
        engine.handle(OWNER, text(address)).await;
        engine
            .handle(OWNER, pick(Selection::WalletType(WalletKind::Evm)))
            .await;
    }

    #[test]
    fn test_parse_delay_minutes() {
        assert_eq!(parse_delay_minutes("5"), Some(300));
        assert_eq!(parse_delay_minutes(" 90 "), Some(5400));
        assert_eq!(parse_delay_minutes("0"), None);
        assert_eq!(parse_delay_minutes("-3"), None);
        assert_eq!(parse_delay_minutes("soon"), None);
        assert_eq!(parse_delay_minutes("1.5"), None);
        assert_eq!(parse_delay_minutes("525600"), Some(31_536_000));
        assert_eq!(parse_delay_minutes("525601"), None);
        assert_eq!(parse_delay_minutes("99999999999999"), None);
    }

    #[tokio::test]
    async fn test_delay_past_one_year_is_rejected() {
        let engine = engine();
        engine.store.append_row(OWNER, row("FOO")).await.unwrap();
        engine.handle(OWNER, InboundEvent::Topic(Topic::ReminderSett)).await;
        engine
            .handle(OWNER, pick(Selection::ReminderMode(ReminderMode::Manual)))
            .await;

        let reply = engine.handle(OWNER, text("99999999999999")).await.unwrap();
        assert!(reply.text.contains("at most 525600"));
        assert!(engine.state_of(OWNER).is_idle());
        assert_eq!(engine.scheduler.job_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_press_deletes_one_wallet() {
        let engine = slow_engine(Duration::from_millis(20));
        engine.store.append_wallet(OWNER, "0xA", "evm").await.unwrap();
        engine.store.append_wallet(OWNER, "0xB", "evm").await.unwrap();
        engine.sessions.set(OWNER, ConversationState::AwaitWalletToDelete);

        let (first, second) = tokio::join!(
            engine.handle(OWNER, pick(Selection::DeleteWallet(0))),
            engine.handle(OWNER, pick(Selection::DeleteWallet(0))),
        );

        // Whichever press runs second finds the flow already finished
        let replies: Vec<Reply> = [first, second].into_iter().flatten().collect();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("0xA (EVM) deleted"));
        assert_eq!(
            engine.store.load_wallets(OWNER).await,
            vec![WalletEntry::new("0xB", "evm")]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_press_saves_one_airdrop() {
        let engine = slow_engine(Duration::from_millis(20));
        engine.store.append_wallet(OWNER, "0xA", "evm").await.unwrap();
        engine.sessions.set(
            OWNER,
            ConversationState::AwaitWalletChoice {
                draft: draft(),
                offered: vec![WalletEntry::new("0xA", "evm")],
            },
        );

        let (first, second) = tokio::join!(
            engine.handle(OWNER, pick(Selection::Wallet(0))),
            engine.handle(OWNER, pick(Selection::Wallet(0))),
        );

        let replies: Vec<Reply> = [first, second].into_iter().flatten().collect();
        assert_eq!(replies.len(), 1);
        assert!(replies[0].text.contains("saved as row 2"));
        assert_eq!(engine.store.load_table(OWNER).await.unwrap().data_len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_timeout_gets_generic_failure() {
        let backend = Slow {
            inner: MemoryBackend::new(),
            delay: Duration::from_secs(60),
        };
        let engine = engine_on(Arc::new(backend), Duration::from_secs(1));

        let reply = engine
            .handle(OWNER, InboundEvent::Topic(Topic::ListAirdrop))
            .await
            .unwrap();
        assert!(reply.text.contains("Something went wrong with the data storage"));
        assert!(reply.has_menu());
        assert!(engine.state_of(OWNER).is_idle());
    }

    #[tokio::test]
    async fn test_long_delete_menu_pages_to_every_row() {
        let engine = engine();
        for i in 0..30 {
            engine.store.append_row(OWNER, row(&format!("R{i}"))).await.unwrap();
        }

        let menu = engine
            .handle(OWNER, InboundEvent::Topic(Topic::DeleteAirdrop))
            .await
            .unwrap();
        assert_eq!(menu.buttons.len(), render::CHOICES_PER_PAGE + 1);
        assert_eq!(menu.buttons.last().unwrap().custom_id, "page_1");

        let page = engine.handle(OWNER, pick(Selection::Page(1))).await.unwrap();
        assert_eq!(engine.state_of(OWNER), ConversationState::AwaitAirdropToDelete);
        let ids: Vec<&str> = page.buttons.iter().map(|b| b.custom_id.as_str()).collect();
        assert!(ids.contains(&"delairdrop_31"));
        assert_eq!(ids.last(), Some(&"page_0"));

        let reply = engine
            .handle(OWNER, pick(Selection::DeleteAirdrop(31)))
            .await
            .unwrap();
        assert!(reply.text.contains("\"R29\" deleted"));
    }

    #[tokio::test]
    async fn test_long_wallet_choice_pages_keep_the_offer() {
        let engine = engine();
        for i in 0..26 {
            add_wallet(&engine, &format!("0x{i:02}")).await;
        }
        engine.handle(OWNER, InboundEvent::Topic(Topic::AddAirdrop)).await;
        engine.handle(OWNER, text("t.me/x")).await;
        engine.handle(OWNER, text("foo")).await;
        engine
            .handle(OWNER, pick(Selection::AirdropType("NODE".into())))
            .await;

        let page = engine.handle(OWNER, pick(Selection::Page(1))).await.unwrap();
        assert_eq!(page.buttons[5].custom_id, "wallet_25");
        assert!(matches!(
            engine.state_of(OWNER),
            ConversationState::AwaitWalletChoice { ref offered, .. } if offered.len() == 26
        ));

        let saved = engine.handle(OWNER, pick(Selection::Wallet(25))).await.unwrap();
        assert!(saved.text.contains("saved as row 2"));
        let table = engine.store.load_table(OWNER).await.unwrap();
        assert_eq!(table.record(2).unwrap().wallet_address, "0x25");
    }

    #[tokio::test]
    async fn test_page_outside_a_menu_is_ignored() {
        let engine = engine();
        assert!(engine.handle(OWNER, pick(Selection::Page(1))).await.is_none());

        engine.handle(OWNER, InboundEvent::Topic(Topic::AddWallet)).await;
        assert!(engine.handle(OWNER, pick(Selection::Page(1))).await.is_none());
        assert_eq!(engine.state_of(OWNER), ConversationState::AwaitWalletAddress);
    }

    #[tokio::test]
    async fn test_add_wallet_other_chain() {
        let engine = engine();
        engine.handle(OWNER, InboundEvent::Topic(Topic::AddWallet)).await;
        engine.handle(OWNER, text("  So1anaAddr ")).await;
        let reply = engine
            .handle(OWNER, pick(Selection::WalletType(WalletKind::Other)))
            .await
            .unwrap();
        assert!(reply.text.contains("CHAIN"));
        assert_eq!(
            engine.state_of(OWNER),
            ConversationState::AwaitChainName {
                address: "So1anaAddr".into()
            }
        );

        let reply = engine.handle(OWNER, text("solana")).await.unwrap();
        assert!(reply.text.contains("So1anaAddr (SOLANA)"));
        assert!(reply.has_menu());
        assert!(engine.state_of(OWNER).is_idle());
    }

    #[tokio::test]
    async fn test_unmatched_input_is_ignored() {
        let engine = engine();
        assert!(engine.handle(OWNER, text("hello")).await.is_none());

        engine.handle(OWNER, InboundEvent::Topic(Topic::AddAirdrop)).await;
        let stray = engine
            .handle(OWNER, pick(Selection::DeleteWallet(0)))
            .await;
        assert!(stray.is_none());
        assert_eq!(engine.state_of(OWNER), ConversationState::AwaitAirdropLink);
    }

    #[tokio::test]
    async fn test_topic_discards_in_flight_flow() {
        let engine = engine();
        engine.handle(OWNER, InboundEvent::Topic(Topic::AddAirdrop)).await;
        engine.handle(OWNER, text("t.me/x")).await;
        engine.handle(OWNER, InboundEvent::Topic(Topic::ReminderSett)).await;
        assert_eq!(engine.state_of(OWNER), ConversationState::AwaitReminderMode);
    }

    #[tokio::test]
    async fn test_airdrop_without_wallets_is_rejected() {
        let engine = engine();
        engine.handle(OWNER, InboundEvent::Topic(Topic::AddAirdrop)).await;
        engine.handle(OWNER, text("t.me/x")).await;
        engine.handle(OWNER, text("foo")).await;
        let reply = engine
            .handle(OWNER, pick(Selection::AirdropType("TESTNET".into())))
            .await
            .unwrap();
        assert!(reply.text.contains("Add a wallet first"));
        assert!(engine.state_of(OWNER).is_idle());
    }

    #[tokio::test]
    async fn test_wallet_choice_rejected_when_list_changed() {
        let engine = engine();
        add_wallet(&engine, "0xA").await;
        add_wallet(&engine, "0xB").await;

        engine.handle(OWNER, InboundEvent::Topic(Topic::AddAirdrop)).await;
        engine.handle(OWNER, text("t.me/x")).await;
        engine.handle(OWNER, text("foo")).await;
        engine
            .handle(OWNER, pick(Selection::AirdropType("NODE".into())))
            .await;

        // Wallet 0 removed behind the open choice menu
        engine.store.remove_wallet_at(OWNER, 0).await.unwrap();

        let reply = engine
            .handle(OWNER, pick(Selection::Wallet(0)))
            .await
            .unwrap();
        assert!(reply.text.contains("changed"));
        assert!(engine.store.load_table(OWNER).await.unwrap().is_empty());
        assert!(engine.state_of(OWNER).is_idle());
    }

    #[tokio::test]
    async fn test_wallet_choice_out_of_range() {
        let engine = engine();
        add_wallet(&engine, "0xA").await;
        engine.handle(OWNER, InboundEvent::Topic(Topic::AddAirdrop)).await;
        engine.handle(OWNER, text("t.me/x")).await;
        engine.handle(OWNER, text("foo")).await;
        engine
            .handle(OWNER, pick(Selection::AirdropType("NODE".into())))
            .await;

        let reply = engine
            .handle(OWNER, pick(Selection::Wallet(5)))
            .await
            .unwrap();
        assert!(reply.text.contains("Invalid wallet"));
    }

    #[tokio::test]
    async fn test_invalid_delay_returns_to_idle() {
        let engine = engine();
        engine.handle(OWNER, InboundEvent::Topic(Topic::ReminderSett)).await;
        engine
            .handle(OWNER, pick(Selection::ReminderMode(ReminderMode::Manual)))
            .await;
        let reply = engine.handle(OWNER, text("abc")).await.unwrap();
        assert!(reply.text.contains("positive whole number"));
        assert!(engine.state_of(OWNER).is_idle());
    }

    #[tokio::test]
    async fn test_delete_header_row_is_validation_error() {
        let engine = engine();
        engine.store.load_table(OWNER).await.unwrap();
        engine.sessions.set(OWNER, ConversationState::AwaitAirdropToDelete);
        let reply = engine
            .handle(OWNER, pick(Selection::DeleteAirdrop(1)))
            .await
            .unwrap();
        assert!(reply.text.contains("invalid row position 1"));
        assert!(engine.state_of(OWNER).is_idle());
    }

    #[tokio::test]
    async fn test_stop_reminder_flow() {
        let engine = engine();
        assert!(engine
            .handle(OWNER, InboundEvent::Topic(Topic::StopReminder))
            .await
            .unwrap()
            .text
            .contains("No active reminders"));

        engine.scheduler.schedule(OWNER, 2, 600).unwrap();
        let reply = engine
            .handle(OWNER, InboundEvent::Topic(Topic::StopReminder))
            .await
            .unwrap();
        assert_eq!(reply.buttons[0].custom_id, "stoprem_2");

        engine
            .handle(OWNER, pick(Selection::StopReminder(2)))
            .await
            .unwrap();
        assert_eq!(engine.scheduler.job_count(), 0);
    }

    #[tokio::test]
    async fn test_download_attaches_table() {
        let engine = engine();
        let reply = engine
            .handle(OWNER, InboundEvent::Topic(Topic::DownloadData))
            .await
            .unwrap();
        let attachment = reply.attachment.unwrap();
        assert_eq!(attachment.filename, TABLE_FILE);
        let table: serde_json::Value = serde_json::from_slice(&attachment.bytes).unwrap();
        assert_eq!(table["rows"][0][0], "LINK");
    }
}
