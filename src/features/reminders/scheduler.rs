//! # Reminder Scheduler
//!
//! Recurring reminders keyed by `(owner, row)`. Each job is a tokio task
//! ticking on its own interval; every fire re-reads the airdrop table so
//! the notification reflects edits and deletions made after scheduling.
//! Jobs live for the process lifetime only.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Intervals capped at one year
//! - 1.0.0: Initial release with schedule/list/cancel and late-bound rows

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use log::{debug, error, info};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{oneshot, watch};
use tokio::time::MissedTickBehavior;

use super::notifier::Notifier;
use crate::features::store::{AirdropRecord, RecordStore};

/// Fixed cadence for "auto" reminders: four times a day
pub const AUTO_INTERVAL_SECS: i64 = 21_600;

/// Longest accepted interval: 365 days
pub const MAX_INTERVAL_SECS: i64 = 31_536_000;

/// Composite identity of a job: (owner, row reference)
type JobKey = (String, usize);

/// Identifier handed back by [`ReminderScheduler::schedule`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobId(String);

impl JobId {
    fn new(owner: &str, row_ref: usize) -> Self {
        Self(format!("{owner}_reminder_{row_ref}"))
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("reminder interval must be between 1 and {MAX_INTERVAL_SECS} seconds (got {0})")]
    InvalidInterval(i64),
}

/// Snapshot of one scheduled reminder
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReminderInfo {
    pub row_ref: usize,
    pub interval_secs: u64,
    pub next_fire: DateTime<Utc>,
}

struct JobEntry {
    interval_secs: u64,
    next_fire: watch::Receiver<DateTime<Utc>>,
    /// Dropping this ends the job's task before its next fire
    _stop: oneshot::Sender<()>,
}

/// Everything a job needs to render and deliver one reminder
#[derive(Clone)]
struct ReminderTask {
    owner: String,
    row_ref: usize,
    store: RecordStore,
    notifier: Arc<dyn Notifier>,
}

impl ReminderTask {
    async fn fire(&self) {
        let text = match self.store.load_table(&self.owner).await {
            Ok(table) => match table.record(self.row_ref) {
                Some(record) => reminder_text(self.row_ref, &record),
                None => not_found_text(self.row_ref),
            },
            Err(e) => {
                error!(
                    "Reminder row {} for {}: failed to load table: {e}",
                    self.row_ref, self.owner
                );
                "⚠️ Failed to load airdrop data for this reminder.".to_string()
            }
        };

        if let Err(e) = self.notifier.notify(&self.owner, &text).await {
            error!(
                "Failed to deliver reminder row {} to {}: {e}",
                self.row_ref, self.owner
            );
        }
    }
}

/// Table of recurring reminder jobs
#[derive(Clone)]
pub struct ReminderScheduler {
    jobs: Arc<DashMap<JobKey, JobEntry>>,
    store: RecordStore,
    notifier: Arc<dyn Notifier>,
}

impl ReminderScheduler {
    pub fn new(store: RecordStore, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            jobs: Arc::new(DashMap::new()),
            store,
            notifier,
        }
    }

    /// Start a recurring reminder for `row_ref`. Fires immediately, then
    /// every `interval_secs`. Scheduling the same `(owner, row_ref)` again
    /// replaces the previous job.
    pub fn schedule(
        &self,
        owner: &str,
        row_ref: usize,
        interval_secs: i64,
    ) -> Result<JobId, ScheduleError> {
        if !(1..=MAX_INTERVAL_SECS).contains(&interval_secs) {
            return Err(ScheduleError::InvalidInterval(interval_secs));
        }
        let period = interval_secs.unsigned_abs();

        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let (next_tx, next_rx) = watch::channel(Utc::now());
        let task = ReminderTask {
            owner: owner.to_string(),
            row_ref,
            store: self.store.clone(),
            notifier: self.notifier.clone(),
        };

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_secs(period));
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = ticker.tick() => {}
                }
                let _ = next_tx.send(next_fire_after(Utc::now(), period));
                // Not raced against stop: a fire in progress always completes
                task.fire().await;
            }
            debug!("Reminder row {} for {} stopped", task.row_ref, task.owner);
        });

        let replaced = self
            .jobs
            .insert(
                (owner.to_string(), row_ref),
                JobEntry {
                    interval_secs: period,
                    next_fire: next_rx,
                    _stop: stop_tx,
                },
            )
            .is_some();

        let id = JobId::new(owner, row_ref);
        info!(
            "{} reminder {id} every {period}s",
            if replaced { "Replaced" } else { "Scheduled" }
        );
        Ok(id)
    }

    /// Owner's reminders ordered by row
    pub fn list(&self, owner: &str) -> Vec<ReminderInfo> {
        let mut reminders: Vec<ReminderInfo> = self
            .jobs
            .iter()
            .filter(|entry| entry.key().0 == owner)
            .map(|entry| ReminderInfo {
                row_ref: entry.key().1,
                interval_secs: entry.interval_secs,
                next_fire: *entry.next_fire.borrow(),
            })
            .collect();
        reminders.sort_by_key(|r| r.row_ref);
        reminders
    }

    /// Stop a reminder. Returns false if none existed for the pair.
    pub fn cancel(&self, owner: &str, row_ref: usize) -> bool {
        let removed = self.jobs.remove(&(owner.to_string(), row_ref)).is_some();
        if removed {
            info!("Cancelled reminder {}", JobId::new(owner, row_ref));
        }
        removed
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    /// Cancel every job
    pub fn shutdown(&self) {
        let count = self.jobs.len();
        self.jobs.clear();
        if count > 0 {
            info!("Stopped {count} reminder jobs");
        }
    }
}

/// When the tick after `now` is due; saturates instead of overflowing
fn next_fire_after(now: DateTime<Utc>, period_secs: u64) -> DateTime<Utc> {
    i64::try_from(period_secs)
        .ok()
        .and_then(chrono::Duration::try_seconds)
        .and_then(|period| now.checked_add_signed(period))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

fn reminder_text(row_ref: usize, record: &AirdropRecord) -> String {
    format!(
        "📢 **Airdrop Reminder** (row {row_ref})\n\n\
         🔗 **Link:** `{}`\n\
         📝 **Title:** **{}**\n\
         ⚙️ **Type:** **{}**\n\
         💼 **Wallet:** `{}`\n\
         ⏰ **Time:** {}",
        record.link, record.title, record.kind, record.wallet_address, record.timestamp
    )
}

fn not_found_text(row_ref: usize) -> String {
    format!("⚠️ Airdrop data for row {row_ref} was not found.")
}
