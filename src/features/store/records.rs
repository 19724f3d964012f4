//! # Record Store
//!
//! Wallet and airdrop-table operations on top of a [`Backend`]. Backends
//! only offer whole-object reads and writes, so every mutation is
//! read-modify-write: read the object and its version token, apply the
//! change, write back with the token. A conflicting write is retried once
//! against a fresh read; a second conflict is reported, never overwritten.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//!
//! ## Changelog
//! - 1.1.0: Wallet removal retries relocate the chosen wallet
//! - 1.0.0: Initial release

use log::{debug, info, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

use super::backend::{Backend, ObjectKey, StoredObject, VersionToken};
use super::error::StoreError;
use super::model::{AirdropRecord, Table, WalletBook, WalletEntry};

pub const WALLET_FILE: &str = "wallet_address.json";
pub const TABLE_FILE: &str = "airdrop_data.json";

/// One initial attempt plus one retry after a conflict
const MAX_WRITE_ATTEMPTS: usize = 2;

/// Result of applying a mutation to a freshly read object
enum Edit<R> {
    /// Write the modified object back
    Commit(R),
    /// Nothing changed; skip the write
    Skip(R),
}

/// Uniform access to the wallet dataset and the airdrop table
#[derive(Clone)]
pub struct RecordStore {
    backend: Arc<dyn Backend>,
    call_timeout: Duration,
}

impl RecordStore {
    pub fn new(backend: Arc<dyn Backend>, call_timeout: Duration) -> Self {
        Self {
            backend,
            call_timeout,
        }
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.name()
    }

    // ------------------------------------------------------------------
    // Wallets
    // ------------------------------------------------------------------

    /// Owner's wallets in insertion order. Unreadable or absent data is an
    /// empty list; this never fails the caller.
    pub async fn load_wallets(&self, owner: &str) -> Vec<WalletEntry> {
        let key = ObjectKey::new(owner, WALLET_FILE);
        match self.read_decoded::<WalletBook>(&key).await {
            Ok(Some((mut book, _))) => book.remove(owner).unwrap_or_default(),
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Treating wallets of {owner} as empty: {e}");
                Vec::new()
            }
        }
    }

    /// Append a wallet (address trimmed, chain upper-cased); creates the
    /// dataset if it does not exist yet.
    pub async fn append_wallet(
        &self,
        owner: &str,
        address: &str,
        chain: &str,
    ) -> Result<WalletEntry, StoreError> {
        let key = ObjectKey::new(owner, WALLET_FILE);
        let entry = WalletEntry::new(address, chain);
        self.mutate(&key, |book: &mut WalletBook| {
            book.entry(owner.to_string()).or_default().push(entry.clone());
            Ok(Edit::Commit(()))
        })
        .await?;
        info!("Saved wallet {} for {owner}", entry.label());
        Ok(entry)
    }

    /// Remove the wallet at `index`; an out-of-range index is a no-op.
    ///
    /// If the write conflicts, the retry removes the same wallet wherever it
    /// now sits, or nothing if another writer already removed it.
    pub async fn remove_wallet_at(
        &self,
        owner: &str,
        index: usize,
    ) -> Result<Option<WalletEntry>, StoreError> {
        let key = ObjectKey::new(owner, WALLET_FILE);
        let mut target: Option<WalletEntry> = None;

        let removed = self
            .mutate(&key, |book: &mut WalletBook| {
                let Some(wallets) = book.get_mut(owner) else {
                    return Ok(Edit::Skip(None));
                };
                let at = match &target {
                    None => Some(index),
                    Some(entry) if wallets.get(index) == Some(entry) => Some(index),
                    Some(entry) => wallets.iter().position(|w| w == entry),
                };
                match at {
                    Some(at) if at < wallets.len() => {
                        let entry = wallets.remove(at);
                        target = Some(entry.clone());
                        Ok(Edit::Commit(Some(entry)))
                    }
                    _ => Ok(Edit::Skip(None)),
                }
            })
            .await?;
        if let Some(entry) = &removed {
            info!("Removed wallet {} for {owner}", entry.label());
        }
        Ok(removed)
    }

    // ------------------------------------------------------------------
    // Airdrop table
    // ------------------------------------------------------------------

    /// Current table; the first call for an owner creates a header-only table.
    pub async fn load_table(&self, owner: &str) -> Result<Table, StoreError> {
        let key = ObjectKey::new(owner, TABLE_FILE);
        if let Some((table, _)) = self.read_decoded::<Table>(&key).await? {
            return Ok(table);
        }

        let fresh = Table::with_header();
        match self.write(&key, encode(&key, &fresh)?, None).await {
            Ok(_) => {
                info!("Created empty airdrop table for {owner}");
                Ok(fresh)
            }
            Err(e) if e.is_conflict() => {
                // Another writer created it between our read and write
                debug!("Table for {owner} appeared concurrently, re-reading");
                Ok(self
                    .read_decoded::<Table>(&key)
                    .await?
                    .map(|(table, _)| table)
                    .unwrap_or(fresh))
            }
            Err(e) => Err(e),
        }
    }

    /// Append a record at the end, returning its row position.
    pub async fn append_row(&self, owner: &str, cells: [String; 5]) -> Result<usize, StoreError> {
        let key = ObjectKey::new(owner, TABLE_FILE);
        let position = self
            .mutate(&key, |table: &mut Table| Ok(Edit::Commit(table.push(cells.clone()))))
            .await?;
        info!("Appended airdrop row {position} for {owner}");
        Ok(position)
    }

    /// Delete the record at `position`. The header (position 1) and positions
    /// past the last row are rejected without touching the table.
    ///
    /// If the write conflicts, the retry deletes the same record, located
    /// again in the fresh table, rather than whatever now sits at `position`.
    pub async fn delete_row(
        &self,
        owner: &str,
        position: usize,
    ) -> Result<Option<AirdropRecord>, StoreError> {
        let key = ObjectKey::new(owner, TABLE_FILE);
        let mut target: Option<Vec<String>> = None;

        let removed = self
            .mutate(&key, |table: &mut Table| {
                let at = match &target {
                    None => position,
                    Some(cells) if table.cells(position) == Some(cells.as_slice()) => position,
                    Some(cells) => table
                        .position_of(cells)
                        .ok_or(StoreError::RowGone { position })?,
                };
                let cells = table.remove(at).ok_or(StoreError::InvalidPosition {
                    position,
                    max_row: table.max_row(),
                })?;
                target = Some(cells.clone());
                Ok(Edit::Commit(cells))
            })
            .await?;

        info!("Deleted airdrop row {position} for {owner}");
        Ok(AirdropRecord::from_cells(&removed))
    }

    /// Raw table object for export
    pub async fn export_table(&self, owner: &str) -> Result<Vec<u8>, StoreError> {
        let key = ObjectKey::new(owner, TABLE_FILE);
        let table = self.load_table(owner).await?;
        encode(&key, &table)
    }

    // ------------------------------------------------------------------
    // Plumbing
    // ------------------------------------------------------------------

    async fn read(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError> {
        timeout(self.call_timeout, self.backend.read(key))
            .await
            .map_err(|_| StoreError::Timeout(self.call_timeout))?
    }

    async fn write(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        timeout(self.call_timeout, self.backend.write(key, bytes, expected))
            .await
            .map_err(|_| StoreError::Timeout(self.call_timeout))?
    }

    async fn read_decoded<T: DeserializeOwned>(
        &self,
        key: &ObjectKey,
    ) -> Result<Option<(T, VersionToken)>, StoreError> {
        match self.read(key).await? {
            Some(object) => Ok(Some((decode(key, &object.bytes)?, object.version))),
            None => Ok(None),
        }
    }

    /// Read-modify-write with a single retry on version conflict.
    ///
    /// `apply` runs once per attempt against freshly read data, so it must
    /// express the logical change, not a precomputed result.
    async fn mutate<T, R, F>(&self, key: &ObjectKey, mut apply: F) -> Result<R, StoreError>
    where
        T: Default + Serialize + DeserializeOwned + Send,
        F: FnMut(&mut T) -> Result<Edit<R>, StoreError> + Send,
        R: Send,
    {
        let mut attempt = 1;
        loop {
            let (mut value, version) = match self.read_decoded::<T>(key).await? {
                Some((value, version)) => (value, Some(version)),
                None => (T::default(), None),
            };

            let outcome = match apply(&mut value)? {
                Edit::Commit(outcome) => outcome,
                Edit::Skip(outcome) => return Ok(outcome),
            };

            match self.write(key, encode(key, &value)?, version.as_ref()).await {
                Ok(_) => return Ok(outcome),
                Err(e) if e.is_conflict() && attempt < MAX_WRITE_ATTEMPTS => {
                    warn!(
                        "Write conflict on {key} via {} backend, retrying with a fresh read",
                        self.backend.name()
                    );
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

fn decode<T: DeserializeOwned>(key: &ObjectKey, bytes: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(bytes).map_err(|e| StoreError::Decode {
        object: key.to_string(),
        reason: e.to_string(),
    })
}

fn encode<T: Serialize>(key: &ObjectKey, value: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec_pretty(value).map_err(|e| StoreError::Decode {
        object: key.to_string(),
        reason: e.to_string(),
    })
}
