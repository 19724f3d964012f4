//! # Stored Data Model
//!
//! Wallet dataset (owner → ordered wallet list) and the airdrop table
//! (row 1 is a fixed header, every later row one record).
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column header written as row 1 of every fresh table
pub const TABLE_HEADER: [&str; 5] = ["LINK", "NAME", "TYPE", "WALLET", "TIMESTAMP"];

/// Timestamp format used for the last column
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// First position that holds data (row 1 is the header)
pub const FIRST_DATA_ROW: usize = 2;

/// A saved wallet address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletEntry {
    pub address: String,
    pub chain: String,
}

impl WalletEntry {
    pub fn new(address: &str, chain: &str) -> Self {
        Self {
            address: address.trim().to_string(),
            chain: chain.trim().to_uppercase(),
        }
    }

    /// `0xABC (EVM)` style label
    pub fn label(&self) -> String {
        format!("{} ({})", self.address, self.chain)
    }
}

/// All owners' wallets, persisted as `{ "<owner>": [{address, chain}, ...] }`
pub type WalletBook = BTreeMap<String, Vec<WalletEntry>>;

/// One airdrop entry as stored in a table row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AirdropRecord {
    pub link: String,
    pub title: String,
    pub kind: String,
    pub wallet_address: String,
    pub timestamp: String,
}

impl AirdropRecord {
    /// Build from a raw row; rows with fewer than five cells are not records.
    pub fn from_cells(cells: &[String]) -> Option<Self> {
        match cells {
            [link, title, kind, wallet_address, timestamp, ..] => Some(Self {
                link: link.clone(),
                title: title.clone(),
                kind: kind.clone(),
                wallet_address: wallet_address.clone(),
                timestamp: timestamp.clone(),
            }),
            _ => None,
        }
    }

    pub fn into_cells(self) -> [String; 5] {
        [
            self.link,
            self.title,
            self.kind,
            self.wallet_address,
            self.timestamp,
        ]
    }
}

/// Ordered tabular dataset. Positions are 1-based; position 1 is the header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    rows: Vec<Vec<String>>,
}

impl Default for Table {
    fn default() -> Self {
        Self::with_header()
    }
}

impl Table {
    /// A fresh table holding only the header row
    pub fn with_header() -> Self {
        Self {
            rows: vec![TABLE_HEADER.iter().map(|h| h.to_string()).collect()],
        }
    }

    /// Highest occupied position (1 when only the header exists)
    pub fn max_row(&self) -> usize {
        self.rows.len()
    }

    /// Number of data rows
    pub fn data_len(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    pub fn is_empty(&self) -> bool {
        self.data_len() == 0
    }

    /// Raw cells at a 1-based position
    pub fn cells(&self, position: usize) -> Option<&[String]> {
        position
            .checked_sub(1)
            .and_then(|idx| self.rows.get(idx))
            .map(|r| r.as_slice())
    }

    /// Record at a data position; `None` for the header, out of range, or short rows
    pub fn record(&self, position: usize) -> Option<AirdropRecord> {
        if position < FIRST_DATA_ROW {
            return None;
        }
        self.cells(position).and_then(AirdropRecord::from_cells)
    }

    /// Every well-formed record paired with its current position
    pub fn records(&self) -> Vec<(usize, AirdropRecord)> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .filter_map(|(idx, cells)| AirdropRecord::from_cells(cells).map(|r| (idx + 1, r)))
            .collect()
    }

    /// Append at the end, returning the new row's position
    pub fn push(&mut self, cells: [String; 5]) -> usize {
        self.rows.push(cells.to_vec());
        self.rows.len()
    }

    /// Remove a data row; every later row shifts down by one.
    pub fn remove(&mut self, position: usize) -> Option<Vec<String>> {
        if position < FIRST_DATA_ROW || position > self.max_row() {
            return None;
        }
        Some(self.rows.remove(position - 1))
    }

    /// First data position whose cells equal `cells`
    pub fn position_of(&self, cells: &[String]) -> Option<usize> {
        self.rows
            .iter()
            .enumerate()
            .skip(1)
            .find(|(_, row)| row.as_slice() == cells)
            .map(|(idx, _)| idx + 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cells(tag: &str) -> [String; 5] {
        [
            format!("LINK-{tag}"),
            format!("TITLE-{tag}"),
            "TESTNET".to_string(),
            "0xABC".to_string(),
            "2024-01-01 00:00:00".to_string(),
        ]
    }

    #[test]
    fn test_fresh_table_is_header_only() {
        let table = Table::with_header();
        assert_eq!(table.max_row(), 1);
        assert!(table.is_empty());
        assert_eq!(table.cells(1).map(|c| c[0].as_str()), Some("LINK"));
        assert!(table.record(1).is_none());
    }

    #[test]
    fn test_push_returns_position() {
        let mut table = Table::with_header();
        assert_eq!(table.push(cells("a")), 2);
        assert_eq!(table.push(cells("b")), 3);
        assert_eq!(table.record(3).map(|r| r.link), Some("LINK-b".to_string()));
    }

    #[test]
    fn test_remove_shifts_later_rows() {
        let mut table = Table::with_header();
        table.push(cells("a"));
        table.push(cells("b"));
        table.push(cells("c"));

        assert!(table.remove(3).is_some());
        assert_eq!(table.record(3).map(|r| r.link), Some("LINK-c".to_string()));
        assert!(table.remove(1).is_none());
        assert!(table.remove(9).is_none());
    }

    #[test]
    fn test_short_rows_are_skipped() {
        let table: Table = serde_json::from_str(
            r#"{"rows":[["LINK","NAME","TYPE","WALLET","TIMESTAMP"],["only","two"],["a","b","c","d","e"]]}"#,
        )
        .unwrap();
        let records = table.records();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].0, 3);
    }

    #[test]
    fn test_wallet_entry_normalizes() {
        let entry = WalletEntry::new("  0xabc ", "sol");
        assert_eq!(entry.address, "0xabc");
        assert_eq!(entry.chain, "SOL");
        assert_eq!(entry.label(), "0xabc (SOL)");
    }
}
