//! # Record Store Feature
//!
//! Wallet list and airdrop table persistence over pluggable backends
//! (local file, GitHub contents API, in-memory) with optimistic concurrency.
//!
//! - **Version**: 1.1.0
//! - **Since**: 0.1.0
//! - **Toggleable**: false
//!
//! ## Changelog
//! - 1.1.0: Version-token retry on conflicting writes, GitHub backend
//! - 1.0.0: Initial release with local JSON files

pub mod backend;
pub mod error;
pub mod github;
pub mod local;
pub mod model;
pub mod records;

pub use backend::{Backend, MemoryBackend, ObjectKey, StoredObject, VersionToken};
pub use error::StoreError;
pub use github::{GitHubContentsBackend, GitHubSettings};
pub use local::LocalFileBackend;
pub use model::{AirdropRecord, Table, WalletEntry, TABLE_HEADER, TIMESTAMP_FORMAT};
pub use records::{RecordStore, TABLE_FILE, WALLET_FILE};
