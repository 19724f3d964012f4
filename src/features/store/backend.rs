//! # Storage Backends
//!
//! Whole-object read/write with optimistic concurrency. A backend returns a
//! version token on every read and rejects a write whose expected token no
//! longer matches the stored object.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use async_trait::async_trait;
use dashmap::DashMap;
use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use super::error::StoreError;

/// Location of one stored object: the owning identity plus a file name.
///
/// Backends decide how much of the key they use; the local backend keeps one
/// shared file per name, the remote backend namespaces by owner.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ObjectKey {
    pub owner: String,
    pub file: &'static str,
}

impl ObjectKey {
    pub fn new(owner: &str, file: &'static str) -> Self {
        Self {
            owner: owner.to_string(),
            file,
        }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.file)
    }
}

/// Opaque identifier of a stored object's state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VersionToken(String);

impl VersionToken {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Token derived from object contents, for backends without native versions
    pub fn fingerprint(bytes: &[u8]) -> Self {
        let mut hasher = DefaultHasher::new();
        bytes.hash(&mut hasher);
        Self(format!("{:016x}-{}", hasher.finish(), bytes.len()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for VersionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Object contents together with the version they were read at
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub version: VersionToken,
}

/// Whole-object storage with compare-and-swap writes
#[async_trait]
pub trait Backend: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Current contents, or `None` if the object does not exist.
    async fn read(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError>;

    /// Replace the object.
    ///
    /// `expected` is the token from the read this write is based on; `None`
    /// means "create new" and fails if the object already exists. Returns
    /// the new token, or `StoreError::Conflict` when `expected` is stale.
    async fn write(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError>;
}

/// In-memory backend with a monotonically increasing version per object.
///
/// Used by tests and dry runs; nothing survives the process.
#[derive(Default)]
pub struct MemoryBackend {
    objects: DashMap<ObjectKey, (u64, Vec<u8>)>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw bytes currently stored under `key`
    pub fn snapshot(&self, key: &ObjectKey) -> Option<Vec<u8>> {
        self.objects.get(key).map(|entry| entry.1.clone())
    }
}

#[async_trait]
impl Backend for MemoryBackend {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn read(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError> {
        // Version 0 is a placeholder left by a rejected first write
        Ok(self
            .objects
            .get(key)
            .filter(|entry| entry.0 > 0)
            .map(|entry| StoredObject {
                bytes: entry.1.clone(),
                version: VersionToken::new(entry.0.to_string()),
            }))
    }

    async fn write(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let conflict = || StoreError::Conflict {
            object: key.to_string(),
        };

        let mut entry = self.objects.entry(key.clone()).or_insert((0, Vec::new()));
        let current = entry.0;
        match expected {
            None if current != 0 => return Err(conflict()),
            Some(token) if token.as_str() != current.to_string() => return Err(conflict()),
            _ => {}
        }

        let next = current + 1;
        *entry = (next, bytes);
        Ok(VersionToken::new(next.to_string()))
    }
}
