//! # Local File Backend
//!
//! One JSON file per dataset inside a data directory. Files carry no native
//! version, so the token is a fingerprint of the file contents; writers in
//! this process are serialized and re-check the fingerprint before replacing
//! the file.
//!
//! - **Version**: 1.0.0
//! - **Since**: 0.1.0

use async_trait::async_trait;
use log::debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

use super::backend::{Backend, ObjectKey, StoredObject, VersionToken};
use super::error::StoreError;

pub struct LocalFileBackend {
    data_dir: PathBuf,
    write_lock: Mutex<()>,
}

impl LocalFileBackend {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Local files are shared by every owner; the dataset itself is keyed by owner.
    fn path_for(&self, key: &ObjectKey) -> PathBuf {
        self.data_dir.join(key.file)
    }

    async fn read_path(path: &Path) -> Result<Option<Vec<u8>>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl Backend for LocalFileBackend {
    fn name(&self) -> &'static str {
        "local"
    }

    async fn read(&self, key: &ObjectKey) -> Result<Option<StoredObject>, StoreError> {
        let path = self.path_for(key);
        let object = Self::read_path(&path).await?.map(|bytes| StoredObject {
            version: VersionToken::fingerprint(&bytes),
            bytes,
        });
        debug!(
            "Read {} ({})",
            path.display(),
            if object.is_some() { "present" } else { "absent" }
        );
        Ok(object)
    }

    async fn write(
        &self,
        key: &ObjectKey,
        bytes: Vec<u8>,
        expected: Option<&VersionToken>,
    ) -> Result<VersionToken, StoreError> {
        let _guard = self.write_lock.lock().await;
        let path = self.path_for(key);

        let current = Self::read_path(&path).await?.map(|b| VersionToken::fingerprint(&b));
        if current.as_ref() != expected {
            return Err(StoreError::Conflict {
                object: path.display().to_string(),
            });
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write-then-rename so readers never see a half-written file
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;

        debug!("Wrote {} ({} bytes)", path.display(), bytes.len());
        Ok(VersionToken::fingerprint(&bytes))
    }
}
