//! Upload directory access.
//!
//! [`FileStore`] is the seam between the services and the filesystem; the
//! server uses [`LocalFileStore`], tests substitute their own.

use async_trait::async_trait;
use chrono::Utc;
use std::io;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::debug;

/// A file currently present in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredFile {
    pub name: String,
    pub modified: SystemTime,
}

/// Flat namespace of named blobs. Names never contain path separators.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `bytes` under `name`. Either the whole file appears or nothing.
    async fn put(&self, name: &str, bytes: &[u8]) -> io::Result<()>;

    async fn get(&self, name: &str) -> io::Result<Vec<u8>>;

    /// Removing a missing file is not an error.
    async fn remove(&self, name: &str) -> io::Result<()>;

    async fn list(&self) -> io::Result<Vec<StoredFile>>;
}

/// [`FileStore`] backed by a local directory.
#[derive(Debug, Clone)]
pub struct LocalFileStore {
    root: PathBuf,
}

impl LocalFileStore {
    /// Open (and create if needed) the directory at `root`.
    pub async fn open(root: impl Into<PathBuf>) -> io::Result<Self> {
        let root = root.into();
        tokio::fs::create_dir_all(&root).await?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, name: &str) -> io::Result<PathBuf> {
        if !is_safe_name(name) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("refusing unsafe file name {name:?}"),
            ));
        }
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn put(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        let target = self.path_for(name)?;
        // Write beside the target, then rename into place.
        let partial = self.root.join(format!(".{name}.part"));
        tokio::fs::write(&partial, bytes).await?;
        if let Err(err) = tokio::fs::rename(&partial, &target).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(err);
        }
        debug!(name, len = bytes.len(), "stored file");
        Ok(())
    }

    async fn get(&self, name: &str) -> io::Result<Vec<u8>> {
        tokio::fs::read(self.path_for(name)?).await
    }

    async fn remove(&self, name: &str) -> io::Result<()> {
        match tokio::fs::remove_file(self.path_for(name)?).await {
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }

    async fn list(&self) -> io::Result<Vec<StoredFile>> {
        let mut out = Vec::new();
        let mut entries = tokio::fs::read_dir(&self.root).await?;
        while let Some(entry) = entries.next_entry().await? {
            let meta = entry.metadata().await?;
            if !meta.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            out.push(StoredFile {
                name,
                modified: meta.modified()?,
            });
        }
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }
}

fn is_safe_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\', '\0'])
}

/// Reduce a client-supplied file name to its final path component and drop
/// characters that have no business in a stored name.
pub fn sanitize_file_name(original: &str) -> String {
    let base = original
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();
    let cleaned: String = base
        .chars()
        .filter(|c| !c.is_control())
        .collect();
    match cleaned.as_str() {
        "." | ".." => String::new(),
        _ => cleaned,
    }
}

/// Stored name for an upload: `<unix millis>_<8 hex>_<sanitized name>`.
/// The random part keeps uploads in the same millisecond apart.
pub fn stored_name(sanitized: &str) -> String {
    let nonce = uuid::Uuid::new_v4().simple().to_string();
    format!("{}_{}_{}", Utc::now().timestamp_millis(), &nonce[..8], sanitized)
}

/// Name of the JSON side file kept for each feedback row.
pub fn feedback_snapshot_name(feedback_id: i64) -> String {
    format!("feedback_{feedback_id}.json")
}

pub(crate) fn is_feedback_snapshot(name: &str) -> bool {
    name.strip_prefix("feedback_")
        .and_then(|rest| rest.strip_suffix(".json"))
        .is_some_and(|id| !id.is_empty() && id.chars().all(|c| c.is_ascii_digit()))
}
