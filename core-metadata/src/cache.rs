//! Content-addressable file cache for cover images and lyrics.
//!
//! ## Layout
//!
//! ```text
//! {root}/images/{id}_embedded.jpg
//! {root}/images/{id}_online.jpg
//! {root}/lyrics/{id}.txt
//! ```
//!
//! Entries are write-once: the first complete write of an entry wins and
//! later writes are successful no-ops. A write is staged in a uniquely named
//! temporary file next to its target and published with a hard link, which
//! fails if the target already exists. Readers therefore never see a partial
//! entry, and concurrent writers need no lock.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::{MetadataError, Result};

/// Deterministic cache key of a track
///
/// Lowercase hex SHA-256 of `lowercase(artist) + "-" + lowercase(title)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheIdentity(String);

impl CacheIdentity {
    /// Identity of an `(artist, title)` pair; case-insensitive
    ///
    /// ```
    /// use core_metadata::cache::CacheIdentity;
    ///
    /// let a = CacheIdentity::for_track("Jay Chou", "Qing Tian");
    /// let b = CacheIdentity::for_track("JAY CHOU", "qing tian");
    /// assert_eq!(a, b);
    /// assert_eq!(a.as_str().len(), 64);
    /// ```
    pub fn for_track(artist: &str, title: &str) -> Self {
        let key = format!("{}-{}", artist.to_lowercase(), title.to_lowercase());
        let digest = Sha256::digest(key.as_bytes());
        Self(format!("{:x}", digest))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Origin of a cached cover image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CoverKind {
    /// Picture extracted from the file's own tags
    Embedded,
    /// Picture fetched from a remote provider
    Online,
}

impl CoverKind {
    fn suffix(&self) -> &'static str {
        match self {
            Self::Embedded => "embedded",
            Self::Online => "online",
        }
    }
}

/// File-backed cache rooted at a directory
#[derive(Debug, Clone)]
pub struct CacheStore {
    root: PathBuf,
}

impl CacheStore {
    /// Create a store; directories are created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Same as [`CacheIdentity::for_track`]
    pub fn id_for(artist: &str, title: &str) -> CacheIdentity {
        CacheIdentity::for_track(artist, title)
    }

    /// Location of a cover entry, whether or not it exists
    pub fn image_path(&self, id: &CacheIdentity, kind: CoverKind) -> PathBuf {
        self.root
            .join("images")
            .join(format!("{}_{}.jpg", id, kind.suffix()))
    }

    /// Location of a lyrics entry, whether or not it exists
    pub fn lyrics_path(&self, id: &CacheIdentity) -> PathBuf {
        self.root.join("lyrics").join(format!("{}.txt", id))
    }

    /// Bytes of a cover entry, `None` on a miss
    pub async fn read_image(&self, id: &CacheIdentity, kind: CoverKind) -> Option<Bytes> {
        read_entry(&self.image_path(id, kind)).await.map(Bytes::from)
    }

    pub async fn has_image(&self, id: &CacheIdentity, kind: CoverKind) -> bool {
        tokio::fs::try_exists(self.image_path(id, kind))
            .await
            .unwrap_or(false)
    }

    /// Store a cover entry unless one exists; returns the entry's path
    pub async fn write_image(
        &self,
        id: &CacheIdentity,
        kind: CoverKind,
        data: &[u8],
    ) -> Result<PathBuf> {
        let path = self.image_path(id, kind);
        write_once(&path, data).await?;
        Ok(path)
    }

    /// Text of a lyrics entry, `None` on a miss
    pub async fn read_lyrics(&self, id: &CacheIdentity) -> Option<String> {
        read_entry(&self.lyrics_path(id))
            .await
            .map(|raw| String::from_utf8_lossy(&raw).into_owned())
    }

    /// Store a lyrics entry unless one exists; returns the entry's path
    pub async fn write_lyrics(&self, id: &CacheIdentity, text: &str) -> Result<PathBuf> {
        let path = self.lyrics_path(id);
        write_once(&path, text.as_bytes()).await?;
        Ok(path)
    }
}

async fn read_entry(path: &Path) -> Option<Vec<u8>> {
    match tokio::fs::read(path).await {
        Ok(data) => Some(data),
        Err(e) if e.kind() == ErrorKind::NotFound => None,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Failed to read cache entry");
            None
        }
    }
}

/// Publish `data` at `path` if nothing is there yet.
async fn write_once(path: &Path, data: &[u8]) -> Result<()> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        debug!(path = %path.display(), "Cache entry already present");
        return Ok(());
    }

    let (dir, name) = match (path.parent(), path.file_name()) {
        (Some(dir), Some(name)) => (dir, name.to_string_lossy()),
        _ => {
            return Err(MetadataError::Cache(format!(
                "Invalid cache path: {}",
                path.display()
            )))
        }
    };

    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| cache_error("create directory", dir, e))?;

    let staging = dir.join(format!(".{}.{}.tmp", name, Uuid::new_v4()));
    if let Err(e) = tokio::fs::write(&staging, data).await {
        let _ = tokio::fs::remove_file(&staging).await;
        return Err(cache_error("stage", &staging, e));
    }

    let published = publish(&staging, path).await;
    let _ = tokio::fs::remove_file(&staging).await;
    published
}

async fn publish(staging: &Path, path: &Path) -> Result<()> {
    match tokio::fs::hard_link(staging, path).await {
        Ok(()) => {
            debug!(path = %path.display(), "Cache entry written");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::AlreadyExists => {
            debug!(path = %path.display(), "Lost publish race, keeping existing entry");
            Ok(())
        }
        Err(e) => {
            // Filesystems without hard links: best-effort guarded rename
            debug!(error = %e, "Hard link unavailable, falling back to rename");
            if tokio::fs::try_exists(path).await.unwrap_or(false) {
                return Ok(());
            }
            tokio::fs::rename(staging, path)
                .await
                .map_err(|e| cache_error("publish", path, e))
        }
    }
}

fn cache_error(action: &str, path: &Path, e: std::io::Error) -> MetadataError {
    MetadataError::Cache(format!("{} {}: {}", action, path.display(), e))
}
