//! JSON-file persistence for the three workflow collections.
//!
//! Each collection lives in its own file and is always rewritten whole.
//! Writes go to a temporary file in the same directory which is then renamed
//! over the previous version, so a crash mid-write leaves the old file intact.
//! Reads never fail: a missing or unreadable file yields an empty collection.

use crate::error::{WorkflowError, WorkflowResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, error, info, warn};

/// The collections kept on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Active reaction polls.
    Polls,
    /// Pending reminders.
    Reminders,
    /// All tickets, open and closed.
    Tickets,
}

impl StoreKind {
    /// File name of the collection inside the data directory.
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Polls => "polls.json",
            Self::Reminders => "reminders.json",
            Self::Tickets => "tickets.json",
        }
    }
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Polls => "polls",
            Self::Reminders => "reminders",
            Self::Tickets => "tickets",
        };
        f.write_str(name)
    }
}

/// Directory-backed store of JSON collections.
#[derive(Debug, Clone)]
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    /// Creates a store rooted at `dir`. The directory is created on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of one collection file.
    #[must_use]
    pub fn path(&self, kind: StoreKind) -> PathBuf {
        self.dir.join(kind.file_name())
    }

    /// Loads a collection, degrading to the empty default on any failure.
    pub async fn load<T>(&self, kind: StoreKind) -> T
    where
        T: DeserializeOwned + Default,
    {
        let path = self.path(kind);

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "No saved {} yet, starting empty", kind);
                return T::default();
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Could not read saved {}, starting empty", kind);
                return T::default();
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(collection) => {
                info!(path = %path.display(), "Loaded saved {}", kind);
                collection
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Saved {} are corrupt, starting empty", kind);
                T::default()
            }
        }
    }

    /// Serializes and atomically replaces a collection file.
    ///
    /// # Errors
    ///
    /// Returns [`WorkflowError::Persistence`] if encoding, writing or the
    /// final rename fails. The previous file is left untouched in that case.
    pub async fn save<T>(&self, kind: StoreKind, collection: &T) -> WorkflowResult<()>
    where
        T: Serialize + ?Sized,
    {
        let payload = serde_json::to_vec_pretty(collection)
            .map_err(|e| WorkflowError::persistence(kind, e))?;

        let dir = self.dir.clone();
        let path = self.path(kind);

        tokio::task::spawn_blocking(move || write_atomic(&dir, &path, &payload))
            .await
            .map_err(|e| WorkflowError::persistence(kind, e))?
            .map_err(|e| WorkflowError::persistence(kind, e))?;

        debug!("Saved {}", kind);
        Ok(())
    }

    /// Saves a collection, logging instead of returning a failure.
    ///
    /// The caller's in-memory state stays authoritative; only durability
    /// across restarts is lost until the next successful save.
    pub async fn persist<T>(&self, kind: StoreKind, collection: &T) -> bool
    where
        T: Serialize + ?Sized,
    {
        match self.save(kind, collection).await {
            Ok(()) => true,
            Err(e) => {
                error!(error = %e, "Keeping {} in memory only", kind);
                false
            }
        }
    }
}

fn write_atomic(dir: &Path, path: &Path, payload: &[u8]) -> io::Result<()> {
    std::fs::create_dir_all(dir)?;

    let mut temp = tempfile::NamedTempFile::new_in(dir)?;
    temp.write_all(payload)?;
    temp.as_file().sync_all()?;
    temp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
