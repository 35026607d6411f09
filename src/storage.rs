use crate::errors::{StorageError, StorageResult};
use crate::state::Snapshot;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SAVE_FILE_NAME: &str = "progress.json";

/// Saved progress on disk, one JSON record.
#[derive(Debug, Clone)]
pub struct ProgressStore {
    path: PathBuf,
}

impl ProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load saved progress. A missing, unreadable or corrupt file means
    /// "no prior progress" and yields the default snapshot.
    pub fn load(&self) -> Snapshot {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "no saved progress");
                return Snapshot::default();
            }
        };

        match serde_json::from_str::<Snapshot>(&raw) {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "ignoring corrupt saved progress");
                Snapshot::default()
            }
        }
    }

    /// Write the snapshot through a temporary file and rename it into place.
    pub fn save(&self, snapshot: &Snapshot) -> StorageResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| self.io_error(parent, source))?;
        }

        let tmp = self.path.with_extension("json.tmp");
        let data = serde_json::to_vec_pretty(snapshot)?;
        fs::write(&tmp, data).map_err(|source| self.io_error(&tmp, source))?;
        atomic_rename(&tmp, &self.path).map_err(|source| self.io_error(&self.path, source))?;
        debug!(path = %self.path.display(), "progress saved");
        Ok(())
    }

    /// Remove saved progress. Succeeds when there is nothing to remove.
    pub fn reset(&self) -> StorageResult<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(self.io_error(&self.path, source)),
        }
    }

    fn io_error(&self, path: &Path, source: std::io::Error) -> StorageError {
        StorageError::Io {
            path: path.display().to_string(),
            source,
        }
    }
}

fn atomic_rename(from: &Path, to: &Path) -> std::io::Result<()> {
    // rename() replaces the target on Unix; Windows needs it gone first.
    if cfg!(windows) && to.exists() {
        fs::remove_file(to)?;
    }
    fs::rename(from, to)
}
