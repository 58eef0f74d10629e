//! Directory-backed snapshot store.
//!
//! Each snapshot lives in `<dir>/<id>.json`. Writes go to a temporary file in
//! the same directory and are renamed into place, so a reader never observes a
//! half-written document.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use devsim_engine::Snapshot;
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::StoreError;

const EXTENSION: &str = "json";

pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Open a store rooted at `dir`, creating the directory if needed.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|e| StoreError::io(&dir, e))?;
        debug!(dir = %dir.display(), "opened snapshot store");
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write a snapshot, replacing any existing one with the same id.
    pub fn save(&self, snapshot: &Snapshot) -> Result<(), StoreError> {
        let path = self.path_for(&snapshot.id)?;
        let json =
            serde_json::to_vec_pretty(snapshot).map_err(|e| StoreError::json(&path, e))?;

        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        tmp.write_all(&json)
            .and_then(|()| tmp.as_file().sync_all())
            .map_err(|e| StoreError::io(tmp.path(), e))?;
        tmp.persist(&path)?;

        info!(id = %snapshot.id, name = %snapshot.name, "saved snapshot");
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<Snapshot, StoreError> {
        let path = self.path_for(id)?;
        let bytes = match fs::read(&path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(id.to_string()));
            }
            Err(e) => return Err(StoreError::io(&path, e)),
        };
        serde_json::from_slice(&bytes).map_err(|e| StoreError::json(&path, e))
    }

    /// All snapshots, newest first. Unreadable files are skipped with a warning.
    pub fn list(&self) -> Result<Vec<Snapshot>, StoreError> {
        let entries = fs::read_dir(&self.dir).map_err(|e| StoreError::io(&self.dir, e))?;
        let mut snapshots = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StoreError::io(&self.dir, e))?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            let parsed = fs::read(&path)
                .map_err(|e| StoreError::io(&path, e))
                .and_then(|b| {
                    serde_json::from_slice::<Snapshot>(&b).map_err(|e| StoreError::json(&path, e))
                });
            match parsed {
                Ok(s) => snapshots.push(s),
                Err(e) => warn!(error = %e, "skipping unreadable snapshot"),
            }
        }
        snapshots.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(snapshots)
    }

    pub fn rename(&self, id: &str, name: &str) -> Result<Snapshot, StoreError> {
        let renamed = self.load(id)?.renamed(name);
        self.save(&renamed)?;
        Ok(renamed)
    }

    /// Store a copy under a new id, named "<name> Copy".
    pub fn duplicate(&self, id: &str) -> Result<Snapshot, StoreError> {
        let copy = self.load(id)?.duplicated();
        self.save(&copy)?;
        Ok(copy)
    }

    pub fn delete(&self, id: &str) -> Result<(), StoreError> {
        let path = self.path_for(id)?;
        match fs::remove_file(&path) {
            Ok(()) => {
                info!(id, "deleted snapshot");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(id.to_string()))
            }
            Err(e) => Err(StoreError::io(&path, e)),
        }
    }

    fn path_for(&self, id: &str) -> Result<PathBuf, StoreError> {
        let valid = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(StoreError::InvalidId(id.to_string()));
        }
        Ok(self.dir.join(format!("{id}.{EXTENSION}")))
    }
}
