//! Snapshot persistence for trained cycle artifacts.
//!
//! The snapshot stores the whole [`CycleArtifacts`] value, not just the
//! weights. Persisting the vocabulary and movie enumeration alongside the
//! model closes the window where a reloaded model could be paired with a
//! vocabulary from a different cycle.

use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;
use std::sync::Mutex;
use tracing::info;

use crate::artifacts::CycleArtifacts;
use crate::error::SnapshotError;

/// Persistence for the last good training cycle.
pub trait SnapshotStore: Send + Sync {
    fn exists(&self) -> bool;
    fn save(&self, artifacts: &CycleArtifacts) -> Result<(), SnapshotError>;
    fn load(&self) -> Result<CycleArtifacts, SnapshotError>;
}

/// JSON file snapshot.
///
/// Writes go to a sibling temp file first and are renamed into place, so an
/// interrupted save never clobbers the previous good snapshot.
#[derive(Debug, Clone)]
pub struct FileSnapshotStore {
    path: PathBuf,
}

impl FileSnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl SnapshotStore for FileSnapshotStore {
    fn exists(&self) -> bool {
        self.path.exists()
    }

    fn save(&self, artifacts: &CycleArtifacts) -> Result<(), SnapshotError> {
        let tmp = self.path.with_extension("tmp");
        let mut writer = BufWriter::new(File::create(&tmp)?);
        serde_json::to_writer(&mut writer, artifacts)?;
        writer.flush()?;
        fs::rename(&tmp, &self.path)?;
        info!(path = %self.path.display(), "Saved model snapshot");
        Ok(())
    }

    fn load(&self) -> Result<CycleArtifacts, SnapshotError> {
        if !self.path.exists() {
            return Err(SnapshotError::Missing);
        }
        let file = File::open(&self.path)?;
        let artifacts = serde_json::from_reader(BufReader::new(file))?;
        info!(path = %self.path.display(), "Loaded model snapshot");
        Ok(artifacts)
    }
}

/// In-memory snapshot slot for tests and ephemeral runs.
#[derive(Debug, Default)]
pub struct MemorySnapshotStore {
    slot: Mutex<Option<CycleArtifacts>>,
}

impl MemorySnapshotStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SnapshotStore for MemorySnapshotStore {
    fn exists(&self) -> bool {
        self.slot.lock().expect("snapshot lock poisoned").is_some()
    }

    fn save(&self, artifacts: &CycleArtifacts) -> Result<(), SnapshotError> {
        *self.slot.lock().expect("snapshot lock poisoned") = Some(artifacts.clone());
        Ok(())
    }

    fn load(&self) -> Result<CycleArtifacts, SnapshotError> {
        self.slot
            .lock()
            .expect("snapshot lock poisoned")
            .clone()
            .ok_or(SnapshotError::Missing)
    }
}
