//! On-disk snapshot of the whole leaderboard store.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use racesow_core::store::{MemoryStore, StoreRecords};

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("snapshot io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("failed to decode snapshot: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
    #[error("unsupported snapshot version {0}")]
    Version(u32),
}

#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    created_at: DateTime<Utc>,
    records: StoreRecords,
}

/// Saves and loads store snapshots at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    path: PathBuf,
}

impl SnapshotManager {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling of the snapshot with `.tmp` appended to the full file name.
    fn temp_path(&self) -> PathBuf {
        let mut name = self.path.clone().into_os_string();
        name.push(".tmp");
        PathBuf::from(name)
    }

    /// Write the store to a temp file next to the target, then rename it over
    /// the target so readers never see a partial snapshot.
    pub fn save(&self, store: &MemoryStore) -> Result<(), SnapshotError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let snapshot = SnapshotFile {
            version: SNAPSHOT_VERSION,
            created_at: Utc::now(),
            records: store.records(),
        };
        let bytes = rmp_serde::to_vec_named(&snapshot)?;

        let temp_path = self.temp_path();
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&temp_path, &self.path)?;

        tracing::debug!(path = %self.path.display(), bytes = bytes.len(), "Snapshot saved");
        Ok(())
    }

    /// Load the snapshot, or `None` if there is no snapshot file yet.
    pub fn load(&self) -> Result<Option<MemoryStore>, SnapshotError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let snapshot: SnapshotFile = rmp_serde::from_slice(&bytes)?;
        if snapshot.version != SNAPSHOT_VERSION {
            return Err(SnapshotError::Version(snapshot.version));
        }
        tracing::info!(
            path = %self.path.display(),
            created_at = %snapshot.created_at,
            races = snapshot.records.races.len(),
            "Snapshot loaded"
        );
        Ok(Some(MemoryStore::from_records(snapshot.records)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use racesow_core::recompute_map;
    use racesow_core::test_helpers::store_with_map;
    use tempfile::TempDir;

    #[test]
    fn missing_snapshot_loads_as_none() {
        let dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(dir.path().join("absent.snapshot"));
        assert!(manager.load().unwrap().is_none());
    }

    #[test]
    fn save_and_load_preserves_scores() {
        let dir = TempDir::new().unwrap();
        let manager = SnapshotManager::new(dir.path().join("nested/state.snapshot"));

        let (mut store, map, players, races) =
            store_with_map(&[(Some(60_000), 0), (Some(61_000), 3_700_000)]);
        recompute_map(&mut store, map, false).unwrap();
        manager.save(&store).unwrap();
        assert!(!manager.temp_path().exists());

        let loaded = manager.load().unwrap().unwrap();
        assert_eq!(loaded.records(), store.records());
        assert_eq!(
            loaded.race(races[0]).unwrap().points,
            store.race(races[0]).unwrap().points
        );
        assert_eq!(
            loaded.player(players[1]).unwrap(),
            store.player(players[1]).unwrap()
        );
    }

    #[test]
    fn snapshots_sharing_a_stem_do_not_share_temp_files() {
        let dir = TempDir::new().unwrap();
        let snapshot = SnapshotManager::new(dir.path().join("state.snapshot"));
        let other = dir.path().join("state.tmp");
        fs::write(&other, b"unrelated").unwrap();

        assert_eq!(snapshot.temp_path(), dir.path().join("state.snapshot.tmp"));
        snapshot.save(&MemoryStore::new()).unwrap();
        assert_eq!(fs::read(&other).unwrap(), b"unrelated");
        assert!(snapshot.load().unwrap().is_some());
    }

    #[test]
    fn corrupt_snapshot_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.snapshot");
        fs::write(&path, b"definitely not msgpack").unwrap();
        let manager = SnapshotManager::new(&path);
        assert!(matches!(manager.load(), Err(SnapshotError::Decode(_))));
    }

    #[test]
    fn future_version_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("v9.snapshot");
        let snapshot = SnapshotFile {
            version: 9,
            created_at: Utc::now(),
            records: StoreRecords::default(),
        };
        fs::write(&path, rmp_serde::to_vec_named(&snapshot).unwrap()).unwrap();
        let manager = SnapshotManager::new(&path);
        assert!(matches!(manager.load(), Err(SnapshotError::Version(9))));
    }
}
