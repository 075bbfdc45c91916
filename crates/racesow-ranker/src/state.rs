use std::sync::Arc;
use tokio::sync::RwLock;

use racesow_core::MemoryStore;

use crate::config::RankerConfig;
use crate::schedule::Schedule;
use crate::snapshot::SnapshotManager;

pub type SharedStore = Arc<RwLock<MemoryStore>>;
pub type SharedSchedule = Arc<RwLock<Schedule>>;

#[derive(Clone)]
pub struct AppState {
    /// Every score write happens under this lock, which serializes updates
    /// to player totals across concurrent recomputes.
    pub store: SharedStore,
    pub schedule: SharedSchedule,
    pub snapshots: SnapshotManager,
    pub config: Arc<RankerConfig>,
}

impl AppState {
    pub fn new(config: RankerConfig, store: MemoryStore) -> Self {
        Self {
            store: Arc::new(RwLock::new(store)),
            schedule: Arc::new(RwLock::new(Schedule::new(
                config.schedule.intervals.clone(),
            ))),
            snapshots: SnapshotManager::new(&config.snapshot.path),
            config: Arc::new(config),
        }
    }
}
