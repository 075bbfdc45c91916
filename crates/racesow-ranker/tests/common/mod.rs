use tempfile::TempDir;

use racesow_core::MemoryStore;
use racesow_core::model::{MapId, PlayerId};
use racesow_ranker::config::{RankerConfig, ScheduleConfig, SnapshotConfig};
use racesow_ranker::ranker::Ranker;
use racesow_ranker::schedule::{IntervalSchedule, Period};
use racesow_ranker::state::AppState;
use racesow_ranker::build_ranker;

pub struct TestRanker {
    pub ranker: Ranker,
    pub dir: TempDir,
}

impl TestRanker {
    /// Ranker with an empty store, a snapshot path in a temp dir and a 1s job.
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let ranker = build_ranker(config_for(&dir)).unwrap();
        Self { ranker, dir }
    }

    /// Ranker over a prepared store instead of an empty one.
    pub fn with_store(store: MemoryStore) -> Self {
        let dir = TempDir::new().unwrap();
        let ranker = Ranker::new(AppState::new(config_for(&dir), store));
        Self { ranker, dir }
    }

    /// Build a second ranker over the same snapshot directory.
    pub fn reopen(&self) -> Ranker {
        build_ranker(config_for(&self.dir)).unwrap()
    }

    pub async fn add_map(&self, name: &str) -> MapId {
        self.ranker.state().store.write().await.add_map(name)
    }

    pub async fn add_player(&self, name: &str) -> PlayerId {
        self.ranker.state().store.write().await.add_player(name)
    }

    pub async fn points(&self, player: PlayerId) -> f64 {
        self.ranker
            .state()
            .store
            .read()
            .await
            .player(player)
            .unwrap()
            .points
    }
}

pub fn config_for(dir: &TempDir) -> RankerConfig {
    RankerConfig {
        snapshot: SnapshotConfig {
            path: dir.path().join("racesow.snapshot").display().to_string(),
            save_after_pass: true,
        },
        schedule: ScheduleConfig {
            intervals: vec![IntervalSchedule {
                every: 1,
                period: Period::Seconds,
            }],
        },
        ..RankerConfig::default()
    }
}
