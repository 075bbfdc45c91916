use chrono::Utc;

use racesow_core::model::{MapId, PlayerId, RaceId};
use racesow_core::{RecomputeSummary, recompute_map};

use crate::error::RankerError;
use crate::state::AppState;
use crate::status::{LeaderEntry, StatusReport};

/// Outcome of recomputing a batch of maps.
#[derive(Debug, Clone, Default)]
pub struct PassReport {
    pub recomputed: Vec<RecomputeSummary>,
    /// Maps whose recompute failed; they stay queued for the next pass.
    pub failed: Vec<MapId>,
}

impl PassReport {
    /// True if the pass wrote to the store. Every queued map holds new
    /// submissions, and a failed map may be partly scored.
    pub fn changed(&self) -> bool {
        !self.recomputed.is_empty() || !self.failed.is_empty()
    }
}

/// Entry points used by the scheduled job, the admin reset and the
/// submission path. Cheap to clone.
#[derive(Clone)]
pub struct Ranker {
    state: AppState,
}

impl Ranker {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Record a submission; the map is picked up by the next recompute pass.
    pub async fn submit_race(
        &self,
        player_id: PlayerId,
        map_id: MapId,
        time: Option<u64>,
        playtime: u64,
    ) -> Result<RaceId, RankerError> {
        let submitted_at = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
        let mut store = self.state.store.write().await;
        Ok(store.submit_race(player_id, map_id, time, playtime, submitted_at)?)
    }

    /// Recompute a single map right away against its current scores.
    ///
    /// Rebuilding from zero goes through [`Ranker::reset_all`] only, which
    /// clears player totals first.
    pub async fn recompute_map(&self, map_id: MapId) -> Result<RecomputeSummary, RankerError> {
        let mut store = self.state.store.write().await;
        Ok(recompute_map(&mut *store, map_id, false)?)
    }

    /// Recompute every map submitted to since the previous pass.
    ///
    /// The store lock is taken per map, so submissions can land between maps.
    /// A map that fails is queued again and retried on the next pass.
    pub async fn recompute_updated(&self) -> PassReport {
        let maps = self.state.store.write().await.take_updated_maps();
        let mut report = PassReport::default();

        for map_id in maps {
            let mut store = self.state.store.write().await;
            match recompute_map(&mut *store, map_id, false) {
                Ok(summary) => report.recomputed.push(summary),
                Err(e) => {
                    tracing::warn!(map_id, error = %e, "Recompute failed, will retry next pass");
                    store.mark_updated(map_id);
                    report.failed.push(map_id);
                },
            }
        }

        self.state.schedule.write().await.record_pass(Utc::now());
        tracing::info!(
            maps = report.recomputed.len(),
            failed = report.failed.len(),
            "Recompute pass finished"
        );
        report
    }

    /// Wipe every score and rebuild all maps from zero.
    ///
    /// Maps that fail are queued for the regular pass, which recomputes them
    /// without `reset`: races committed before the failure already hold
    /// their points and must not be added twice.
    pub async fn reset_all(&self) -> PassReport {
        let mut store = self.state.store.write().await;
        store.reset_scores();

        let mut report = PassReport::default();
        for map_id in store.map_ids() {
            match recompute_map(&mut *store, map_id, true) {
                Ok(summary) => report.recomputed.push(summary),
                Err(e) => {
                    tracing::warn!(map_id, error = %e, "Reset recompute failed, queued for retry");
                    store.mark_updated(map_id);
                    report.failed.push(map_id);
                },
            }
        }
        tracing::info!(
            maps = report.recomputed.len(),
            failed = report.failed.len(),
            "All scores rebuilt"
        );
        report
    }

    pub async fn save_snapshot(&self) -> Result<(), RankerError> {
        let store = self.state.store.read().await;
        self.state.snapshots.save(&store)?;
        Ok(())
    }

    pub async fn status(&self, leaders: usize) -> StatusReport {
        let (stats, leaders) = {
            let store = self.state.store.read().await;
            let leaders = store
                .leaderboard(leaders)
                .into_iter()
                .map(|p| LeaderEntry {
                    username: p.username.clone(),
                    points: p.points,
                    maps_finished: p.maps_finished,
                })
                .collect();
            (store.stats(), leaders)
        };
        let schedule = self.state.schedule.read().await;
        StatusReport {
            stats,
            last_pass: schedule.last_pass(),
            next_pass: schedule.next_computation(),
            leaders,
        }
    }
}
