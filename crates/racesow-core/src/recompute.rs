use std::collections::HashMap;

use serde::Serialize;

use crate::error::{StoreError, StoreResult};
use crate::ledger::{LedgerOutcome, apply_score};
use crate::model::{MapId, PlayerId, Race};
use crate::scoring::{distribute, record_value};
use crate::store::LeaderboardStore;

/// Counts of what a map recompute changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct RecomputeSummary {
    pub map_id: MapId,
    /// `None` when the map has no completed races.
    pub record_points: Option<f64>,
    pub ranked: usize,
    pub first_scores: usize,
    pub adjusted: usize,
    pub unchanged: usize,
}

impl RecomputeSummary {
    /// True when the recompute wrote nothing to any player.
    pub fn is_noop(&self) -> bool {
        self.first_scores == 0 && self.adjusted == 0
    }
}

/// Recompute ranks and points for every completed race on `map_id` and
/// reconcile the owners' totals.
///
/// With `reset` set, every score is added to its owner as if the race had
/// never scored before; use it only right after
/// [`MemoryStore::reset_scores`](crate::store::MemoryStore::reset_scores).
///
/// Deterministic: completed races are ranked by time, then race id. Running
/// it again on an unchanged map writes no player.
pub fn recompute_map<S: LeaderboardStore + ?Sized>(
    store: &mut S,
    map_id: MapId,
    reset: bool,
) -> StoreResult<RecomputeSummary> {
    let mut summary = RecomputeSummary {
        map_id,
        ..RecomputeSummary::default()
    };

    let mut races = store.races_on_map(map_id)?;

    let mut completed: Vec<Race> = races.iter().filter(|r| r.is_completed()).cloned().collect();
    if completed.is_empty() {
        tracing::debug!(map_id, "No completed races, nothing to score");
        return Ok(summary);
    }
    completed.sort_by_key(|r| (r.time, r.id));
    races.sort_by(|a, b| b.playtime.cmp(&a.playtime).then(a.id.cmp(&b.id)));

    let record_points = record_value(completed.len(), &races, &completed[0]);
    let awards = distribute(&completed, record_points);

    let mut owner_ids: Vec<PlayerId> = completed.iter().map(|r| r.player_id).collect();
    owner_ids.sort_unstable();
    owner_ids.dedup();
    let mut owners = store.players(&owner_ids)?;

    let mut by_id: HashMap<_, Race> = completed.into_iter().map(|r| (r.id, r)).collect();
    for award in &awards {
        let race = by_id
            .get_mut(&award.race_id)
            .ok_or(StoreError::UnknownRace(award.race_id))?;
        let player = owners
            .get_mut(&race.player_id)
            .ok_or(StoreError::UnknownPlayer(race.player_id))?;

        match apply_score(store, race, player, award.points, award.rank, reset)? {
            LedgerOutcome::Rebuilt | LedgerOutcome::FirstScore => summary.first_scores += 1,
            LedgerOutcome::Adjusted { .. } => summary.adjusted += 1,
            LedgerOutcome::Unchanged => summary.unchanged += 1,
        }
    }

    summary.record_points = Some(record_points);
    summary.ranked = awards.len();
    tracing::debug!(
        map_id,
        record_points,
        ranked = summary.ranked,
        first_scores = summary.first_scores,
        adjusted = summary.adjusted,
        "Map recomputed"
    );
    Ok(summary)
}
