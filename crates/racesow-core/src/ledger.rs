use crate::error::StoreResult;
use crate::model::{Player, Race};
use crate::scoring::points_differ;
use crate::store::LeaderboardStore;

/// What applying a score did to the owner's totals.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LedgerOutcome {
    /// Scores are being rebuilt after a reset; points added, map counted.
    Rebuilt,
    /// First score for this race; points added, map counted.
    FirstScore,
    /// The race's score moved by `delta`.
    Adjusted { delta: f64 },
    /// Same score as before; the player was not written.
    Unchanged,
}

impl LedgerOutcome {
    pub fn touched_player(self) -> bool {
        !matches!(self, Self::Unchanged)
    }
}

/// Store `points` and `rank` on `race` and reconcile `player`'s totals
/// against the score the race held before.
///
/// Race and player are committed together. On error neither `race` nor
/// `player` is modified, so the caller's copies stay in step with the store.
pub fn apply_score<S: LeaderboardStore + ?Sized>(
    store: &mut S,
    race: &mut Race,
    player: &mut Player,
    points: f64,
    rank: u32,
    reset: bool,
) -> StoreResult<LedgerOutcome> {
    debug_assert_eq!(race.player_id, player.id);

    let old_points = race.points;
    let mut scored = race.clone();
    scored.points = Some(points);
    scored.rank = Some(rank);

    let mut owner = player.clone();
    let outcome = match old_points {
        _ if reset => {
            owner.add_points(points);
            owner.maps_finished += 1;
            LedgerOutcome::Rebuilt
        },
        None => {
            owner.add_points(points);
            owner.maps_finished += 1;
            LedgerOutcome::FirstScore
        },
        Some(old) if points_differ(points, old) => {
            let delta = points - old;
            owner.add_points(delta);
            LedgerOutcome::Adjusted { delta }
        },
        Some(_) => LedgerOutcome::Unchanged,
    };

    let owner_update = outcome.touched_player().then_some(&owner);
    store.commit_score(&scored, owner_update)?;

    *race = scored;
    if outcome.touched_player() {
        *player = owner;
    }
    tracing::trace!(race_id = race.id, player_id = player.id, rank, points, ?outcome, "Score applied");
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::error::StoreError;
    use crate::model::{MapId, PlayerId};

    /// Records every commit instead of storing anything.
    #[derive(Default)]
    struct CommitLog {
        commits: Vec<(Race, Option<Player>)>,
        fail: bool,
    }

    impl LeaderboardStore for CommitLog {
        fn races_on_map(&self, _map_id: MapId) -> StoreResult<Vec<Race>> {
            Ok(Vec::new())
        }

        fn players(&self, _ids: &[PlayerId]) -> StoreResult<HashMap<PlayerId, Player>> {
            Ok(HashMap::new())
        }

        fn commit_score(&mut self, race: &Race, player: Option<&Player>) -> StoreResult<()> {
            if self.fail {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            self.commits.push((race.clone(), player.cloned()));
            Ok(())
        }
    }

    fn fixture(points: Option<f64>) -> (Race, Player) {
        let mut race = Race::new(1, 1, 9);
        race.time = Some(60_000);
        race.points = points;
        let mut player = Player::new(9, "nine");
        if let Some(p) = points {
            player.points = p + 40.0;
            player.maps_finished = 3;
        }
        (race, player)
    }

    #[test]
    fn first_score_adds_points_and_counts_map() {
        let mut log = CommitLog::default();
        let (mut race, mut player) = fixture(None);
        let outcome = apply_score(&mut log, &mut race, &mut player, 12.5, 1, false).unwrap();

        assert_eq!(outcome, LedgerOutcome::FirstScore);
        assert_eq!(race.points, Some(12.5));
        assert_eq!(race.rank, Some(1));
        assert_eq!(player.points, 12.5);
        assert_eq!(player.maps_finished, 1);
        assert_eq!(log.commits.len(), 1);
        assert!(log.commits[0].1.is_some());
    }

    #[test]
    fn zero_is_a_real_previous_score() {
        let mut log = CommitLog::default();
        let (mut race, mut player) = fixture(Some(0.0));
        let outcome = apply_score(&mut log, &mut race, &mut player, 0.0, 4, false).unwrap();
        assert_eq!(outcome, LedgerOutcome::Unchanged);
        assert_eq!(player.maps_finished, 3);
    }

    #[test]
    fn changed_score_applies_delta_only() {
        let mut log = CommitLog::default();
        let (mut race, mut player) = fixture(Some(10.0));
        let outcome = apply_score(&mut log, &mut race, &mut player, 7.0, 2, false).unwrap();

        assert_eq!(outcome, LedgerOutcome::Adjusted { delta: -3.0 });
        assert_eq!(player.points, 47.0);
        assert_eq!(player.maps_finished, 3);
        assert_eq!(race.rank, Some(2));
    }

    #[test]
    fn unchanged_score_skips_player_write() {
        let mut log = CommitLog::default();
        let (mut race, mut player) = fixture(Some(5.0));
        let before = player.clone();
        let outcome = apply_score(&mut log, &mut race, &mut player, 5.0, 3, false).unwrap();

        assert_eq!(outcome, LedgerOutcome::Unchanged);
        assert_eq!(player, before);
        assert_eq!(log.commits.len(), 1);
        assert!(log.commits[0].1.is_none(), "player must not be written");
        // the race itself is still written, rank may have moved
        assert_eq!(log.commits[0].0.rank, Some(3));
    }

    #[test]
    fn float_noise_counts_as_unchanged() {
        let mut log = CommitLog::default();
        let (mut race, mut player) = fixture(Some(0.3));
        let outcome =
            apply_score(&mut log, &mut race, &mut player, 0.1 + 0.2, 1, false).unwrap();
        assert_eq!(outcome, LedgerOutcome::Unchanged);
    }

    #[test]
    fn reset_adds_unconditionally() {
        let mut log = CommitLog::default();
        let (mut race, mut player) = fixture(Some(5.0));
        let outcome = apply_score(&mut log, &mut race, &mut player, 5.0, 1, true).unwrap();

        assert_eq!(outcome, LedgerOutcome::Rebuilt);
        assert_eq!(player.points, 50.0);
        assert_eq!(player.maps_finished, 4);
    }

    #[test]
    fn failed_commit_leaves_inputs_untouched() {
        let mut log = CommitLog {
            fail: true,
            ..CommitLog::default()
        };
        let (mut race, mut player) = fixture(None);
        let (race_before, player_before) = (race.clone(), player.clone());

        assert!(apply_score(&mut log, &mut race, &mut player, 9.0, 1, false).is_err());
        assert_eq!(race, race_before);
        assert_eq!(player, player_before);
    }
}
