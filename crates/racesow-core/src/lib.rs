pub mod error;
pub mod ledger;
pub mod model;
pub mod recompute;
pub mod scoring;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use recompute::{RecomputeSummary, recompute_map};
pub use store::{LeaderboardStore, MemoryStore};

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers {
    use std::collections::HashMap;

    use crate::error::{StoreError, StoreResult};
    use crate::model::{MapId, Player, PlayerId, Race, RaceId};
    use crate::store::{LeaderboardStore, MemoryStore};

    /// Build a store with one map and one player per `(time, playtime)`
    /// entry, each submitting once in order. Race ids follow entry order.
    pub fn store_with_map(
        races: &[(Option<u64>, u64)],
    ) -> (MemoryStore, MapId, Vec<PlayerId>, Vec<RaceId>) {
        let mut store = MemoryStore::new();
        let map = store.add_map("testmap");
        let mut players = Vec::with_capacity(races.len());
        let mut race_ids = Vec::with_capacity(races.len());
        for (i, &(time, playtime)) in races.iter().enumerate() {
            let player = store.add_player(format!("Player{}", i + 1));
            let race = store
                .submit_race(player, map, time, playtime, i as u64)
                .expect("fixture submission");
            players.push(player);
            race_ids.push(race);
        }
        store.take_updated_maps();
        (store, map, players, race_ids)
    }

    /// A store whose commits start failing after `budget` successful ones,
    /// until [`FlakyStore::heal`] is called.
    pub struct FlakyStore<S> {
        inner: S,
        budget: Option<usize>,
    }

    impl<S> FlakyStore<S> {
        pub fn new(inner: S, budget: usize) -> Self {
            Self {
                inner,
                budget: Some(budget),
            }
        }

        pub fn heal(&mut self) {
            self.budget = None;
        }

        pub fn inner(&self) -> &S {
            &self.inner
        }

        pub fn into_inner(self) -> S {
            self.inner
        }
    }

    impl<S: LeaderboardStore> LeaderboardStore for FlakyStore<S> {
        fn races_on_map(&self, map_id: MapId) -> StoreResult<Vec<Race>> {
            self.inner.races_on_map(map_id)
        }

        fn players(&self, ids: &[PlayerId]) -> StoreResult<HashMap<PlayerId, Player>> {
            self.inner.players(ids)
        }

        fn commit_score(&mut self, race: &Race, player: Option<&Player>) -> StoreResult<()> {
            match self.budget.as_mut() {
                Some(0) => Err(StoreError::Backend("injected commit failure".to_string())),
                Some(left) => {
                    *left -= 1;
                    self.inner.commit_score(race, player)
                },
                None => self.inner.commit_score(race, player),
            }
        }
    }
}
