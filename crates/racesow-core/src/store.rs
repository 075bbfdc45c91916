use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};
use crate::model::{Map, MapId, Player, PlayerId, Race, RaceId};

/// Data access used by the recompute path.
///
/// A recompute reads every race on a map and their owners in one batch, then
/// commits each scored race together with its owner's updated totals.
pub trait LeaderboardStore {
    /// All races on the map, completed or not, in no particular order.
    fn races_on_map(&self, map_id: MapId) -> StoreResult<Vec<Race>>;

    /// Player records for the given ids. Unknown ids are an error.
    fn players(&self, ids: &[PlayerId]) -> StoreResult<HashMap<PlayerId, Player>>;

    /// Persist a race's points and rank, and the owner's totals when given,
    /// as a single step.
    fn commit_score(&mut self, race: &Race, player: Option<&Player>) -> StoreResult<()>;
}

/// Aggregate counts about the store contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    pub maps: usize,
    pub players: usize,
    pub races: usize,
    pub completed_races: usize,
    pub updated_maps: usize,
}

/// Plain record form of a [`MemoryStore`], used for snapshots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreRecords {
    pub maps: Vec<Map>,
    pub players: Vec<Player>,
    pub races: Vec<Race>,
    pub updated_maps: Vec<MapId>,
}

/// In-memory leaderboard: maps, players and one race per (player, map).
#[derive(Debug, Default)]
pub struct MemoryStore {
    maps: BTreeMap<MapId, Map>,
    players: BTreeMap<PlayerId, Player>,
    races: BTreeMap<RaceId, Race>,
    /// (player, map) -> race.
    race_index: HashMap<(PlayerId, MapId), RaceId>,
    /// Maps with submissions since the last recompute pass.
    updated_maps: BTreeSet<MapId>,
    next_map_id: MapId,
    next_player_id: PlayerId,
    next_race_id: RaceId,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            next_map_id: 1,
            next_player_id: 1,
            next_race_id: 1,
            ..Self::default()
        }
    }

    pub fn add_map(&mut self, name: impl Into<String>) -> MapId {
        let id = self.next_map_id;
        self.next_map_id += 1;
        self.maps.insert(id, Map::new(id, name));
        id
    }

    pub fn set_map_enabled(&mut self, map_id: MapId, enabled: bool) -> StoreResult<()> {
        let map = self
            .maps
            .get_mut(&map_id)
            .ok_or(StoreError::UnknownMap(map_id))?;
        map.enabled = enabled;
        Ok(())
    }

    pub fn add_player(&mut self, username: impl Into<String>) -> PlayerId {
        let id = self.next_player_id;
        self.next_player_id += 1;
        self.players.insert(id, Player::new(id, username));
        id
    }

    /// Record a submission for `player_id` on `map_id`.
    ///
    /// The player's race on the map is created on first submission. The
    /// playtime is added to the race and player totals; `time` replaces the
    /// stored time only if it is faster. The map is queued for recompute.
    pub fn submit_race(
        &mut self,
        player_id: PlayerId,
        map_id: MapId,
        time: Option<u64>,
        playtime: u64,
        submitted_at: u64,
    ) -> StoreResult<RaceId> {
        let map = self.maps.get(&map_id).ok_or(StoreError::UnknownMap(map_id))?;
        if !map.enabled {
            return Err(StoreError::MapDisabled(map_id));
        }
        let player = self
            .players
            .get_mut(&player_id)
            .ok_or(StoreError::UnknownPlayer(player_id))?;
        player.playtime = player.playtime.saturating_add(playtime);
        player.races = player.races.saturating_add(1);

        let race_id = match self.race_index.get(&(player_id, map_id)) {
            Some(&id) => id,
            None => {
                let id = self.next_race_id;
                self.next_race_id += 1;
                self.races.insert(id, Race::new(id, map_id, player_id));
                self.race_index.insert((player_id, map_id), id);
                id
            },
        };
        let race = self
            .races
            .get_mut(&race_id)
            .ok_or(StoreError::UnknownRace(race_id))?;

        race.playtime = race.playtime.saturating_add(playtime);
        race.updated_at = submitted_at;
        if let Some(new_time) = time
            && race.time.is_none_or(|best| new_time < best)
        {
            race.time = Some(new_time);
        }

        self.updated_maps.insert(map_id);
        tracing::debug!(race_id, player_id, map_id, ?time, playtime, "Race submitted");
        Ok(race_id)
    }

    /// Drain the set of maps submitted to since the last call, ascending.
    pub fn take_updated_maps(&mut self) -> Vec<MapId> {
        std::mem::take(&mut self.updated_maps).into_iter().collect()
    }

    /// Queue a map for the next recompute pass.
    pub fn mark_updated(&mut self, map_id: MapId) {
        self.updated_maps.insert(map_id);
    }

    pub fn map_ids(&self) -> Vec<MapId> {
        self.maps.keys().copied().collect()
    }

    pub fn map(&self, map_id: MapId) -> Option<&Map> {
        self.maps.get(&map_id)
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&Player> {
        self.players.get(&player_id)
    }

    pub fn race(&self, race_id: RaceId) -> Option<&Race> {
        self.races.get(&race_id)
    }

    pub fn race_for(&self, player_id: PlayerId, map_id: MapId) -> Option<&Race> {
        self.race_index
            .get(&(player_id, map_id))
            .and_then(|id| self.races.get(id))
    }

    /// The fastest completed race on a map.
    pub fn record(&self, map_id: MapId) -> Option<&Race> {
        self.races
            .values()
            .filter(|r| r.map_id == map_id)
            .filter_map(|r| r.time.map(|t| (t, r)))
            .min_by_key(|&(t, r)| (t, r.id))
            .map(|(_, r)| r)
    }

    /// Players by total points, highest first.
    pub fn leaderboard(&self, limit: usize) -> Vec<&Player> {
        let mut players: Vec<&Player> = self.players.values().collect();
        players.sort_by(|a, b| b.points.total_cmp(&a.points).then(a.id.cmp(&b.id)));
        players.truncate(limit);
        players
    }

    /// Clear every score and player total ahead of a full rebuild.
    pub fn reset_scores(&mut self) {
        for race in self.races.values_mut() {
            race.points = None;
            race.rank = None;
        }
        for player in self.players.values_mut() {
            player.points = 0.0;
            player.maps_finished = 0;
        }
        tracing::info!(
            races = self.races.len(),
            players = self.players.len(),
            "All scores reset"
        );
    }

    pub fn stats(&self) -> StoreStats {
        StoreStats {
            maps: self.maps.len(),
            players: self.players.len(),
            races: self.races.len(),
            completed_races: self.races.values().filter(|r| r.is_completed()).count(),
            updated_maps: self.updated_maps.len(),
        }
    }

    pub fn records(&self) -> StoreRecords {
        StoreRecords {
            maps: self.maps.values().cloned().collect(),
            players: self.players.values().cloned().collect(),
            races: self.races.values().cloned().collect(),
            updated_maps: self.updated_maps.iter().copied().collect(),
        }
    }

    /// Rebuild a store from records, restoring the id counters past the
    /// highest ids present.
    pub fn from_records(records: StoreRecords) -> Self {
        let mut store = Self::new();
        for map in records.maps {
            store.next_map_id = store.next_map_id.max(map.id + 1);
            store.maps.insert(map.id, map);
        }
        for player in records.players {
            store.next_player_id = store.next_player_id.max(player.id + 1);
            store.players.insert(player.id, player);
        }
        for race in records.races {
            store.next_race_id = store.next_race_id.max(race.id + 1);
            store
                .race_index
                .insert((race.player_id, race.map_id), race.id);
            store.races.insert(race.id, race);
        }
        store.updated_maps = records.updated_maps.into_iter().collect();
        store
    }
}

impl LeaderboardStore for MemoryStore {
    fn races_on_map(&self, map_id: MapId) -> StoreResult<Vec<Race>> {
        if !self.maps.contains_key(&map_id) {
            return Err(StoreError::UnknownMap(map_id));
        }
        Ok(self
            .races
            .values()
            .filter(|r| r.map_id == map_id)
            .cloned()
            .collect())
    }

    fn players(&self, ids: &[PlayerId]) -> StoreResult<HashMap<PlayerId, Player>> {
        ids.iter()
            .map(|&id| {
                self.players
                    .get(&id)
                    .cloned()
                    .map(|p| (id, p))
                    .ok_or(StoreError::UnknownPlayer(id))
            })
            .collect()
    }

    fn commit_score(&mut self, race: &Race, player: Option<&Player>) -> StoreResult<()> {
        if let Some(player) = player
            && !self.players.contains_key(&player.id)
        {
            return Err(StoreError::UnknownPlayer(player.id));
        }
        let stored = self
            .races
            .get_mut(&race.id)
            .ok_or(StoreError::UnknownRace(race.id))?;
        stored.points = race.points;
        stored.rank = race.rank;

        if let Some(player) = player
            && let Some(stored) = self.players.get_mut(&player.id)
        {
            stored.points = player.points;
            stored.maps_finished = player.maps_finished;
        }
        Ok(())
    }
}
