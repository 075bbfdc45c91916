use serde::{Deserialize, Serialize};

pub type PlayerId = u64;
pub type MapId = u64;
pub type RaceId = u64;

/// A player's record on one map: their best finish time (if any) and the
/// cumulative time spent attempting the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Race {
    pub id: RaceId,
    pub map_id: MapId,
    pub player_id: PlayerId,
    /// Best finish time in milliseconds. `None` if the map was never finished.
    pub time: Option<u64>,
    /// Cumulative playtime on the map in milliseconds.
    pub playtime: u64,
    /// `None` until the race is scored for the first time.
    pub points: Option<f64>,
    pub rank: Option<u32>,
    /// Unix milliseconds of the latest submission.
    pub updated_at: u64,
}

impl Race {
    pub fn new(id: RaceId, map_id: MapId, player_id: PlayerId) -> Self {
        Self {
            id,
            map_id,
            player_id,
            time: None,
            playtime: 0,
            points: None,
            rank: None,
            updated_at: 0,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.time.is_some()
    }
}

/// A player and their aggregate leaderboard totals.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: PlayerId,
    pub username: String,
    /// Sum of the points currently held by this player's races.
    pub points: f64,
    pub maps_finished: u32,
    pub playtime: u64,
    /// Number of submissions received.
    pub races: u32,
}

impl Player {
    pub fn new(id: PlayerId, username: impl Into<String>) -> Self {
        Self {
            id,
            username: username.into(),
            points: 0.0,
            maps_finished: 0,
            playtime: 0,
            races: 0,
        }
    }

    pub fn add_points(&mut self, points: f64) {
        self.points += points;
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Map {
    pub id: MapId,
    pub name: String,
    pub enabled: bool,
}

impl Map {
    pub fn new(id: MapId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            enabled: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_race_is_unscored_and_incomplete() {
        let race = Race::new(1, 2, 3);
        assert!(!race.is_completed());
        assert!(race.points.is_none());
        assert!(race.rank.is_none());
    }

    #[test]
    fn race_serde_keeps_missing_points_distinct_from_zero() {
        let mut race = Race::new(1, 1, 1);
        let json = serde_json::to_string(&race).unwrap();
        let decoded: Race = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.points, None);

        race.points = Some(0.0);
        let json = serde_json::to_string(&race).unwrap();
        let decoded: Race = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded.points, Some(0.0));
    }

    #[test]
    fn add_points_accumulates_negative_deltas() {
        let mut player = Player::new(7, "rocketman");
        player.add_points(10.0);
        player.add_points(-2.5);
        assert!((player.points - 7.5).abs() < f64::EPSILON);
    }
}
