use chrono::{DateTime, Utc};
use serde::Serialize;

use racesow_core::store::StoreStats;

/// Point-in-time summary of the ranker, logged after every pass.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub stats: StoreStats,
    pub last_pass: Option<DateTime<Utc>>,
    /// When the periodic job runs next, if it has run at least once.
    pub next_pass: Option<DateTime<Utc>>,
    pub leaders: Vec<LeaderEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderEntry {
    pub username: String,
    pub points: f64,
    pub maps_finished: u32,
}

impl StatusReport {
    pub fn log(&self) {
        let next = self
            .next_pass
            .map(|t| t.to_rfc3339())
            .unwrap_or_else(|| "not scheduled".to_string());
        tracing::info!(
            maps = self.stats.maps,
            players = self.stats.players,
            races = self.stats.races,
            completed = self.stats.completed_races,
            pending_maps = self.stats.updated_maps,
            next_pass = %next,
            "Ranker status"
        );
        for (rank, leader) in self.leaders.iter().enumerate() {
            tracing::debug!(
                rank = rank + 1,
                username = %leader.username,
                points = leader.points,
                maps_finished = leader.maps_finished,
                "Leader"
            );
        }
    }
}
