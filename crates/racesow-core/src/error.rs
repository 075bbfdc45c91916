use thiserror::Error;

use crate::model::{MapId, PlayerId, RaceId};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failures reported by a [`LeaderboardStore`](crate::store::LeaderboardStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unknown map {0}")]
    UnknownMap(MapId),

    #[error("unknown player {0}")]
    UnknownPlayer(PlayerId),

    #[error("unknown race {0}")]
    UnknownRace(RaceId),

    #[error("map {0} is disabled")]
    MapDisabled(MapId),

    #[error("storage backend error: {0}")]
    Backend(String),
}
