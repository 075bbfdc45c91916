use thiserror::Error;

use racesow_core::StoreError;

use crate::config::ConfigError;
use crate::snapshot::SnapshotError;

#[derive(Debug, Error)]
pub enum RankerError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
}
