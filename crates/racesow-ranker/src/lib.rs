pub mod config;
pub mod error;
pub mod job;
pub mod ranker;
pub mod schedule;
pub mod snapshot;
pub mod state;
pub mod status;

use tracing_subscriber::EnvFilter;

use config::RankerConfig;
use error::RankerError;
use ranker::Ranker;
use state::AppState;

/// Build the ranker from a config, restoring the store from its snapshot
/// when one exists.
pub fn build_ranker(config: RankerConfig) -> Result<Ranker, RankerError> {
    config.validate()?;
    let snapshots = snapshot::SnapshotManager::new(&config.snapshot.path);
    let store = match snapshots.load()? {
        Some(store) => store,
        None => {
            tracing::info!(path = %snapshots.path().display(), "No snapshot found, starting empty");
            racesow_core::MemoryStore::new()
        },
    };
    Ok(Ranker::new(AppState::new(config, store)))
}

/// Install the global tracing subscriber in the configured format.
pub fn init_tracing(log_format: &str) {
    let builder = tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env());
    if log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }
}
