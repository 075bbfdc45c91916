use racesow_ranker::config::RankerConfig;
use racesow_ranker::job::spawn_recompute_job;
use racesow_ranker::{build_ranker, init_tracing};

#[tokio::main]
async fn main() {
    // Config loading logs before the subscriber exists are dropped; the
    // effective settings are logged once tracing is up.
    let config = RankerConfig::load();
    init_tracing(&config.log_format);
    tracing::info!(
        snapshot = %config.snapshot.path,
        intervals = config.schedule.intervals.len(),
        "Configuration loaded"
    );

    let reset_all = std::env::args().skip(1).any(|a| a == "--reset-all");

    let ranker = match build_ranker(config) {
        Ok(ranker) => ranker,
        Err(e) => {
            tracing::error!(error = %e, "Ranker failed to start");
            std::process::exit(1);
        },
    };
    tracing::info!("Racesow ranker starting");

    if reset_all {
        let report = ranker.reset_all().await;
        tracing::info!(failed = ?report.failed, "Startup reset finished");
        if ranker.state().config.snapshot.save_after_pass
            && let Err(e) = ranker.save_snapshot().await
        {
            tracing::error!(error = %e, "Failed to save snapshot after reset");
        }
    }

    let job = spawn_recompute_job(ranker.clone()).await;

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
    tracing::info!("Shutting down");
    if let Some(job) = job {
        job.abort();
    }
    if let Err(e) = ranker.save_snapshot().await {
        tracing::error!(error = %e, "Failed to save snapshot on shutdown");
    }
}
