use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::ranker::{PassReport, Ranker};

/// Number of leaders included in the status log after each pass.
const STATUS_LEADERS: usize = 10;

/// Spawn the periodic "recompute updated maps" job.
///
/// Runs at the shortest configured interval, starting immediately. Returns
/// `None` when no interval is configured.
pub async fn spawn_recompute_job(ranker: Ranker) -> Option<JoinHandle<()>> {
    let period = ranker.state().schedule.read().await.tick_interval()?;
    tracing::info!(period_secs = period.as_secs(), "Recompute job scheduled");

    Some(tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            run_pass(&ranker).await;
        }
    }))
}

/// One pass of the job: recompute, persist if anything moved, log status.
pub async fn run_pass(ranker: &Ranker) -> PassReport {
    let report = ranker.recompute_updated().await;

    if report.changed() && ranker.state().config.snapshot.save_after_pass {
        if let Err(e) = ranker.save_snapshot().await {
            tracing::error!(error = %e, "Failed to save snapshot after recompute");
        }
    }

    ranker.status(STATUS_LEADERS).await.log();
    report
}
