//! Periodic retention sweep over transient signature storage.

use std::time::{Duration, SystemTime};

use signlink_core::store::{Storage, SweepReport};

/// Run one sweep off the async runtime.
pub async fn sweep_once(storage: Storage, retention: Duration) -> anyhow::Result<SweepReport> {
    let report = tokio::task::spawn_blocking(move || storage.sweep(retention, SystemTime::now()))
        .await
        .map_err(|e| anyhow::anyhow!("task join error: {e}"))??;
    Ok(report)
}

/// Sweep immediately, then every `every`, for the life of the runtime.
pub fn spawn_sweeper(
    storage: Storage,
    retention: Duration,
    every: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if let Err(e) = sweep_once(storage.clone(), retention).await {
                tracing::warn!(error = %e, dir = %storage.dir().display(), "signature sweep failed");
            }
        }
    })
}
