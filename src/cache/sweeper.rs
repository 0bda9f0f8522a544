//! Background sweep of expired entries.
//!
//! Read-time eviction only reclaims keys somebody asks for again; cold keys
//! would otherwise sit in memory until disposal. The sweeper walks every
//! namespace on a fixed period and drops whatever has expired.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Weak;
use std::time::Duration;

use metrics::histogram;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior, interval_at};
use tracing::{error, info, trace};

use super::error::CacheError;
use super::registry::CacheRegistry;

const METRIC_CACHE_SWEEP_MS: &str = "scenecache_cache_sweep_ms";

/// Handle to a running sweep task.
///
/// Dropping the handle also stops the task, since the task exits once the
/// shutdown sender goes away.
pub(crate) struct Sweeper {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// Spawn the sweep loop on the current tokio runtime.
    ///
    /// The task only holds a weak reference, so it never keeps a dropped
    /// registry alive.
    pub(crate) fn spawn(
        registry: Weak<CacheRegistry>,
        period: Duration,
    ) -> Result<Self, CacheError> {
        let runtime = Handle::try_current().map_err(|_| CacheError::SchedulerUnavailable)?;
        let (shutdown, shutdown_rx) = watch::channel(false);
        let task = runtime.spawn(sweep_loop(registry, period, shutdown_rx));
        Ok(Self { shutdown, task })
    }

    pub(crate) fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    pub(crate) fn stop(self) {
        // The receiver is gone if the task already exited; nothing to signal then.
        let _ = self.shutdown.send(true);
    }
}

async fn sweep_loop(
    registry: Weak<CacheRegistry>,
    period: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    info!(
        period_ms = period.as_millis() as u64,
        "Cache sweep started"
    );

    loop {
        tokio::select! {
            biased;

            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }

            _ = ticker.tick() => {
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                sweep_once(|| registry.sweep_tick());
            }
        }
    }

    info!("Cache sweep stopped");
}

/// Run one tick. A panic inside the tick is logged and the loop carries on.
fn sweep_once<F>(tick: F)
where
    F: FnOnce() -> usize,
{
    let started_at = std::time::Instant::now();

    match catch_unwind(AssertUnwindSafe(tick)) {
        Ok(removed) => trace!(removed, "Cache sweep tick finished"),
        Err(_) => error!("Cache sweep tick panicked; retrying on the next tick"),
    }

    histogram!(METRIC_CACHE_SWEEP_MS).record(started_at.elapsed().as_secs_f64() * 1000.0);
}
