//! Synthetic editor workload: several collaborators share one registry the
//! way the viewport, material editor and texture browser do.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};
use std::time::Duration;

use futures::stream::{self, StreamExt, TryStreamExt};
use serde::Serialize;
use tokio::time::{Instant, sleep};
use tracing::{debug, info};

use crate::{
    cache::{CacheRegistry, StatsReport},
    config::SoakArgs,
    domain::{
        material::{Color3, Material},
        mesh::Mesh,
        texture::Texture,
    },
};

use super::error::AppError;

pub const PAYLOAD_NAMESPACE: &str = "payloads";

const OPS_PER_PAUSE: u64 = 32;
const PAUSE: Duration = Duration::from_millis(1);
const DELETE_EVERY: u64 = 61;

#[derive(Debug, Clone, Copy)]
pub struct SoakPlan {
    pub duration: Duration,
    pub workers: usize,
    pub keys: usize,
}

impl From<&SoakArgs> for SoakPlan {
    fn from(args: &SoakArgs) -> Self {
        Self {
            duration: Duration::from_secs(args.duration_secs),
            workers: args.workers.max(1),
            keys: args.keys.max(1),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SoakOutcome {
    pub workers: usize,
    pub operations: u64,
    pub elapsed_ms: u64,
    /// Entries removed by the closing cleanup pass.
    pub swept: usize,
    pub report: StatsReport,
}

/// Run `plan.workers` concurrent collaborators against `registry` until the
/// plan's duration has elapsed.
pub async fn run(registry: Arc<CacheRegistry>, plan: SoakPlan) -> Result<SoakOutcome, AppError> {
    let started_at = Instant::now();
    let deadline = started_at + plan.duration;
    let operations = Arc::new(AtomicU64::new(0));

    info!(
        target = "scenecache::soak",
        workers = plan.workers,
        keys = plan.keys,
        duration_ms = plan.duration.as_millis() as u64,
        "Starting cache soak"
    );

    let total_handle = operations.clone();
    let shared = registry.clone();
    stream::iter(0..plan.workers)
        .map(Ok::<usize, AppError>)
        .try_for_each_concurrent(Some(plan.workers), move |worker| {
            let registry = shared.clone();
            let counter = total_handle.clone();
            async move {
                let done = tokio::spawn(drive_worker(registry, worker, plan.keys, deadline))
                    .await
                    .map_err(|err| AppError::unexpected(format!("soak worker failed: {err}")))??;
                counter.fetch_add(done, Ordering::Relaxed);
                Ok(())
            }
        })
        .await?;

    let swept = registry.cleanup();
    let outcome = SoakOutcome {
        workers: plan.workers,
        operations: operations.load(Ordering::Relaxed),
        elapsed_ms: started_at.elapsed().as_millis() as u64,
        swept,
        report: registry.report(),
    };

    info!(
        target = "scenecache::soak",
        operations = outcome.operations,
        swept = outcome.swept,
        entries = outcome.report.total_entries,
        "Cache soak finished"
    );
    Ok(outcome)
}

async fn drive_worker(
    registry: Arc<CacheRegistry>,
    worker: usize,
    keys: usize,
    deadline: Instant,
) -> Result<u64, AppError> {
    let mut step: u64 = 0;
    while Instant::now() < deadline {
        let slot = (worker + step as usize * 7) % keys;
        exercise(&registry, step, slot)?;
        step += 1;
        if step % OPS_PER_PAUSE == 0 {
            sleep(PAUSE).await;
        }
    }

    debug!(
        target = "scenecache::soak",
        worker,
        operations = step,
        "Soak worker stopped"
    );
    Ok(step)
}

fn exercise(registry: &CacheRegistry, step: u64, slot: usize) -> Result<(), AppError> {
    match step % 4 {
        0 => {
            let size = 1.0 + slot as f32;
            let mesh = Mesh::cuboid(format!("mesh-{slot}"), size, size * 0.5, size * 2.0);
            registry.bounds().get_or_compute(&mesh);
        }
        1 => {
            let id = format!("material-{slot}");
            if registry.materials().get(&id).is_none() {
                let shade = (slot % 10) as f32 / 10.0;
                let live = Material::new(id.as_str(), format!("Material {slot}"))
                    .with_diffuse(Color3::new(shade, 0.5, 1.0 - shade));
                registry.materials().set(&id, &live)?;
            }
        }
        2 => {
            let id = format!("texture-{slot}");
            if registry.textures().get(&id).is_none() {
                let live = Texture::solid(id.as_str(), 4, 4, [slot as u8, 0, 0, 255]);
                registry.textures().set(&id, &live)?;
            }
        }
        _ => {
            let key = format!("payload-{slot}");
            match registry.get::<u64>(PAYLOAD_NAMESPACE, &key) {
                Some(value) => registry.set(PAYLOAD_NAMESPACE, &key, value + 1),
                None => registry.set(PAYLOAD_NAMESPACE, &key, 0_u64),
            }
        }
    }

    if step % DELETE_EVERY == 0 {
        registry.delete(PAYLOAD_NAMESPACE, &format!("payload-{slot}"));
    }
    Ok(())
}
