// Background sampling worker: one shared ticker, fan-out over a broadcast
// channel. Clients attach by subscribing and detach by dropping the receiver,
// so sampling happens once per tick regardless of client count.

use crate::models::MetricsSnapshot;
use crate::sampler::Sample;
use std::sync::Arc;
use std::sync::atomic::AtomicUsize;
use tokio::sync::broadcast;
use tokio::time::{Duration, Instant, interval};
use tracing::Instrument;

/// Rate limit for "no receivers" logging (avoid logging every second when no one is on /ws)
const NO_RECEIVERS_WARN_INTERVAL: Duration = Duration::from_secs(60);

/// Sampler, channel, and shutdown for the worker.
pub struct WorkerDeps<S: Sample> {
    pub sampler: Arc<S>,
    pub tx: broadcast::Sender<MetricsSnapshot>,
    pub ws_connections: Arc<AtomicUsize>,
    pub shutdown_rx: tokio::sync::oneshot::Receiver<()>,
}

/// Worker timing and logging config. Stats logging uses real-time intervals,
/// independent of sample_interval_ms.
pub struct WorkerConfig {
    pub sample_interval_ms: u64,
    /// How often to log app stats (real seconds).
    pub stats_log_interval_secs: u64,
}

pub fn spawn<S: Sample>(deps: WorkerDeps<S>, config: WorkerConfig) -> tokio::task::JoinHandle<()> {
    let WorkerDeps {
        sampler,
        tx,
        ws_connections,
        mut shutdown_rx,
    } = deps;
    let WorkerConfig {
        sample_interval_ms,
        stats_log_interval_secs,
    } = config;

    let worker_span = tracing::span!(tracing::Level::DEBUG, "worker", sample_interval_ms);
    tokio::spawn(async move {
        let mut tick = interval(Duration::from_millis(sample_interval_ms));
        tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut stats_log_tick = interval(Duration::from_secs(stats_log_interval_secs));
        stats_log_tick.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        let mut ticks_broadcast: u64 = 0;
        let mut ticks_skipped: u64 = 0;
        let mut last_no_receivers_warn: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = tick.tick() => {
                    // A failed tick produces no frame at all; clients resume
                    // on the next successful tick. The sampler logs the cause.
                    match sampler.sample().await {
                        Some(snapshot) => {
                            ticks_broadcast += 1;
                            if tx.send(snapshot).is_err() {
                                let should_warn = last_no_receivers_warn
                                    .is_none_or(|t| t.elapsed() >= NO_RECEIVERS_WARN_INTERVAL);
                                if should_warn {
                                    tracing::debug!(
                                        operation = "broadcast_snapshot",
                                        "No active WebSocket clients; broadcast channel has no receivers"
                                    );
                                    last_no_receivers_warn = Some(Instant::now());
                                }
                            }
                        }
                        None => {
                            ticks_skipped += 1;
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    tracing::debug!("Worker shutting down");
                    break;
                }
                _ = stats_log_tick.tick() => {
                    tracing::info!(
                        ws_clients = ws_connections.load(std::sync::atomic::Ordering::Relaxed),
                        ticks_broadcast,
                        ticks_skipped,
                        "app stats"
                    );
                }
            }
        }
    }.instrument(worker_span))
}
