// Worker tests: centralized ticker broadcasting to subscribers, with a stub
// sampler so tick outcomes are deterministic.

mod common;

use hostpulse::models::MetricsSnapshot;
use hostpulse::sampler::Sample;
use hostpulse::worker::{WorkerConfig, WorkerDeps, spawn};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use tokio::sync::broadcast;
use tokio::time::{Duration, timeout};

/// Emits snapshots whose timestamp is the 1-based tick number; the tick in
/// `fail_on` produces None (source failure).
struct StubSampler {
    calls: AtomicU64,
    fail_on: u64,
}

impl StubSampler {
    fn new(fail_on: u64) -> Self {
        Self {
            calls: AtomicU64::new(0),
            fail_on,
        }
    }
}

impl Sample for StubSampler {
    fn sample(&self) -> impl std::future::Future<Output = Option<MetricsSnapshot>> + Send {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let fail_on = self.fail_on;
        async move {
            if n == fail_on {
                None
            } else {
                Some(common::test_snapshot(n))
            }
        }
    }
}

async fn recv_snapshot(rx: &mut broadcast::Receiver<MetricsSnapshot>) -> MetricsSnapshot {
    timeout(Duration::from_secs(2), rx.recv())
        .await
        .expect("timed out waiting for snapshot")
        .expect("broadcast closed")
}

#[tokio::test]
async fn failed_tick_delivers_no_frame_and_both_clients_resume() {
    let sampler = Arc::new(StubSampler::new(2));
    let (tx, mut rx1) = broadcast::channel(16);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            sampler,
            tx: tx.clone(),
            ws_connections: Arc::new(AtomicUsize::new(2)),
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_ms: 20,
            stats_log_interval_secs: 3600,
        },
    );

    // First client sees tick 1, then tick 3: the failed tick 2 produced no
    // frame at all, not an error frame.
    let first = recv_snapshot(&mut rx1).await;
    assert_eq!(first.timestamp, 1);

    // Second client attaches later and must never observe tick 2 either.
    let mut rx2 = tx.subscribe();
    let next1 = recv_snapshot(&mut rx1).await;
    assert_eq!(next1.timestamp, 3);
    let next2 = recv_snapshot(&mut rx2).await;
    assert!(next2.timestamp >= 3);
    assert_ne!(next2.timestamp, 2);

    let _ = shutdown_tx.send(());
    handle.await.unwrap();
}

#[tokio::test]
async fn dropping_one_subscriber_does_not_affect_the_other() {
    let sampler = Arc::new(StubSampler::new(0));
    let (tx, rx1) = broadcast::channel(16);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            sampler,
            tx: tx.clone(),
            ws_connections: Arc::new(AtomicUsize::new(2)),
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_ms: 20,
            stats_log_interval_secs: 3600,
        },
    );

    let mut rx2 = tx.subscribe();
    // Detach the first client; dropping the receiver is the detach, and the
    // worker keeps delivering to the remaining one.
    drop(rx1);
    let a = recv_snapshot(&mut rx2).await;
    let b = recv_snapshot(&mut rx2).await;
    assert!(b.timestamp > a.timestamp);

    let _ = shutdown_tx.send(());
    handle.await.unwrap();
}

#[tokio::test]
async fn worker_keeps_ticking_with_no_subscribers() {
    let sampler = Arc::new(StubSampler::new(0));
    let (tx, rx) = broadcast::channel(16);
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            sampler,
            tx: tx.clone(),
            ws_connections: Arc::new(AtomicUsize::new(0)),
            shutdown_rx,
        },
        WorkerConfig {
            sample_interval_ms: 10,
            stats_log_interval_secs: 3600,
        },
    );

    drop(rx);
    tokio::time::sleep(Duration::from_millis(50)).await;
    // A late subscriber still receives fresh snapshots.
    let mut rx = tx.subscribe();
    let snapshot = recv_snapshot(&mut rx).await;
    assert!(snapshot.timestamp >= 1);

    let _ = shutdown_tx.send(());
    handle.await.unwrap();
}
