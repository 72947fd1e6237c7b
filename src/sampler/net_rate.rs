// Network throughput estimation with prior-sample fallback.
//
// Instantaneous per-second counters read zero on low-resolution polling
// windows; when both directions are zero the estimator recovers a rate from
// cumulative byte deltas against the previous sample, bounded to reject
// stale baselines and divide-by-near-zero intervals.

use crate::models::{NetworkSample, Throughput};

/// Fallback deltas are only trusted inside this interval window (seconds).
const MIN_FALLBACK_INTERVAL_SECS: f64 = 0.5;
const MAX_FALLBACK_INTERVAL_SECS: f64 = 10.0;

/// Owns the prior-sample cell. The read-compute-write span holds the lock so
/// concurrent callers cannot interleave and corrupt the baseline.
pub struct RateEstimator {
    prev: std::sync::Mutex<Option<NetworkSample>>,
}

impl Default for RateEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl RateEstimator {
    pub fn new() -> Self {
        Self {
            prev: std::sync::Mutex::new(None),
        }
    }

    /// Seed the baseline from a best-effort startup read. Failures upstream
    /// simply leave the cell empty.
    pub fn prime(&self, sample: NetworkSample) {
        if let Ok(mut guard) = self.prev.lock() {
            *guard = Some(sample);
        }
    }

    /// Estimate throughput for the current sample and replace the baseline.
    /// The baseline is replaced unconditionally, even when the fallback path
    /// was not taken, so the next tick always compares against the freshest
    /// sample.
    pub fn estimate(&self, current: &NetworkSample) -> Throughput {
        let mut download_kbs = current.rx_rate / 1024.0;
        let mut upload_kbs = current.tx_rate / 1024.0;

        let mut guard = match self.prev.lock() {
            Ok(g) => g,
            Err(e) => {
                tracing::warn!(error = %e, "rate estimator lock poisoned, using instantaneous rates");
                return Throughput {
                    upload_kbs: upload_kbs.max(0.0),
                    download_kbs: download_kbs.max(0.0),
                };
            }
        };

        if download_kbs == 0.0
            && upload_kbs == 0.0
            && let Some(prev) = guard.as_ref()
            && prev.interface == current.interface
            && prev.timestamp_ms < current.timestamp_ms
        {
            let interval_secs = (current.timestamp_ms - prev.timestamp_ms) as f64 / 1000.0;
            if (MIN_FALLBACK_INTERVAL_SECS..=MAX_FALLBACK_INTERVAL_SECS).contains(&interval_secs)
                && current.rx_bytes >= prev.rx_bytes
                && current.tx_bytes >= prev.tx_bytes
            {
                let rx_delta = current.rx_bytes - prev.rx_bytes;
                let tx_delta = current.tx_bytes - prev.tx_bytes;
                download_kbs = rx_delta as f64 / interval_secs / 1024.0;
                upload_kbs = tx_delta as f64 / interval_secs / 1024.0;
            }
        }

        *guard = Some(current.clone());

        Throughput {
            upload_kbs: upload_kbs.max(0.0),
            download_kbs: download_kbs.max(0.0),
        }
    }
}

/// Pick the interface used for throughput reporting: first interface that is
/// up and neither loopback nor a virtual bridge/veth/docker bridge; else the
/// first available.
pub fn primary_interface(samples: &[NetworkSample]) -> Option<&NetworkSample> {
    samples
        .iter()
        .find(|s| {
            s.oper_state == "up"
                && s.interface != "lo"
                && !s.interface.starts_with("docker")
                && !s.interface.starts_with("veth")
                && !s.interface.starts_with("br-")
        })
        .or_else(|| samples.first())
}
