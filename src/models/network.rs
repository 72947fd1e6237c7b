// Raw per-interface network counters and estimated throughput

use serde::{Deserialize, Serialize};

/// Point-in-time counters for one interface, as read from the metrics source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkSample {
    pub interface: String,
    pub timestamp_ms: u64,
    /// Cumulative bytes since boot.
    pub rx_bytes: u64,
    pub tx_bytes: u64,
    /// Instantaneous rates in bytes/sec; many platforms report zero on
    /// low-resolution polling windows.
    pub rx_rate: f64,
    pub tx_rate: f64,
    pub oper_state: String,
}

/// Estimated throughput in KB/s, always >= 0.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Throughput {
    pub upload_kbs: f64,
    pub download_kbs: f64,
}
