// Per-tick metrics snapshot and its sub-structs

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuMetrics {
    pub usage_percent: f64,
    pub cores: u32,
    /// Celsius; None when the platform exposes no usable sensor.
    pub temp_c: Option<f64>,
    /// GHz; None when the frequency reads zero.
    pub freq_ghz: Option<f64>,
    pub model: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RamMetrics {
    pub total_gb: f64,
    pub used_gb: f64,
    pub free_gb: f64,
    pub cache_gb: f64,
    pub available_gb: f64,
    pub usage_percent: f64,
    pub swap_total_gb: f64,
    pub swap_used_gb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskMetrics {
    pub filesystem: String,
    pub size_gb: f64,
    pub used_gb: f64,
    pub available_gb: f64,
    pub usage_percent: f64,
    pub mount: String,
    #[serde(rename = "type")]
    pub type_: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiskIoMetrics {
    pub device: String,
    pub read_kbs: f64,
    pub write_kbs: f64,
    pub read_total_mb: f64,
    pub write_total_mb: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkMetrics {
    pub interface: String,
    pub upload_kbs: f64,
    pub download_kbs: f64,
    pub total_tx_mb: f64,
    pub total_rx_mb: f64,
    pub state: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadMetrics {
    /// Instantaneous CPU usage percent (mirrors cpu.usagePercent).
    pub current: f64,
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessSample {
    pub pid: u32,
    pub user: String,
    pub cpu_percent: f64,
    pub memory_mb: f64,
    pub command: String,
}

/// One complete metrics record per sampling tick. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSnapshot {
    pub cpu: CpuMetrics,
    pub ram: RamMetrics,
    pub disks: Vec<DiskMetrics>,
    pub disk_io: Vec<DiskIoMetrics>,
    pub network: NetworkMetrics,
    pub load: LoadMetrics,
    pub uptime_seconds: u64,
    pub uptime_formatted: String,
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    pub kernel: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: u64,
    pub top_processes: Vec<ProcessSample>,
}
