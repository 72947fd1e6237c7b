// Snapshot builder: one MetricsSnapshot per tick from the raw readings.

mod net_rate;

pub use net_rate::{RateEstimator, primary_interface};

use crate::models::*;
use crate::sysinfo_repo::{
    CpuReading, DiskReadings, HostReading, MemoryReading, ProcessReading, ProcessTable,
    SysinfoRepo, epoch_ms,
};
use std::sync::Arc;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Mounts that are pseudo filesystems, never shown on the dashboard.
const EXCLUDED_MOUNTS: [&str; 2] = ["/dev", "/sys/fs/cgroup"];

const TOP_PROCESS_COUNT: usize = 5;

/// Produces one snapshot per call. Implemented by [`MetricsSampler`]; the
/// worker is generic over it so tests can drive ticks with a stub.
pub trait Sample: Send + Sync + 'static {
    fn sample(&self) -> impl std::future::Future<Output = Option<MetricsSnapshot>> + Send;
}

pub struct MetricsSampler {
    repo: Arc<SysinfoRepo>,
    estimator: RateEstimator,
}

impl MetricsSampler {
    pub fn new(repo: Arc<SysinfoRepo>) -> Self {
        Self {
            repo,
            estimator: RateEstimator::new(),
        }
    }

    /// Best-effort startup read to seed the estimator baseline; a failure
    /// just leaves it empty.
    pub async fn prime(&self) {
        match self.repo.get_network_samples().await {
            Ok(samples) => {
                if let Some(primary) = primary_interface(&samples) {
                    self.estimator.prime(primary.clone());
                }
            }
            Err(e) => {
                tracing::debug!(error = %e, "estimator priming read failed, baseline left empty");
            }
        }
    }

    /// One full sampling tick. All source reads are issued concurrently; any
    /// failure skips the whole tick (returns None), it never propagates.
    pub async fn sample(&self) -> Option<MetricsSnapshot> {
        let (cpu, memory, disks, network, processes, host) = tokio::join!(
            self.repo.get_cpu_reading(),
            self.repo.get_memory_reading(),
            self.repo.get_disk_readings(),
            self.repo.get_network_samples(),
            self.repo.get_process_readings(),
            self.repo.get_host_reading(),
        );
        let cpu = ok_or_skip(cpu, "get_cpu_reading")?;
        let memory = ok_or_skip(memory, "get_memory_reading")?;
        let disks = ok_or_skip(disks, "get_disk_readings")?;
        let network = ok_or_skip(network, "get_network_samples")?;
        let processes = ok_or_skip(processes, "get_process_readings")?;
        let host = ok_or_skip(host, "get_host_reading")?;

        Some(build_snapshot(
            cpu,
            memory,
            disks,
            &network,
            processes,
            host,
            &self.estimator,
        ))
    }

    /// Full process list for the on-demand endpoint; empty on source failure.
    pub async fn process_list(&self) -> Vec<ProcessSample> {
        match self.repo.get_process_readings().await {
            Ok(table) => {
                let total = table.total_memory;
                table
                    .processes
                    .into_iter()
                    .map(|p| process_sample(p, total))
                    .collect()
            }
            Err(e) => {
                tracing::warn!(error = %e, operation = "get_process_readings", "process list failed");
                Vec::new()
            }
        }
    }
}

impl Sample for MetricsSampler {
    fn sample(&self) -> impl std::future::Future<Output = Option<MetricsSnapshot>> + Send {
        MetricsSampler::sample(self)
    }
}

fn ok_or_skip<T>(result: anyhow::Result<T>, operation: &'static str) -> Option<T> {
    match result {
        Ok(v) => Some(v),
        Err(e) => {
            tracing::warn!(error = %e, operation, "metrics source failed, tick skipped");
            None
        }
    }
}

fn build_snapshot(
    cpu: CpuReading,
    memory: MemoryReading,
    disks: DiskReadings,
    network: &[NetworkSample],
    processes: ProcessTable,
    host: HostReading,
    estimator: &RateEstimator,
) -> MetricsSnapshot {
    let usage_percent = round1(cpu.usage_percent.clamp(0.0, 100.0));
    let cpu_metrics = CpuMetrics {
        usage_percent,
        cores: core_count(cpu.physical_cores, cpu.logical_cores),
        temp_c: cpu.temperature.map(round1),
        freq_ghz: (cpu.frequency_mhz > 0).then(|| round2(cpu.frequency_mhz as f64 / 1000.0)),
        model: cpu.model,
    };

    MetricsSnapshot {
        cpu: cpu_metrics,
        ram: ram_metrics(&memory),
        disks: disk_metrics(&disks.partitions),
        disk_io: disk_io_metrics(&disks.io, disks.interval_secs),
        network: network_metrics(network, estimator),
        load: LoadMetrics {
            current: usage_percent,
            one: host.load_one,
            five: host.load_five,
            fifteen: host.load_fifteen,
        },
        uptime_seconds: host.uptime_secs,
        uptime_formatted: format_uptime(host.uptime_secs),
        hostname: host.hostname,
        platform: host.platform,
        arch: host.arch,
        kernel: host.kernel,
        timestamp: epoch_ms(),
        top_processes: top_processes(processes),
    }
}

/// Physical cores when known, else logical, else 1.
pub fn core_count(physical: u32, logical: u32) -> u32 {
    if physical > 0 {
        physical
    } else if logical > 0 {
        logical
    } else {
        1
    }
}

/// Platform "used" over-counts reclaimable buffer/cache; report
/// used = rawUsed - bufferCache where rawUsed = total - free and
/// bufferCache = available - free.
pub fn ram_metrics(memory: &MemoryReading) -> RamMetrics {
    let total = memory.total as f64;
    let free = memory.free as f64;
    let cache = memory.available.saturating_sub(memory.free) as f64;
    let raw_used = memory.total.saturating_sub(memory.free) as f64;
    let used = (raw_used - cache).max(0.0);
    let usage_percent = if memory.total > 0 {
        used / total * 100.0
    } else {
        0.0
    };
    RamMetrics {
        total_gb: round2(total / GIB),
        used_gb: round2(used / GIB),
        free_gb: round2(free / GIB),
        cache_gb: round2(cache / GIB),
        available_gb: round2(memory.available as f64 / GIB),
        usage_percent: round1(usage_percent),
        swap_total_gb: round2(memory.swap_total as f64 / GIB),
        swap_used_gb: round2(memory.swap_used as f64 / GIB),
    }
}

/// Pseudo filesystems and zero-size entries are filtered out; the output is
/// always a subset of the input.
pub fn disk_metrics(
    partitions: &[crate::sysinfo_repo::PartitionReading],
) -> Vec<DiskMetrics> {
    partitions
        .iter()
        .filter(|p| !EXCLUDED_MOUNTS.contains(&p.mount.as_str()) && p.total > 0)
        .map(|p| {
            let used = p.total.saturating_sub(p.available);
            DiskMetrics {
                filesystem: p.filesystem.clone(),
                size_gb: round1(p.total as f64 / GIB),
                used_gb: round1(used as f64 / GIB),
                available_gb: round1(p.available as f64 / GIB),
                usage_percent: round1(used as f64 / p.total as f64 * 100.0),
                mount: p.mount.clone(),
                type_: if p.type_.is_empty() {
                    "unknown".into()
                } else {
                    p.type_.clone()
                },
            }
        })
        .collect()
}

pub fn disk_io_metrics(
    io: &[crate::sysinfo_repo::DiskIoReading],
    interval_secs: f64,
) -> Vec<DiskIoMetrics> {
    io.iter()
        .map(|d| {
            let (read_kbs, write_kbs) = if interval_secs > 0.0 {
                (
                    d.read_bytes_delta as f64 / interval_secs / KIB,
                    d.written_bytes_delta as f64 / interval_secs / KIB,
                )
            } else {
                (0.0, 0.0)
            };
            DiskIoMetrics {
                device: d.device.clone(),
                read_kbs: round1(read_kbs),
                write_kbs: round1(write_kbs),
                read_total_mb: round1(d.read_bytes_total as f64 / MIB),
                write_total_mb: round1(d.written_bytes_total as f64 / MIB),
            }
        })
        .collect()
}

fn network_metrics(samples: &[NetworkSample], estimator: &RateEstimator) -> NetworkMetrics {
    match primary_interface(samples) {
        Some(primary) => {
            let throughput = estimator.estimate(primary);
            NetworkMetrics {
                interface: primary.interface.clone(),
                upload_kbs: round1(throughput.upload_kbs),
                download_kbs: round1(throughput.download_kbs),
                total_tx_mb: round1(primary.tx_bytes as f64 / MIB),
                total_rx_mb: round1(primary.rx_bytes as f64 / MIB),
                state: primary.oper_state.clone(),
            }
        }
        None => NetworkMetrics {
            interface: "N/A".into(),
            upload_kbs: 0.0,
            download_kbs: 0.0,
            total_tx_mb: 0.0,
            total_rx_mb: 0.0,
            state: "unknown".into(),
        },
    }
}

/// Top processes by CPU, descending; equal CPU breaks ties by pid so the
/// selection is deterministic.
pub fn top_processes(table: ProcessTable) -> Vec<ProcessSample> {
    let ProcessTable {
        total_memory,
        mut processes,
    } = table;
    processes.sort_by(|a, b| {
        b.cpu_percent
            .partial_cmp(&a.cpu_percent)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then(a.pid.cmp(&b.pid))
    });
    processes
        .into_iter()
        .take(TOP_PROCESS_COUNT)
        .map(|p| process_sample(p, total_memory))
        .collect()
}

fn process_sample(reading: ProcessReading, total_memory_bytes: u64) -> ProcessSample {
    ProcessSample {
        pid: reading.pid,
        user: reading.user,
        cpu_percent: round1(reading.cpu_percent),
        memory_mb: round1(reading.mem_percent / 100.0 * total_memory_bytes as f64 / MIB),
        command: reading.command,
    }
}

/// "Nd Nh Nm" with leading components omitted when zero.
pub fn format_uptime(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    if days > 0 {
        format!("{}d {}h {}m", days, hours, minutes)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else {
        format!("{}m", minutes)
    }
}
