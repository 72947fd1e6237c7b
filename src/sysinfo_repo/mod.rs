// Raw system readings via sysinfo

mod linux;

use crate::models::{NetworkSample, SystemInfo, round2};
use std::sync::Arc;
use std::time::Instant;
use sysinfo::{Components, Disks, Networks, ProcessesToUpdate, System, Users};
use tracing::instrument;

/// Point-in-time CPU reading. Usage is the global average across cores.
#[derive(Debug, Clone)]
pub struct CpuReading {
    pub usage_percent: f64,
    pub physical_cores: u32,
    pub logical_cores: u32,
    pub frequency_mhz: u64,
    pub model: String,
    pub temperature: Option<f64>,
}

/// Memory counters in bytes. Derived figures (cache, actual used) are
/// computed by the snapshot builder, not here.
#[derive(Debug, Clone)]
pub struct MemoryReading {
    pub total: u64,
    pub free: u64,
    pub available: u64,
    pub swap_total: u64,
    pub swap_used: u64,
}

#[derive(Debug, Clone)]
pub struct PartitionReading {
    pub filesystem: String,
    pub mount: String,
    pub type_: String,
    pub total: u64,
    pub available: u64,
}

/// Per-device IO counters: deltas since the previous disk refresh plus
/// cumulative totals.
#[derive(Debug, Clone)]
pub struct DiskIoReading {
    pub device: String,
    pub read_bytes_delta: u64,
    pub written_bytes_delta: u64,
    pub read_bytes_total: u64,
    pub written_bytes_total: u64,
}

#[derive(Debug, Clone)]
pub struct DiskReadings {
    pub partitions: Vec<PartitionReading>,
    pub io: Vec<DiskIoReading>,
    /// Seconds since the previous disk refresh; 0 on the first read.
    pub interval_secs: f64,
}

#[derive(Debug, Clone)]
pub struct ProcessReading {
    pub pid: u32,
    pub user: String,
    pub cpu_percent: f64,
    /// Percent of total memory, not a byte count.
    pub mem_percent: f64,
    pub command: String,
}

/// Process table plus the total memory it was read against (needed to derive
/// per-process MB figures from the percent form).
#[derive(Debug, Clone)]
pub struct ProcessTable {
    pub total_memory: u64,
    pub processes: Vec<ProcessReading>,
}

#[derive(Debug, Clone)]
pub struct HostReading {
    pub hostname: String,
    pub platform: String,
    pub arch: String,
    pub kernel: String,
    pub uptime_secs: u64,
    pub load_one: f64,
    pub load_five: f64,
    pub load_fifteen: f64,
}

pub struct SysinfoRepo {
    sys: Arc<std::sync::Mutex<System>>,
    disks: Arc<std::sync::Mutex<(Disks, Instant)>>,
    networks: Arc<std::sync::Mutex<(Networks, Instant)>>,
    components: Arc<std::sync::Mutex<Components>>,
    users: Arc<std::sync::Mutex<Users>>,
    last_cpu_refresh: Arc<std::sync::Mutex<Option<(Instant, f64)>>>,
}

impl Default for SysinfoRepo {
    fn default() -> Self {
        Self::new()
    }
}

impl SysinfoRepo {
    pub fn new() -> Self {
        let mut sys = System::new_all();
        sys.refresh_all();
        let disks = Disks::new_with_refreshed_list();
        let networks = Networks::new_with_refreshed_list();
        let components = Components::new_with_refreshed_list();
        let users = Users::new_with_refreshed_list();
        let now = Instant::now();
        Self {
            sys: Arc::new(std::sync::Mutex::new(sys)),
            disks: Arc::new(std::sync::Mutex::new((disks, now))),
            networks: Arc::new(std::sync::Mutex::new((networks, now))),
            components: Arc::new(std::sync::Mutex::new(components)),
            users: Arc::new(std::sync::Mutex::new(users)),
            last_cpu_refresh: Arc::new(std::sync::Mutex::new(None)),
        }
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_cpu_reading"))]
    pub async fn get_cpu_reading(&self) -> anyhow::Result<CpuReading> {
        let sys = self.sys.clone();
        let components = self.components.clone();
        let last_cpu_refresh = self.last_cpu_refresh.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;

            let now = Instant::now();
            let usage = if let Ok(mut guard) = last_cpu_refresh.lock() {
                if let Some((prev_ts, prev_usage)) = *guard {
                    let dt = now.duration_since(prev_ts);
                    if dt >= sysinfo::MINIMUM_CPU_UPDATE_INTERVAL {
                        sys.refresh_cpu_all();
                        let new_usage = sys.global_cpu_usage() as f64;
                        *guard = Some((now, new_usage));
                        new_usage
                    } else {
                        // Too soon for a meaningful delta, reuse the cached figure
                        prev_usage
                    }
                } else {
                    // First call establishes the baseline
                    sys.refresh_cpu_all();
                    *guard = Some((now, 0.0));
                    0.0
                }
            } else {
                sys.refresh_cpu_all();
                0.0
            };

            let physical = System::physical_core_count().unwrap_or(0) as u32;
            let logical = sys.cpus().len() as u32;
            let frequency_mhz = sys.cpus().first().map(|c| c.frequency()).unwrap_or(0);
            let model = linux::read_cpu_model_linux()
                .or_else(|| {
                    sys.cpus()
                        .first()
                        .map(|c| c.name().to_string())
                        .filter(|s| !s.is_empty() && s != "cpu0")
                })
                .unwrap_or_else(|| "Unknown".into());

            let temperature = components
                .lock()
                .ok()
                .and_then(|mut comps| {
                    comps.refresh(true);
                    comps
                        .iter()
                        .find(|c| {
                            let label = c.label().to_ascii_lowercase();
                            label.contains("cpu")
                                || label.contains("tctl")
                                || label.contains("package")
                                || label.contains("core")
                        })
                        .and_then(|c| c.temperature())
                })
                .map(|t| t as f64);

            Ok(CpuReading {
                usage_percent: usage,
                physical_cores: physical,
                logical_cores: logical,
                frequency_mhz,
                model,
                temperature,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_memory_reading"))]
    pub async fn get_memory_reading(&self) -> anyhow::Result<MemoryReading> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();

            Ok(MemoryReading {
                total: sys.total_memory(),
                free: sys.free_memory(),
                available: sys.available_memory(),
                swap_total: sys.total_swap(),
                swap_used: sys.used_swap(),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_disk_readings"))]
    pub async fn get_disk_readings(&self) -> anyhow::Result<DiskReadings> {
        let disks = self.disks.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = disks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo disks lock poisoned: {}", e))?;
            let now = Instant::now();
            let interval_secs = now.duration_since(guard.1).as_secs_f64();
            guard.0.refresh(false);
            guard.1 = now;

            let partitions = guard
                .0
                .list()
                .iter()
                .map(|d| PartitionReading {
                    filesystem: d.name().to_string_lossy().into_owned(),
                    mount: d.mount_point().to_string_lossy().into_owned(),
                    type_: d.file_system().to_string_lossy().into_owned(),
                    total: d.total_space(),
                    available: d.available_space(),
                })
                .collect();

            let io = guard
                .0
                .list()
                .iter()
                .map(|d| {
                    let usage = d.usage();
                    DiskIoReading {
                        device: d.name().to_string_lossy().into_owned(),
                        read_bytes_delta: usage.read_bytes,
                        written_bytes_delta: usage.written_bytes,
                        read_bytes_total: usage.total_read_bytes,
                        written_bytes_total: usage.total_written_bytes,
                    }
                })
                .collect();

            Ok(DiskReadings {
                partitions,
                io,
                interval_secs,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    /// One sample per interface with cumulative counters and instantaneous
    /// rates (byte delta over the elapsed interval since the previous refresh).
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_network_samples"))]
    pub async fn get_network_samples(&self) -> anyhow::Result<Vec<NetworkSample>> {
        let networks = self.networks.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = networks
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo networks lock poisoned: {}", e))?;
            let now = Instant::now();
            let elapsed = now.duration_since(guard.1).as_secs_f64();
            guard.0.refresh(true);
            guard.1 = now;

            let timestamp_ms = epoch_ms();
            let samples = guard
                .0
                .list()
                .iter()
                .map(|(name, data)| {
                    let (rx_rate, tx_rate) = if elapsed > 0.0 {
                        (
                            data.received() as f64 / elapsed,
                            data.transmitted() as f64 / elapsed,
                        )
                    } else {
                        (0.0, 0.0)
                    };
                    NetworkSample {
                        interface: name.clone(),
                        timestamp_ms,
                        rx_bytes: data.total_received(),
                        tx_bytes: data.total_transmitted(),
                        rx_rate,
                        tx_rate,
                        oper_state: linux::read_operstate(name),
                    }
                })
                .collect();
            Ok(samples)
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_process_readings"))]
    pub async fn get_process_readings(&self) -> anyhow::Result<ProcessTable> {
        let sys = self.sys.clone();
        let users = self.users.clone();
        tokio::task::spawn_blocking(move || {
            let mut sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            sys.refresh_memory();
            sys.refresh_processes(ProcessesToUpdate::All, true);
            let users = users
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo users lock poisoned: {}", e))?;

            let total_memory = sys.total_memory();
            let readings = sys
                .processes()
                .values()
                .map(|p| {
                    let user = p
                        .user_id()
                        .and_then(|uid| users.get_user_by_id(uid))
                        .map(|u| u.name().to_string())
                        .unwrap_or_else(|| "unknown".into());
                    let mem_percent = if total_memory > 0 {
                        (p.memory() as f64 / total_memory as f64) * 100.0
                    } else {
                        0.0
                    };
                    let command = if p.cmd().is_empty() {
                        p.name().to_string_lossy().into_owned()
                    } else {
                        p.cmd()
                            .iter()
                            .map(|s| s.to_string_lossy())
                            .collect::<Vec<_>>()
                            .join(" ")
                    };
                    ProcessReading {
                        pid: p.pid().as_u32(),
                        user,
                        cpu_percent: p.cpu_usage() as f64,
                        mem_percent,
                        command,
                    }
                })
                .collect();
            Ok(ProcessTable {
                total_memory,
                processes: readings,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_host_reading"))]
    pub async fn get_host_reading(&self) -> anyhow::Result<HostReading> {
        tokio::task::spawn_blocking(move || {
            let name = System::name().unwrap_or_else(|| std::env::consts::OS.into());
            let os_version = System::os_version().unwrap_or_default();
            // Zeros on platforms without the concept (e.g. Windows); not an error.
            let load = System::load_average();
            Ok(HostReading {
                hostname: System::host_name().unwrap_or_default(),
                platform: format!("{} {}", name, os_version).trim().to_string(),
                arch: std::env::consts::ARCH.to_string(),
                kernel: System::kernel_version().unwrap_or_default(),
                uptime_secs: System::uptime(),
                load_one: load.one,
                load_five: load.five,
                load_fifteen: load.fifteen,
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }

    /// Static host identity; fetched once at startup.
    #[instrument(skip(self), fields(repo = "sysinfo", operation = "get_system_info"))]
    pub async fn get_system_info(&self) -> anyhow::Result<SystemInfo> {
        let sys = self.sys.clone();
        tokio::task::spawn_blocking(move || {
            let sys = sys
                .lock()
                .map_err(|e| anyhow::anyhow!("sysinfo lock poisoned: {}", e))?;
            let name = System::name().unwrap_or_else(|| std::env::consts::OS.into());
            let os_version = System::os_version().unwrap_or_default();
            let cpu_model = linux::read_cpu_model_linux()
                .or_else(|| {
                    sys.cpus()
                        .first()
                        .map(|c| c.name().to_string())
                        .filter(|s| !s.is_empty() && s != "cpu0")
                })
                .unwrap_or_else(|| "Unknown".into());
            Ok(SystemInfo {
                hostname: System::host_name().unwrap_or_default(),
                platform: format!("{} {}", name, os_version).trim().to_string(),
                distro: linux::read_os_pretty_name().unwrap_or(name),
                kernel: System::kernel_version().unwrap_or_default(),
                arch: std::env::consts::ARCH.to_string(),
                cpu_model,
                physical_cores: System::physical_core_count().unwrap_or(0) as u32,
                logical_cores: sys.cpus().len() as u32,
                total_memory_gb: round2(sys.total_memory() as f64 / GIB),
            })
        })
        .await
        .map_err(|e| anyhow::anyhow!("sysinfo task join: {}", e))?
    }
}

const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Milliseconds since the Unix epoch; 0 when the system clock is before it.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
