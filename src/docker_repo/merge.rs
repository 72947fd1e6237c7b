// Join container identity records with best-effort stats samples.

use crate::models::{ContainerRecord, PortSpec, round1, round2};
use bollard::models::ContainerStatsResponse;

const MIB: f64 = 1024.0 * 1024.0;

/// Identity half of the join, as listed by the runtime.
#[derive(Debug, Clone)]
pub struct ContainerIdentity {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
    pub status: String,
    pub created: i64,
    pub ports: Vec<PortSpec>,
}

/// Stats half of the join, keyed by container id. Memory figures stay
/// optional so the percent rule can distinguish absent from zero.
#[derive(Debug, Clone)]
pub struct ContainerUsage {
    pub id: String,
    pub cpu_percent: f64,
    pub memory_usage_bytes: Option<u64>,
    pub memory_limit_bytes: Option<u64>,
    pub network_rx_bytes: u64,
    pub network_tx_bytes: u64,
    pub block_read_bytes: u64,
    pub block_write_bytes: u64,
}

/// One record per identity entry; stats matched by exact id equality, absent
/// stats yield zeroed numeric fields, never a missing record.
pub fn merge_containers(
    identities: Vec<ContainerIdentity>,
    usages: &[ContainerUsage],
) -> Vec<ContainerRecord> {
    identities
        .into_iter()
        .map(|identity| {
            let usage = usages.iter().find(|u| u.id == identity.id);
            let mem_usage = usage.and_then(|u| u.memory_usage_bytes);
            let mem_limit = usage.and_then(|u| u.memory_limit_bytes);
            let mem_usage_percent = match (mem_usage, mem_limit) {
                (Some(usage_bytes), Some(limit_bytes)) if limit_bytes > 0 => {
                    round1(usage_bytes as f64 / limit_bytes as f64 * 100.0)
                }
                _ => 0.0,
            };
            ContainerRecord {
                ports_display: format_ports(&identity.ports),
                id: identity.id,
                name: identity.name,
                image: identity.image,
                state: identity.state,
                status_text: identity.status,
                created_at: identity.created,
                mem_usage_mb: round1(mem_usage.unwrap_or(0) as f64 / MIB),
                mem_limit_mb: round1(mem_limit.unwrap_or(0) as f64 / MIB),
                mem_usage_percent,
                cpu_percent: round2(usage.map(|u| u.cpu_percent).unwrap_or(0.0)),
                network_rx_mb: round1(usage.map(|u| u.network_rx_bytes).unwrap_or(0) as f64 / MIB),
                network_tx_mb: round1(usage.map(|u| u.network_tx_bytes).unwrap_or(0) as f64 / MIB),
                block_read_mb: round1(usage.map(|u| u.block_read_bytes).unwrap_or(0) as f64 / MIB),
                block_write_mb: round1(usage.map(|u| u.block_write_bytes).unwrap_or(0) as f64 / MIB),
            }
        })
        .collect()
}

/// Normalized joined port display; entries that cannot resolve a host or
/// container port are dropped, and an empty result is the literal "None".
pub fn format_ports(ports: &[PortSpec]) -> String {
    let parts: Vec<String> = ports.iter().filter_map(PortSpec::display).collect();
    if parts.is_empty() {
        "None".to_string()
    } else {
        parts.join(", ")
    }
}

/// Reduce a raw Docker stats response to the usage half of the merge.
/// Partial responses degrade to zeros/None, never fail.
pub(crate) fn usage_from_statistics(s: &ContainerStatsResponse, id: &str) -> ContainerUsage {
    let cpu_percent = (|| {
        let cpu = s.cpu_stats.as_ref()?;
        let precpu = s.precpu_stats.as_ref()?;
        let cpu_delta = cpu.cpu_usage.as_ref()?.total_usage.unwrap_or(0) as i64
            - precpu.cpu_usage.as_ref()?.total_usage.unwrap_or(0) as i64;
        let system_delta =
            cpu.system_cpu_usage.unwrap_or(0) as i64 - precpu.system_cpu_usage.unwrap_or(0) as i64;
        let online = cpu.online_cpus.unwrap_or(1) as f64;
        if system_delta > 0 && online > 0.0 {
            Some((cpu_delta as f64 / system_delta as f64) * online * 100.0)
        } else {
            None
        }
    })()
    .unwrap_or(0.0);

    let memory_usage_bytes = s.memory_stats.as_ref().and_then(|m| m.usage);
    let memory_limit_bytes = s.memory_stats.as_ref().and_then(|m| m.limit);

    // Network counters summed across all interfaces the container reports
    let (network_rx_bytes, network_tx_bytes) = s.networks.as_ref().map_or((0, 0), |n| {
        let mut rx = 0u64;
        let mut tx = 0u64;
        for v in n.values() {
            rx += v.rx_bytes.unwrap_or(0);
            tx += v.tx_bytes.unwrap_or(0);
        }
        (rx, tx)
    });

    // Block IO summed across devices
    let (block_read_bytes, block_write_bytes) = s
        .blkio_stats
        .as_ref()
        .and_then(|b| b.io_service_bytes_recursive.as_ref())
        .map_or((0, 0), |entries| {
            let mut read = 0u64;
            let mut write = 0u64;
            for e in entries {
                if e.op
                    .as_ref()
                    .is_some_and(|op| op.eq_ignore_ascii_case("read"))
                {
                    read += e.value.unwrap_or(0);
                } else if e
                    .op
                    .as_ref()
                    .is_some_and(|op| op.eq_ignore_ascii_case("write"))
                {
                    write += e.value.unwrap_or(0);
                }
            }
            (read, write)
        });

    ContainerUsage {
        id: id.to_string(),
        cpu_percent,
        memory_usage_bytes,
        memory_limit_bytes,
        network_rx_bytes,
        network_tx_bytes,
        block_read_bytes,
        block_write_bytes,
    }
}
