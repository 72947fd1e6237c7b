// Shared test helpers

use hostpulse::models::*;

/// Minimal complete snapshot with a recognizable timestamp.
pub fn test_snapshot(timestamp: u64) -> MetricsSnapshot {
    MetricsSnapshot {
        cpu: CpuMetrics {
            usage_percent: 12.5,
            cores: 4,
            temp_c: Some(45.0),
            freq_ghz: Some(3.5),
            model: "test-cpu".into(),
        },
        ram: RamMetrics {
            total_gb: 16.0,
            used_gb: 8.0,
            free_gb: 4.0,
            cache_gb: 4.0,
            available_gb: 8.0,
            usage_percent: 50.0,
            swap_total_gb: 2.0,
            swap_used_gb: 0.0,
        },
        disks: vec![],
        disk_io: vec![],
        network: NetworkMetrics {
            interface: "eth0".into(),
            upload_kbs: 0.0,
            download_kbs: 0.0,
            total_tx_mb: 0.0,
            total_rx_mb: 0.0,
            state: "up".into(),
        },
        load: LoadMetrics {
            current: 12.5,
            one: 0.5,
            five: 0.4,
            fifteen: 0.3,
        },
        uptime_seconds: 3600,
        uptime_formatted: "1h 0m".into(),
        hostname: "testhost".into(),
        platform: "Linux 6.1".into(),
        arch: "x86_64".into(),
        kernel: "6.1.0".into(),
        timestamp,
        top_processes: vec![],
    }
}
