// Wire models (JSON camelCase)

mod container;
mod metrics;
mod network;
mod system;

pub use container::{ContainerRecord, ControlOutcome, PortSpec};
pub use metrics::{
    CpuMetrics, DiskIoMetrics, DiskMetrics, LoadMetrics, MetricsSnapshot, NetworkMetrics,
    ProcessSample, RamMetrics,
};
pub use network::{NetworkSample, Throughput};
pub use system::SystemInfo;

/// Round to one decimal place (wire precision for percentages and KB/MB figures).
pub fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Round to two decimal places (wire precision for GiB figures).
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
