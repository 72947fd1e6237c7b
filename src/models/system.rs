// Static host identity; fetched once at startup, served via GET /api/system-info.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemInfo {
    pub hostname: String,
    /// OS name plus release, e.g. "Ubuntu 24.04".
    pub platform: String,
    pub distro: String,
    pub kernel: String,
    pub arch: String,
    pub cpu_model: String,
    pub physical_cores: u32,
    pub logical_cores: u32,
    pub total_memory_gb: f64,
}
