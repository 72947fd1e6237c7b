// Docker container models

use serde::{Deserialize, Serialize};

/// Merged container record: identity joined with best-effort stats.
/// Absent stats yield zeroed numeric fields, never a missing record.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContainerRecord {
    pub id: String,
    pub name: String,
    pub image: String,
    pub state: String,
    pub status_text: String,
    /// Seconds since the Unix epoch, 0 when the runtime omits it.
    pub created_at: i64,
    pub ports_display: String,
    pub mem_usage_mb: f64,
    pub mem_limit_mb: f64,
    pub mem_usage_percent: f64,
    pub cpu_percent: f64,
    pub network_rx_mb: f64,
    pub network_tx_mb: f64,
    pub block_read_mb: f64,
    pub block_write_mb: f64,
}

/// Port mapping as reported by the container runtime. The shape is
/// duck-typed at the source: either a preformatted string ("53/udp") or an
/// object whose keys come in Docker-API spelling (PublicPort/PrivatePort/Type)
/// or a lowercase alternate (hostPort/containerPort/protocol, public/private).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PortSpec {
    Text(String),
    Mapping {
        #[serde(
            default,
            alias = "PublicPort",
            alias = "hostPort",
            alias = "public"
        )]
        host: Option<u64>,
        #[serde(
            default,
            alias = "PrivatePort",
            alias = "containerPort",
            alias = "private"
        )]
        container: Option<u64>,
        #[serde(default, alias = "Type", alias = "protocol")]
        protocol: Option<String>,
    },
}

impl PortSpec {
    /// Normalized display form, or None when a host or container port cannot
    /// be resolved (such entries are dropped from the joined display).
    pub fn display(&self) -> Option<String> {
        match self {
            PortSpec::Text(s) => {
                let s = s.trim();
                if s.is_empty() {
                    None
                } else {
                    Some(s.to_string())
                }
            }
            PortSpec::Mapping {
                host,
                container,
                protocol,
            } => {
                let host = (*host)?;
                let container = (*container)?;
                match protocol.as_deref() {
                    Some(p) if !p.is_empty() => Some(format!("{host}:{container}/{p}")),
                    _ => Some(format!("{host}:{container}")),
                }
            }
        }
    }
}

/// Result of a container control command (start/stop/restart/log tail).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlOutcome {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ControlOutcome {
    pub fn ok(message: impl Into<String>, output: Option<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            output,
            error: None,
        }
    }

    pub fn failed(message: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            output: None,
            error: Some(error.into()),
        }
    }
}
