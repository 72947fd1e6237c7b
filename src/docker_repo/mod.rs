// Docker container listing, stats merge and control via bollard

mod merge;

pub use merge::{ContainerIdentity, ContainerUsage, format_ports, merge_containers};

use crate::models::{ContainerRecord, ControlOutcome, PortSpec};
use bollard::Docker;
use bollard::query_parameters::{
    ListContainersOptions, LogsOptionsBuilder, RestartContainerOptions, StartContainerOptions,
    StatsOptions, StopContainerOptions,
};
use bollard::models::ContainerSummary;
use futures_util::StreamExt;
use futures_util::future::join_all;
use tracing::warn;

/// Container control surface errors; distinguished so malformed identifiers
/// are rejected before the runtime is invoked.
#[derive(Debug, thiserror::Error)]
pub enum ControlError {
    #[error("invalid container identifier: {0}")]
    InvalidIdentifier(String),
    #[error("{0}")]
    Runtime(String),
}

pub struct DockerRepo {
    docker: Docker,
}

impl DockerRepo {
    pub fn connect() -> anyhow::Result<Self> {
        let docker = Docker::connect_with_unix_defaults()?;
        Ok(Self { docker })
    }

    /// All containers joined with one-shot stats for the running ones.
    /// A runtime outage yields an empty list, never an error.
    pub async fn list_containers(&self) -> Vec<ContainerRecord> {
        let options = ListContainersOptions {
            all: true,
            ..Default::default()
        };
        let summaries = match self.docker.list_containers(Some(options)).await {
            Ok(c) => c,
            Err(e) => {
                warn!(error = %e, operation = "list_containers", "Docker list failed");
                return Vec::new();
            }
        };

        let identities: Vec<ContainerIdentity> =
            summaries.iter().map(identity_from_summary).collect();

        let running_ids: Vec<String> = identities
            .iter()
            .filter(|i| i.state.eq_ignore_ascii_case("running") && !i.id.is_empty())
            .map(|i| i.id.clone())
            .collect();
        let usages: Vec<ContainerUsage> =
            join_all(running_ids.iter().map(|id| self.sample_usage(id)))
                .await
                .into_iter()
                .flatten()
                .collect();

        merge_containers(identities, &usages)
    }

    /// One stats sample for a container; None on stream end or error.
    async fn sample_usage(&self, id: &str) -> Option<ContainerUsage> {
        let options = StatsOptions {
            stream: false,
            ..Default::default()
        };
        let mut stream = self.docker.stats(id, Some(options));
        match stream.next().await {
            Some(Ok(s)) => Some(merge::usage_from_statistics(&s, id)),
            Some(Err(e)) => {
                warn!(error = %e, container = %id, operation = "stats", "stats sample failed");
                None
            }
            None => None,
        }
    }

    pub async fn start(&self, id: &str) -> ControlOutcome {
        match self
            .docker
            .start_container(id, None::<StartContainerOptions>)
            .await
        {
            Ok(()) => ControlOutcome::ok("Container start successful", None),
            Err(e) => {
                warn!(error = %e, container = %id, operation = "start_container", "start failed");
                ControlOutcome::failed("Failed to start container", e.to_string())
            }
        }
    }

    pub async fn stop(&self, id: &str) -> ControlOutcome {
        match self
            .docker
            .stop_container(id, None::<StopContainerOptions>)
            .await
        {
            Ok(()) => ControlOutcome::ok("Container stop successful", None),
            Err(e) => {
                warn!(error = %e, container = %id, operation = "stop_container", "stop failed");
                ControlOutcome::failed("Failed to stop container", e.to_string())
            }
        }
    }

    pub async fn restart(&self, id: &str) -> ControlOutcome {
        match self
            .docker
            .restart_container(id, None::<RestartContainerOptions>)
            .await
        {
            Ok(()) => ControlOutcome::ok("Container restart successful", None),
            Err(e) => {
                warn!(error = %e, container = %id, operation = "restart_container", "restart failed");
                ControlOutcome::failed("Failed to restart container", e.to_string())
            }
        }
    }

    /// Last `lines` log lines (stdout + stderr) for a container. The id is
    /// validated before the runtime is touched.
    pub async fn tail_logs(&self, id: &str, lines: u32) -> Result<String, ControlError> {
        if !is_valid_container_id(id) {
            return Err(ControlError::InvalidIdentifier(id.to_string()));
        }
        let options = LogsOptionsBuilder::default()
            .stdout(true)
            .stderr(true)
            .tail(&lines.to_string())
            .build();
        let mut stream = self.docker.logs(id, Some(options));
        let mut out = String::new();
        while let Some(chunk) = stream.next().await {
            match chunk {
                Ok(log) => out.push_str(&log.to_string()),
                Err(e) => return Err(ControlError::Runtime(e.to_string())),
            }
        }
        Ok(out)
    }
}

/// Container ids (and the short-id prefixes the dashboard sends) are hex;
/// anything else is rejected as malformed.
pub fn is_valid_container_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(|c| c.is_ascii_alphanumeric())
}

fn identity_from_summary(c: &ContainerSummary) -> ContainerIdentity {
    let id = c.id.clone().unwrap_or_default();
    let name = c
        .names
        .as_ref()
        .and_then(|n| n.first())
        .map(|n| n.trim_start_matches('/').to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| id.clone());
    let state = c
        .state
        .as_ref()
        .map(|s| s.to_string())
        .unwrap_or_else(|| "unknown".into());
    let status = c
        .status
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| state.clone());
    // Ports go through the duck-typed PortSpec shape; entries that do not
    // deserialize are skipped rather than failing the whole list.
    let ports = c
        .ports
        .as_ref()
        .map(|ports| {
            ports
                .iter()
                .filter_map(|p| {
                    serde_json::to_value(p)
                        .ok()
                        .and_then(|v| serde_json::from_value::<PortSpec>(v).ok())
                })
                .collect()
        })
        .unwrap_or_default();
    ContainerIdentity {
        id,
        name,
        image: c.image.clone().unwrap_or_else(|| "Unknown".into()),
        state,
        status,
        created: c.created.unwrap_or(0),
        ports,
    }
}
