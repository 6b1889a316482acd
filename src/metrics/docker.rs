//! Docker Engine API client used as the container runtime.

use crate::error::CollectError;
use crate::metrics::traits::{ContainerEntry, ContainerRuntime};
use async_trait::async_trait;
use bollard::container::ListContainersOptions;
use bollard::models::ContainerSummary;
use bollard::Docker;
use futures_util::future::join_all;
use tracing::debug;

const TARGET: &str = "docker";

/// Docker daemon reached through the local socket (or `DOCKER_HOST`).
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    /// Build a client from the environment. No request is sent yet.
    pub fn connect() -> Result<Self, CollectError> {
        Docker::connect_with_local_defaults()
            .map(|client| Self { client })
            .map_err(|e| CollectError::connectivity(TARGET, e.to_string()))
    }

    async fn describe(&self, summary: ContainerSummary) -> Result<ContainerEntry, CollectError> {
        let id = summary.id.unwrap_or_default();

        let inspect = self
            .client
            .inspect_container(&id, None)
            .await
            .map_err(|e| CollectError::ContainerTransient {
                id: id.clone(),
                reason: e.to_string(),
            })?;

        let image_ref = summary
            .image_id
            .or(summary.image)
            .unwrap_or_default();
        let image_tags = match self.client.inspect_image(&image_ref).await {
            Ok(image) => image.repo_tags.unwrap_or_default(),
            Err(err) => {
                debug!(container = %id, error = %err, "Image inspection failed");
                Vec::new()
            }
        };

        let ports = inspect
            .network_settings
            .and_then(|settings| settings.ports)
            .map(|ports| serde_json::to_value(ports).unwrap_or_default())
            .and_then(|value| match value {
                serde_json::Value::Object(map) => Some(map),
                _ => None,
            })
            .unwrap_or_default();

        let name = summary
            .names
            .and_then(|names| names.into_iter().next())
            .or(inspect.name)
            .unwrap_or_default();

        Ok(ContainerEntry {
            id,
            name: name.trim_start_matches('/').to_string(),
            image_tags,
            state: summary.state.unwrap_or_default(),
            ports,
        })
    }
}

#[async_trait]
impl ContainerRuntime for DockerRuntime {
    async fn running_containers(&self) -> Result<Vec<ContainerEntry>, CollectError> {
        let options = ListContainersOptions::<String> {
            all: false,
            ..Default::default()
        };
        let summaries = self
            .client
            .list_containers(Some(options))
            .await
            .map_err(|e| CollectError::connectivity(TARGET, e.to_string()))?;

        let described = join_all(summaries.into_iter().map(|summary| self.describe(summary))).await;
        Ok(keep_described(described))
    }
}

/// Drop containers that could not be inspected; the rest are kept in list order.
fn keep_described(described: Vec<Result<ContainerEntry, CollectError>>) -> Vec<ContainerEntry> {
    described
        .into_iter()
        .filter_map(|result| match result {
            Ok(entry) => Some(entry),
            Err(err) => {
                debug!(subsystem = "containers", error = %err, "Skipping container");
                None
            }
        })
        .collect()
}
