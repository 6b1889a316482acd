//! Container collector.

use crate::error::CollectError;
use crate::metrics::data::ContainerRecord;
use crate::metrics::traits::{ContainerEntry, ContainerRuntime};

/// Length of the short container id.
pub const SHORT_ID_LEN: usize = 12;

/// Image name reported when the image has no tag.
pub const UNTAGGED: &str = "untagged";

pub async fn collect(runtime: &dyn ContainerRuntime) -> Result<Vec<ContainerRecord>, CollectError> {
    let containers = runtime.running_containers().await?;
    Ok(containers.into_iter().map(to_record).collect())
}

pub fn to_record(entry: ContainerEntry) -> ContainerRecord {
    ContainerRecord {
        id: entry.id.chars().take(SHORT_ID_LEN).collect(),
        name: entry.name,
        image: entry
            .image_tags
            .into_iter()
            .next()
            .unwrap_or_else(|| UNTAGGED.to_string()),
        status: entry.state,
        ports: entry.ports,
    }
}
