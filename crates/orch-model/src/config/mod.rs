//! Structured configuration handed to a runtime on container create.
//!
//! Three independent bundles mirror how container engines split their create request:
//! - [`ContainerConfig`]: what runs inside the container (image, env, entrypoint, ...),
//! - [`HostConfig`]: how the host provisions it (ports, mounts, limits, ...),
//! - [`NetworkingConfig`]: per-network endpoint settings.
//!
//! Every type defaults to its empty value; an empty bundle is what a failed translation produces
//! for that axis.

mod container;
pub use container::ContainerConfig;

mod host;
pub use host::{
    DeviceMapping, HostConfig, LogConfig, Mount, PortBinding, Protocol, Resources, RestartPolicy,
    TmpfsMount, Ulimit,
};

mod network;
pub use network::{EndpointSettings, NetworkingConfig};

use serde::{Deserialize, Serialize};

/// The triad produced by translation and consumed by the runtime's create call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigBundle {
    pub container: ContainerConfig,
    pub host: HostConfig,
    pub network: NetworkingConfig,
}

impl ConfigBundle {
    /// Image the container will be created from.
    pub fn image(&self) -> &str {
        &self.container.image
    }
}
