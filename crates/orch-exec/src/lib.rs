//! Docker backed [`RuntimeClient`](orch_core::RuntimeClient)s.
//!
//! [`DockerCli`] runs one `docker` invocation per primitive. Child processes are killed when
//! their future is dropped, so a cancelled or timed-out wait does not leave a `docker wait`
//! behind. With the `engine` feature, `DockerEngine` talks to the daemon's API directly.

mod config;
pub use config::DockerCliConfig;

mod error;
pub use error::CliError;

mod render;
pub use render::create_args;

mod util;

mod docker;
pub use docker::DockerCli;

#[cfg(feature = "engine")]
mod engine;
#[cfg(feature = "engine")]
pub use engine::{DockerEngine, EngineConfig, create_body};
