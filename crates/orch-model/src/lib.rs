//! Data model shared by the service-execution crates.
//!
//! Nothing in here performs I/O: these are the request descriptor, the status reported to the
//! notifier, the opaque container handle and the three configuration bundles a runtime receives on
//! create.

mod domain;
pub use domain::*;

mod config;
pub use config::*;
