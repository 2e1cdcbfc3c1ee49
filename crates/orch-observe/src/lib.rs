//! Process-wide `tracing` subscriber setup for agents embedding the executor.

mod logger;
pub use logger::*;
