//! HTTP delivery of execution status callbacks.

mod config;
pub use config::NotifierConfig;

mod errors;
pub use errors::NotifyError;

mod payload;
pub use payload::StatusReport;

mod http;
pub use http::HttpNotifier;
