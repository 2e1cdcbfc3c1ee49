use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ModelError {
    #[error("unknown execution status: {0}")]
    UnknownStatus(String),
}
