use std::fmt;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TranslateError {
    #[error("unknown flag: {0}")]
    UnknownFlag(String),
    #[error("flag needs an argument: {0}")]
    MissingValue(String),
    #[error("unexpected argument: {0}")]
    UnexpectedArgument(String),
    #[error("invalid value {value:?} for --{flag}: {reason}")]
    InvalidValue {
        flag: &'static str,
        value: String,
        reason: String,
    },
}

impl TranslateError {
    pub(crate) fn invalid(flag: &'static str, value: &str, reason: impl Into<String>) -> Self {
        TranslateError::InvalidValue {
            flag,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

/// Configuration bundle a mapping step produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Container,
    Host,
    Network,
}

impl Axis {
    pub fn as_str(&self) -> &'static str {
        match self {
            Axis::Container => "container",
            Axis::Host => "host",
            Axis::Network => "network",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
