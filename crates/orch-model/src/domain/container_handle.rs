use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier of a container returned by the runtime on create.
///
/// The default value is the empty (zero) handle, which is what the controller holds when creation
/// failed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContainerHandle(String);

impl ContainerHandle {
    const SHORT_LEN: usize = 10;

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Abbreviated id for log lines.
    pub fn short(&self) -> &str {
        match self.0.char_indices().nth(Self::SHORT_LEN) {
            Some((idx, _)) => &self.0[..idx],
            None => &self.0,
        }
    }
}

impl fmt::Display for ContainerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for ContainerHandle {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ContainerHandle {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
