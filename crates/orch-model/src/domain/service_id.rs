use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric identifier of a service execution.
///
/// Opaque to the controller; it is only threaded through to the notifier as the correlation key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ServiceId(pub u64);

impl ServiceId {
    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

impl From<u64> for ServiceId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

impl fmt::Display for ServiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
