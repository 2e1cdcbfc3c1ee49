use serde::{Deserialize, Serialize};

/// Single `key=value` pair, used for environment variables and labels.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyValue {
    key: String,
    value: String,
}

impl KeyValue {
    pub fn new<K, V>(key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[inline]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Render as `key=value`, the form runtimes expect on the wire.
    pub fn to_pair(&self) -> String {
        format!("{}={}", self.key, self.value)
    }
}
