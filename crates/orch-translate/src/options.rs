use crate::Flag;

/// Flags read from the invocation, in the order they appeared.
///
/// Values are raw strings; boolean flags carry `"true"` unless an explicit `=value` was given.
/// Validation happens per bundle in the mapping step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOptions {
    entries: Vec<(Flag, String)>,
}

impl RunOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, flag: Flag, value: impl Into<String>) {
        self.entries.push((flag, value.into()));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Flag, &str)> {
        self.entries.iter().map(|(f, v)| (*f, v.as_str()))
    }

    /// All values of a repeatable flag, in order.
    pub fn values(&self, flag: Flag) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |(f, _)| *f == flag)
            .map(|(_, v)| v.as_str())
    }

    /// Last value of a scalar flag; later occurrences override earlier ones.
    pub fn last(&self, flag: Flag) -> Option<&str> {
        self.entries
            .iter()
            .rev()
            .find(|(f, _)| *f == flag)
            .map(|(_, v)| v.as_str())
    }

    pub fn contains(&self, flag: Flag) -> bool {
        self.entries.iter().any(|(f, _)| *f == flag)
    }
}
