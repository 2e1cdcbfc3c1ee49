//! Image admission gate.

use std::{
    collections::HashSet,
    sync::{PoisonError, RwLock},
};

use async_trait::async_trait;
use tracing::{debug, trace};

use crate::error::VerifyError;

/// Decides whether an image reference may be executed.
#[async_trait]
pub trait Verifier: Send + Sync + 'static {
    async fn is_whitelisted(&self, image: &str) -> Result<(), VerifyError>;
}

/// In-memory whitelist of image references.
///
/// An entry permits a reference when it is equal to it, or when the entry carries no tag or digest
/// and names the same repository:
/// `redis` permits `redis:7` and `redis@sha256:...`, while `redis:6` only permits `redis:6`.
#[derive(Debug, Default)]
pub struct Whitelist {
    entries: RwLock<HashSet<String>>,
}

impl Whitelist {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: RwLock::new(entries.into_iter().map(Into::into).collect()),
        }
    }

    pub fn insert(&self, entry: impl Into<String>) -> bool {
        let entry = entry.into();
        trace!(target: "orch.verifier", %entry, "whitelist entry added");
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(entry)
    }

    pub fn remove(&self, entry: &str) -> bool {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(entry)
    }

    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn permits(&self, image: &str) -> bool {
        let image = image.trim();
        if image.is_empty() {
            return false;
        }
        let repo = repository(image);
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);

        entries.contains(image)
            || entries
                .iter()
                .any(|e| repository(e) == e.as_str() && e.as_str() == repo)
    }
}

#[async_trait]
impl Verifier for Whitelist {
    async fn is_whitelisted(&self, image: &str) -> Result<(), VerifyError> {
        if self.permits(image) {
            debug!(target: "orch.verifier", image, "image permitted");
            Ok(())
        } else {
            Err(VerifyError::NotWhitelisted(image.to_string()))
        }
    }
}

/// Repository part of a reference: digest and tag stripped, registry port kept.
fn repository(reference: &str) -> &str {
    let name = reference.split_once('@').map_or(reference, |(n, _)| n);
    let last_slash = name.rfind('/').map_or(0, |i| i + 1);
    match name[last_slash..].rfind(':') {
        Some(colon) => &name[..last_slash + colon],
        None => name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn repository_strips_tag_and_digest() {
        assert_eq!(repository("redis"), "redis");
        assert_eq!(repository("redis:7"), "redis");
        assert_eq!(repository("redis@sha256:abc"), "redis");
        assert_eq!(repository("registry:5000/team/app:1.2"), "registry:5000/team/app");
        assert_eq!(repository("registry:5000/team/app"), "registry:5000/team/app");
    }

    #[test]
    fn exact_and_repository_matches() {
        let wl = Whitelist::new(["redis", "nginx:1.25", "registry:5000/edge/app"]);

        assert!(wl.permits("redis"));
        assert!(wl.permits("redis:7"));
        assert!(wl.permits("redis@sha256:0123"));
        assert!(wl.permits("nginx:1.25"));
        assert!(!wl.permits("nginx:latest"));
        assert!(!wl.permits("nginx"));
        assert!(wl.permits("registry:5000/edge/app:3"));
        assert!(!wl.permits("registry:5000/edge/other:3"));
        assert!(!wl.permits(""));
    }

    #[test]
    fn insert_and_remove() {
        let wl = Whitelist::default();
        assert!(wl.is_empty());
        assert!(!wl.permits("alpine:3"));

        assert!(wl.insert("alpine"));
        assert!(wl.permits("alpine:3"));
        assert_eq!(wl.len(), 1);

        assert!(wl.remove("alpine"));
        assert!(!wl.permits("alpine:3"));
    }

    #[tokio::test]
    async fn verifier_reports_rejection() {
        let wl = Whitelist::new(["alpine"]);
        assert!(wl.is_whitelisted("alpine:3.19").await.is_ok());
        assert_eq!(
            wl.is_whitelisted("evil:latest").await,
            Err(VerifyError::NotWhitelisted("evil:latest".into()))
        );
    }
}
