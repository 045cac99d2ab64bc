//! Content-addressed in-memory artifact store

use std::collections::HashMap;

use bytes::Bytes;
use parking_lot::RwLock;
use sha2::{Digest, Sha256};

use crate::{ArtifactRef, ArtifactStore, CollaboratorError};

/// Hex SHA-256 of `content`
pub fn content_digest(content: &[u8]) -> String {
    let digest = Sha256::digest(content);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

/// Artifact store holding blobs by digest
///
/// Identical content stored under different keys shares one blob.
#[derive(Debug, Default)]
pub struct InMemoryArtifactStore {
    blobs: RwLock<HashMap<String, Bytes>>,
}

impl InMemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct blobs
    pub fn len(&self) -> usize {
        self.blobs.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.blobs.read().is_empty()
    }
}

impl ArtifactStore for InMemoryArtifactStore {
    fn put(&self, key: &str, content: Bytes) -> Result<ArtifactRef, CollaboratorError> {
        let digest = content_digest(&content);
        let size = content.len();
        self.blobs.write().entry(digest.clone()).or_insert(content);
        Ok(ArtifactRef {
            key: key.to_string(),
            digest,
            size,
        })
    }

    fn get(&self, reference: &ArtifactRef) -> Option<Bytes> {
        self.blobs.read().get(&reference.digest).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest() {
        assert_eq!(
            content_digest(b""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_put_get() {
        let store = InMemoryArtifactStore::new();
        let r = store.put("jobs/1/report.json", Bytes::from_static(b"{}")).unwrap();
        assert_eq!(r.size, 2);
        assert_eq!(r.key, "jobs/1/report.json");
        assert_eq!(store.get(&r).unwrap(), Bytes::from_static(b"{}"));
    }

    #[test]
    fn test_dedup() {
        let store = InMemoryArtifactStore::new();
        let a = store.put("a", Bytes::from_static(b"same")).unwrap();
        let b = store.put("b", Bytes::from_static(b"same")).unwrap();
        assert_eq!(a.digest, b.digest);
        assert_eq!(store.len(), 1);
    }
}
