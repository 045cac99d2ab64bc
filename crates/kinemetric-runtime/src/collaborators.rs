//! External collaborator boundaries
//!
//! The pipeline never touches pose models, ledger storage or blob storage
//! directly; it goes through these traits.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use kinemetric_core::{AthleteId, LandmarkFrame};

use crate::{CollaboratorError, VideoRef};

/// Produces the full landmark sequence for a video.
///
/// Called at most once per job; the whole sequence is materialized before
/// any calculator runs.
pub trait PoseEstimator: Send + Sync + 'static {
    fn estimate(
        &self,
        video: &VideoRef,
    ) -> impl Future<Output = Result<Vec<LandmarkFrame>, CollaboratorError>> + Send;
}

/// Credit balance per athlete.
///
/// `debit` is a single conditional check-and-decrement: it either debits
/// all `units` or leaves the balance untouched and returns `false`.
pub trait CreditLedger: Send + Sync + 'static {
    fn get_balance(&self, athlete: AthleteId) -> i64;

    fn debit(&self, athlete: AthleteId, units: u32) -> bool;

    fn refund(&self, athlete: AthleteId, units: u32, reason: &str);
}

/// Reference to a stored artifact
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Logical key the artifact was stored under
    pub key: String,
    /// Hex SHA-256 of the content
    pub digest: String,
    /// Content length in bytes
    pub size: usize,
}

impl fmt::Display for ArtifactRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short: String = self.digest.chars().take(12).collect();
        write!(f, "{}@{}", self.key, short)
    }
}

/// Stores snapshot and report documents
pub trait ArtifactStore: Send + Sync + 'static {
    fn put(&self, key: &str, content: Bytes) -> Result<ArtifactRef, CollaboratorError>;

    fn get(&self, reference: &ArtifactRef) -> Option<Bytes>;
}

impl<T: PoseEstimator> PoseEstimator for Arc<T> {
    fn estimate(
        &self,
        video: &VideoRef,
    ) -> impl Future<Output = Result<Vec<LandmarkFrame>, CollaboratorError>> + Send {
        (**self).estimate(video)
    }
}

impl<T: CreditLedger> CreditLedger for Arc<T> {
    fn get_balance(&self, athlete: AthleteId) -> i64 {
        (**self).get_balance(athlete)
    }

    fn debit(&self, athlete: AthleteId, units: u32) -> bool {
        (**self).debit(athlete, units)
    }

    fn refund(&self, athlete: AthleteId, units: u32, reason: &str) {
        (**self).refund(athlete, units, reason)
    }
}

impl<T: ArtifactStore> ArtifactStore for Arc<T> {
    fn put(&self, key: &str, content: Bytes) -> Result<ArtifactRef, CollaboratorError> {
        (**self).put(key, content)
    }

    fn get(&self, reference: &ArtifactRef) -> Option<Bytes> {
        (**self).get(reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference(digest: &str) -> ArtifactRef {
        ArtifactRef {
            key: "jobs/1/report.json".to_string(),
            digest: digest.to_string(),
            size: 2,
        }
    }

    #[test]
    fn test_artifact_ref_display() {
        let hex = "0123456789abcdef0123";
        assert_eq!(reference(hex).to_string(), "jobs/1/report.json@0123456789ab");
        assert_eq!(reference("abc").to_string(), "jobs/1/report.json@abc");
        // multi-byte digests from third-party stores
        assert_eq!(
            reference("ééééééééééééé").to_string(),
            "jobs/1/report.json@éééééééééééé"
        );
    }
}
