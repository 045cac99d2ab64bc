//! Scripted collaborators for pipeline tests

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use bytes::Bytes;
use parking_lot::RwLock;

use kinemetric_core::LandmarkFrame;
use kinemetric_runtime::{ArtifactRef, ArtifactStore, CollaboratorError, PoseEstimator, VideoRef};

/// Pose estimator that replays pre-registered captures
#[derive(Debug, Default)]
pub struct ScriptedPoseEstimator {
    scripts: RwLock<HashMap<VideoRef, Vec<LandmarkFrame>>>,
    calls: AtomicUsize,
    latency: Duration,
}

impl ScriptedPoseEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulated inference time per call
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Register the capture returned for `video`
    pub fn script(&self, video: &VideoRef, frames: Vec<LandmarkFrame>) {
        self.scripts.write().insert(video.clone(), frames);
    }

    /// Number of estimate calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PoseEstimator for ScriptedPoseEstimator {
    async fn estimate(&self, video: &VideoRef) -> Result<Vec<LandmarkFrame>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.scripts
            .read()
            .get(video)
            .cloned()
            .ok_or_else(|| CollaboratorError::VideoNotFound(video.to_string()))
    }
}

/// Pose estimator that always fails
#[derive(Debug)]
pub struct FailingPoseEstimator {
    error: CollaboratorError,
    calls: AtomicUsize,
}

impl FailingPoseEstimator {
    pub fn new(error: CollaboratorError) -> Self {
        Self {
            error,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn timing_out() -> Self {
        Self::new(CollaboratorError::Timeout)
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PoseEstimator for FailingPoseEstimator {
    async fn estimate(&self, _video: &VideoRef) -> Result<Vec<LandmarkFrame>, CollaboratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(self.error.clone())
    }
}

/// Artifact store that rejects every write
#[derive(Debug, Default)]
pub struct FailingArtifactStore {
    attempts: AtomicUsize,
}

impl FailingArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl ArtifactStore for FailingArtifactStore {
    fn put(&self, key: &str, _content: Bytes) -> Result<ArtifactRef, CollaboratorError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(CollaboratorError::Storage(format!("rejected write to {}", key)))
    }

    fn get(&self, _reference: &ArtifactRef) -> Option<Bytes> {
        None
    }
}
