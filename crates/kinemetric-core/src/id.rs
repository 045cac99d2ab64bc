//! Identity types for the assessment pipeline
//!
//! Identifiers are opaque 64-bit values assigned by the owning store.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Athlete identity - owner of jobs, credits and an anthropometry profile
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct AthleteId(pub u64);

impl AthleteId {
    pub const ZERO: AthleteId = AthleteId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        AthleteId(id)
    }
}

impl fmt::Debug for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Athlete({})", self.0)
    }
}

impl fmt::Display for AthleteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Diagnostic job identity
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct JobId(pub u64);

impl JobId {
    pub const ZERO: JobId = JobId(0);

    #[inline]
    pub fn new(id: u64) -> Self {
        JobId(id)
    }

    /// Next identifier in sequence
    #[inline]
    pub fn next(self) -> Self {
        JobId(self.0.wrapping_add(1))
    }
}

impl fmt::Debug for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Job({:08x})", self.0)
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:08x}", self.0)
    }
}
