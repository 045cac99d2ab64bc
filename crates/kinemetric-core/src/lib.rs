//! Kinemetric Core - Fundamental types and primitives
//!
//! This crate defines the core types used throughout the assessment pipeline:
//! - Identifiers (AthleteId, JobId)
//! - Geometry kernel (angle, distance, midpoint, tilt)
//! - Landmark vocabulary and per-frame landmark access
//! - Assessment types and which of them are scored
//! - Error taxonomy

pub mod id;
pub mod geometry;
pub mod landmark;
pub mod assessment;
pub mod error;

pub use id::*;
pub use geometry::*;
pub use landmark::*;
pub use assessment::*;
pub use error::*;
