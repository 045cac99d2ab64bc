//! Kinemetric Calibration - Real-world scale correction
//!
//! Pose coordinates are normalized to the frame; this crate turns them into
//! centimeters for a specific athlete:
//! - General factor from stated vs. estimated body height
//! - Limb factor from manual or estimated thigh and shin lengths
//! - Validity band enforcement with an explicit "uncalibrated" fallback
//! - Segment length measurement and capture-quality checks

pub mod config;
pub mod error;
pub mod profile;
pub mod engine;
pub mod segments;
pub mod quality;

pub use config::*;
pub use error::*;
pub use profile::*;
pub use engine::*;
pub use segments::*;
pub use quality::*;
