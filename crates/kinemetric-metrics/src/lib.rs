//! Kinemetric Metrics - Landmark sequences to scored measurements
//!
//! This crate provides:
//! - The measurement result model shared by every assessment
//! - The scoring engine (sub-score flooring, composite clamping, feedback order)
//! - Rubric configuration with the documented weights and thresholds
//! - Calculators for squat, posture, shoulder circumduction,
//!   single-leg stance and vertical jump
//! - A calculator table built once at startup and passed by reference

pub mod result;
pub mod series;
pub mod scoring;
pub mod config;
pub mod calculator;
pub mod calculators;

pub use result::*;
pub use series::*;
pub use scoring::*;
pub use config::*;
pub use calculator::*;
pub use calculators::*;
