//! Kinemetric Test Harness - Synthetic captures and pipeline validation
//!
//! This crate provides:
//! - Synthetic landmark captures with exactly known geometry
//! - Noise and occlusion injection
//! - Scripted and failing collaborators
//! - An end-to-end pipeline harness

pub mod synthetic;
pub mod collaborators;
pub mod harness;

pub use synthetic::*;
pub use collaborators::*;
pub use harness::*;
