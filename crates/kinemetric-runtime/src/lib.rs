//! Kinemetric Runtime - Diagnostic job lifecycle
//!
//! This crate drives a diagnostic job from request to result:
//! - Job state machine (PENDING → QUEUED → PROCESSING → COMPLETED | FAILED)
//! - Credit admission control with atomic debit and refund-once on failure
//! - Collaborator boundaries (pose estimation, credit ledger, artifact store)
//! - In-memory collaborators and stores
//! - Report assembly with snapshot artifacts
//! - Configuration loading and logging bootstrap

pub mod error;
pub mod config;
pub mod job;
pub mod collaborators;
pub mod ledger;
pub mod artifacts;
pub mod store;
pub mod report;
pub mod orchestrator;
pub mod telemetry;

pub use error::*;
pub use config::*;
pub use job::*;
pub use collaborators::*;
pub use ledger::*;
pub use artifacts::*;
pub use store::*;
pub use report::*;
pub use orchestrator::*;
pub use telemetry::*;
