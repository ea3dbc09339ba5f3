//! Optimistron Test Harness - Scenario driving and transition stream fuzzing
//!
//! This crate provides:
//! - A reference `items` domain over the indexed state handler
//! - Tracing setup for tests and benches
//! - A scenario driver replaying event sequences through an engine
//! - A seeded transition stream fuzzer checking engine invariants

pub mod domain;
pub mod logging;
pub mod scenario;
pub mod fuzzer;

pub use domain::*;
pub use logging::*;
pub use scenario::*;
pub use fuzzer::*;
