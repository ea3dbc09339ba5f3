//! Optimistron State - Optimistic transition reconciliation
//!
//! This crate implements the reconciliation engine:
//! - Pending transition list processing
//! - The indexed reference state handler
//! - Reducer binding and the namespace registry
//! - Sanitization of pending transitions
//! - Optimistic view selectors

pub mod process;
pub mod indexed;
pub mod reducer;
pub mod config;
pub mod sanitize;
pub mod reconcile;
pub mod registry;
pub mod selectors;

#[cfg(test)]
mod testing;

pub use process::*;
pub use indexed::*;
pub use reducer::*;
pub use config::*;
pub use sanitize::*;
pub use reconcile::*;
pub use registry::*;
pub use selectors::*;
