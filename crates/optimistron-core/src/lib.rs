//! Optimistron Core - Transition data model and state handler contract
//!
//! This crate defines the types shared by the reconciliation engine:
//! - Identifiers (TransitionId, Namespace)
//! - Transition metadata (Operation, DedupeMode, Transition)
//! - The event envelope and transition builders
//! - The StateHandler contract and its bound form
//! - Error and merge signal types

pub mod id;
pub mod transition;
pub mod event;
pub mod builder;
pub mod handler;
pub mod error;

pub use id::*;
pub use transition::*;
pub use event::*;
pub use builder::*;
pub use handler::*;
pub use error::*;
