//! Application orchestration layer
//!
//! This module owns the operation lifecycle and drives the workflows from
//! the host's frame loop.

pub mod controller;
pub mod state;

pub use controller::OperationSequencer;
pub use state::{Operation, OperationKind, OperationStatus};
