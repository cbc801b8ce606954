//! Cooperative automation sequencer for the bestiary workflows
//!
//! The host application calls [`app::OperationSequencer`] once per frame.
//! Workflows never block: each is an explicit state machine that reads one
//! fresh [`host::Snapshot`] per tick and emits synthetic input through an
//! [`input::InputDriver`].

pub mod app;
pub mod automation;
pub mod config;
pub mod domain;
pub mod host;
pub mod input;
#[cfg(windows)]
pub mod platform;
pub mod testing;
