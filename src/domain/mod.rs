//! Domain logic and core data structures
//!
//! This module contains pure logic that is independent of the host
//! application and of any platform input API.

pub mod classify;
pub mod core;
pub mod grid;
pub mod inventory;
