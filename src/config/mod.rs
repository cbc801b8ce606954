//! Configuration module for beast-sorter
//!
//! Numeric settings carry their allowed range as associated constants and
//! are clamped on the way in, so the rest of the crate never sees an
//! out-of-range delay or timeout.

pub mod settings;

pub use settings::{Settings, SettingsError};
