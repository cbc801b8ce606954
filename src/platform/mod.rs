//! Platform-specific Windows implementations
//!
//! This module encapsulates all Win32 API interactions: synthetic input
//! through `SendInput` and key-level polling for the control surface.
//!
//! Reading the game client's UI tree is outside this crate. A live
//! integration supplies its own [`StateProvider`](crate::host::StateProvider)
//! and pairs it with [`SendInputDriver`] through
//! [`HostPair`](crate::host::HostPair), sampling the hotkeys once per frame:
//!
//! ```ignore
//! let mut host = HostPair::new(client_reader, SendInputDriver::new());
//! let mut sequencer = OperationSequencer::new(Settings::from_env()?);
//! loop {
//!     let levels = poll_signal_levels(&sequencer.settings().bindings);
//!     sequencer.on_frame(&mut host, levels, Instant::now());
//!     wait_for_next_frame();
//! }
//! ```

pub mod input;

pub use input::{SendInputDriver, is_key_down, poll_signal_levels};
